use std::collections::BTreeMap;

use thiserror::Error;

use crate::domain::types::TypeConstraintError;

/// Failures reported by a contact transport. `Display` is the backend's
/// message, surfaced to the user verbatim.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("{0}")]
    Network(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    ValidationRejected {
        message: String,
        errors: BTreeMap<String, String>,
    },

    #[error("{0}")]
    Decode(String),
}

pub type TransportResult<T> = Result<T, TransportError>;

impl From<TypeConstraintError> for TransportError {
    fn from(err: TypeConstraintError) -> Self {
        TransportError::Decode(format!("Resposta inválida do servidor: {err}"))
    }
}

#[cfg(feature = "client")]
impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TransportError::Decode(format!("Resposta inválida do servidor: {err}"))
        } else if err.is_timeout() {
            TransportError::Network("Tempo de resposta do servidor esgotado".to_string())
        } else if let Some(status) = err.status() {
            TransportError::Server {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            TransportError::Network(format!("Falha de conexão: {err}"))
        }
    }
}
