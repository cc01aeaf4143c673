pub mod contacts;
pub mod list;
pub mod notification;

use thiserror::Error;

use crate::forms::ValidationErrorMap;
use crate::forms::image::ImageRejection;
use crate::transport::TransportError;

/// Errors surfaced by the session services.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("validation failed: {0}")]
    Validation(ValidationErrorMap),
    #[error(transparent)]
    ImageRejected(#[from] ImageRejection),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("no editor is open")]
    NoEditor,
    #[error("nothing is awaiting confirmation")]
    NoPendingAction,
}

impl From<ValidationErrorMap> for ServiceError {
    fn from(errors: ValidationErrorMap) -> Self {
        Self::Validation(errors)
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
