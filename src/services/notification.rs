//! Confirmation gate and outcome messages.
//!
//! Exactly one notification is active at a time. Every request replaces the
//! previous state wholesale, so a pending confirmation that gets preempted is
//! simply gone.

use serde::Serialize;

use crate::diff::{ChangeSummary, ProposedChanges, summarize_changes};
use crate::domain::contact::Contact;
use crate::domain::types::ContactId;
use crate::forms::contact::ContactPayload;

/// Contact awaiting delete confirmation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct DeleteTarget {
    pub id: ContactId,
    pub name: String,
}

/// Validated edit awaiting confirmation, with the diff shown to the user.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingUpdate {
    pub id: ContactId,
    pub payload: ContactPayload,
    pub original: Contact,
    pub summary: ChangeSummary,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum NotificationState {
    #[default]
    None,
    Success {
        title: String,
        message: String,
    },
    Error {
        title: String,
        message: String,
    },
    ConfirmDelete(DeleteTarget),
    ConfirmUpdate(Box<PendingUpdate>),
}

impl NotificationState {
    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn is_confirmation(&self) -> bool {
        matches!(self, Self::ConfirmDelete(_) | Self::ConfirmUpdate(_))
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::Success { title, .. } | Self::Error { title, .. } => Some(title),
            Self::ConfirmDelete(_) => Some("Confirmar exclusão"),
            Self::ConfirmUpdate(_) => Some("Confirmar alterações"),
        }
    }

    /// Body text. Update confirmations also carry their change summary.
    pub fn message(&self) -> Option<String> {
        match self {
            Self::None => None,
            Self::Success { message, .. } | Self::Error { message, .. } => Some(message.clone()),
            Self::ConfirmDelete(target) => Some(format!(
                "Tem certeza que deseja excluir o contato \"{}\"? Esta ação não pode ser desfeita.",
                target.name
            )),
            Self::ConfirmUpdate(pending) => Some(format!(
                "Deseja salvar as alterações no contato \"{}\"?",
                pending.original.name
            )),
        }
    }
}

/// Action released by a confirmation, ready to be sent to the transport.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PendingAction {
    Delete(DeleteTarget),
    Update(Box<PendingUpdate>),
}

/// Which mutation an outcome message is about.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mutation {
    Create,
    Update,
    Delete,
}

impl Mutation {
    fn error_title(self) -> &'static str {
        match self {
            Self::Create => "Erro ao adicionar",
            Self::Update => "Erro ao atualizar",
            Self::Delete => "Erro ao excluir",
        }
    }
}

#[derive(Debug, Default)]
pub struct NotificationFlow {
    state: NotificationState,
}

impl NotificationFlow {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &NotificationState {
        &self.state
    }

    fn replace(&mut self, state: NotificationState) {
        if self.state.is_confirmation() {
            log::debug!("Discarding pending confirmation");
        }
        self.state = state;
    }

    /// Gates a delete behind confirmation.
    pub fn request_delete(&mut self, id: ContactId, name: impl Into<String>) {
        self.replace(NotificationState::ConfirmDelete(DeleteTarget {
            id,
            name: name.into(),
        }));
    }

    /// Gates an update behind confirmation, computing the change summary
    /// shown to the user.
    pub fn request_update(&mut self, original: Contact, payload: ContactPayload) {
        let summary = summarize_changes(&original, &ProposedChanges::from(&payload));
        self.replace(NotificationState::ConfirmUpdate(Box::new(PendingUpdate {
            id: original.id,
            payload,
            original,
            summary,
        })));
    }

    /// Releases the pending action. The state returns to `None` until the
    /// outcome is reported.
    pub fn take_confirmed(&mut self) -> Option<PendingAction> {
        match std::mem::take(&mut self.state) {
            NotificationState::ConfirmDelete(target) => Some(PendingAction::Delete(target)),
            NotificationState::ConfirmUpdate(pending) => Some(PendingAction::Update(pending)),
            other => {
                self.state = other;
                None
            }
        }
    }

    /// Reports a successful mutation. `name` is the affected contact.
    pub fn succeed(&mut self, mutation: Mutation, name: &str) {
        let (title, message) = match mutation {
            Mutation::Create => (
                "Contato adicionado",
                format!("O contato \"{name}\" foi adicionado com sucesso."),
            ),
            Mutation::Update => (
                "Contato atualizado",
                "O contato foi atualizado com sucesso.".to_string(),
            ),
            Mutation::Delete => (
                "Contato excluído",
                format!("O contato \"{name}\" foi excluído com sucesso."),
            ),
        };
        self.replace(NotificationState::Success {
            title: title.to_string(),
            message,
        });
    }

    /// Reports a failed mutation with the transport's message.
    pub fn fail(&mut self, mutation: Mutation, message: impl std::fmt::Display) {
        self.replace(NotificationState::Error {
            title: mutation.error_title().to_string(),
            message: format!("Erro: {message}"),
        });
    }

    /// Shows a free-form error, e.g. when a record could not be loaded.
    pub fn error(&mut self, title: impl Into<String>, message: impl Into<String>) {
        self.replace(NotificationState::Error {
            title: title.into(),
            message: message.into(),
        });
    }

    /// Dismisses whatever is shown, discarding any pending payload.
    pub fn close(&mut self) {
        self.state = NotificationState::None;
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::domain::contact::ContactFields;
    use crate::domain::types::PhoneDigits;

    fn ana() -> Contact {
        Contact {
            id: ContactId::new(7).expect("valid id"),
            name: "Ana Silva".to_string(),
            email: "ana@example.com".to_string(),
            phone: PhoneDigits::normalize("11987654321"),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 5, 10).expect("valid date"),
            profile_picture: None,
        }
    }

    fn payload_for(contact: &Contact, name: &str) -> ContactPayload {
        ContactPayload {
            fields: ContactFields::new(
                name,
                &contact.email,
                contact.phone.as_str(),
                contact.date_of_birth,
            ),
            image: None,
            existing_picture: None,
        }
    }

    #[test]
    fn delete_request_waits_for_confirmation() {
        let mut flow = NotificationFlow::new();
        flow.request_delete(ana().id, "Ana Silva");

        assert!(flow.state().is_confirmation());
        assert_eq!(flow.state().title(), Some("Confirmar exclusão"));
        assert_eq!(
            flow.state().message().as_deref(),
            Some(
                "Tem certeza que deseja excluir o contato \"Ana Silva\"? \
                 Esta ação não pode ser desfeita."
            )
        );

        let action = flow.take_confirmed();
        assert_eq!(
            action,
            Some(PendingAction::Delete(DeleteTarget {
                id: ana().id,
                name: "Ana Silva".to_string()
            }))
        );
        assert!(flow.state().is_none());
    }

    #[test]
    fn update_request_carries_change_summary() {
        let mut flow = NotificationFlow::new();
        let original = ana();
        flow.request_update(original.clone(), payload_for(&original, "Ana Souza"));

        let NotificationState::ConfirmUpdate(pending) = flow.state() else {
            panic!("expected update confirmation");
        };
        assert_eq!(pending.id, original.id);
        assert_eq!(pending.summary.render(), vec!["Nome: Ana Silva → Ana Souza".to_string()]);
    }

    #[test]
    fn unchanged_update_still_asks_with_no_changes_marker() {
        let mut flow = NotificationFlow::new();
        let original = ana();
        flow.request_update(original.clone(), payload_for(&original, "Ana Silva"));

        let NotificationState::ConfirmUpdate(pending) = flow.state() else {
            panic!("expected update confirmation");
        };
        assert_eq!(pending.summary, ChangeSummary::NoChanges);
    }

    #[test]
    fn last_request_wins() {
        let mut flow = NotificationFlow::new();
        let original = ana();
        flow.request_delete(original.id, "Ana Silva");
        flow.request_update(original.clone(), payload_for(&original, "Ana Souza"));

        assert!(matches!(
            flow.take_confirmed(),
            Some(PendingAction::Update(_))
        ));
        assert_eq!(flow.take_confirmed(), None);
    }

    #[test]
    fn outcomes_are_not_confirmable() {
        let mut flow = NotificationFlow::new();
        flow.succeed(Mutation::Create, "Ana Silva");

        assert_eq!(flow.take_confirmed(), None);
        assert_eq!(flow.state().title(), Some("Contato adicionado"));

        flow.fail(Mutation::Delete, "Contato não encontrado");
        assert_eq!(
            flow.state(),
            &NotificationState::Error {
                title: "Erro ao excluir".to_string(),
                message: "Erro: Contato não encontrado".to_string(),
            }
        );

        flow.close();
        assert!(flow.state().is_none());
        assert_eq!(flow.state().message(), None);
    }
}
