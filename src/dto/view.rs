//! Presentation snapshot derived from the list controller.

use crate::domain::contact::Contact;
use crate::pagination::Pager;
use crate::services::list::{ListController, ListMode, ListStatus};

/// A contact with its display ordinal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactRow {
    pub index: usize,
    pub contact: Contact,
}

/// Why the list is empty, so presentation can offer "clear search".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmptyState {
    NoContacts,
    NoResults { term: String },
}

impl EmptyState {
    pub fn message(&self) -> String {
        match self {
            Self::NoContacts => "Nenhum contato cadastrado.".to_string(),
            Self::NoResults { term } => format!("Nenhum contato encontrado para \"{term}\"."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    pub rows: Vec<ContactRow>,
    pub search_term: String,
    pub pager: Pager,
    pub total_elements: usize,
    pub is_loading: bool,
    pub error: Option<String>,
    /// Set once a load completed and nothing is visible.
    pub empty: Option<EmptyState>,
}

impl From<&ListController> for ListView {
    fn from(list: &ListController) -> Self {
        let rows: Vec<ContactRow> = list
            .visible()
            .into_iter()
            .map(|contact| ContactRow {
                index: list.index_of(contact.id).unwrap_or_default(),
                contact: contact.clone(),
            })
            .collect();

        let term = list.search_term().trim();
        let loaded = !matches!(list.status(), ListStatus::Idle | ListStatus::Loading);
        let empty = (loaded && rows.is_empty()).then(|| {
            if term.is_empty() {
                EmptyState::NoContacts
            } else {
                EmptyState::NoResults {
                    term: term.to_string(),
                }
            }
        });

        let result = list.result();
        let (pager, total_elements) = match list.settings().mode {
            ListMode::Paged => (
                Pager::new(list.current_page(), result.total_pages),
                result.total_elements,
            ),
            ListMode::ClientFiltered => (Pager::new(0, 1), rows.len()),
        };

        let error = match list.status() {
            ListStatus::Error(message) => Some(message.clone()),
            _ => None,
        };

        Self {
            rows,
            search_term: list.search_term().to_string(),
            pager,
            total_elements,
            is_loading: matches!(list.status(), ListStatus::Loading),
            error,
            empty,
        }
    }
}
