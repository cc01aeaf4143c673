//! Seam between the session services and the contact backend.

use crate::{
    domain::{contact::Contact, contact::PagedResult, types::ContactId},
    forms::contact::ContactPayload,
    transport::errors::TransportResult,
};

pub mod errors;
#[cfg(feature = "client")]
pub mod http;
#[cfg(feature = "test-mocks")]
pub mod mock;

pub use errors::TransportError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pagination {
    pub page: usize,
    pub per_page: usize,
}

/// Parameters of a list call. No pagination means "everything".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListQuery {
    pub search: Option<String>,
    pub pagination: Option<Pagination>,
}

impl ListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the search term; blank terms clear it.
    pub fn search(mut self, term: impl Into<String>) -> Self {
        let term = term.into().trim().to_string();
        self.search = (!term.is_empty()).then_some(term);
        self
    }

    pub fn paginate(mut self, page: usize, per_page: usize) -> Self {
        self.pagination = Some(Pagination { page, per_page });
        self
    }

    pub fn page(&self) -> usize {
        self.pagination.as_ref().map_or(0, |p| p.page)
    }
}

pub trait ContactReader {
    fn list_contacts(&self, query: &ListQuery) -> TransportResult<PagedResult<Contact>>;
    fn get_contact(&self, id: ContactId) -> TransportResult<Contact>;
}

pub trait ContactWriter {
    fn create_contact(&self, payload: &ContactPayload) -> TransportResult<Contact>;
    fn update_contact(&self, id: ContactId, payload: &ContactPayload) -> TransportResult<Contact>;
    fn delete_contact(&self, id: ContactId) -> TransportResult<()>;
}
