use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::types::{ContactId, PhoneDigits};

/// A person record as returned by the backend.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub email: String,
    /// Canonical digits-only phone.
    pub phone: PhoneDigits,
    pub date_of_birth: NaiveDate,
    /// Picture URL or data URI, absent when the contact has no photo.
    pub profile_picture: Option<String>,
}

/// Validated and normalized field set sent on create or update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub phone: PhoneDigits,
    pub date_of_birth: NaiveDate,
}

impl ContactFields {
    #[must_use]
    pub fn new(name: &str, email: &str, phone: &str, date_of_birth: NaiveDate) -> Self {
        Self {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            phone: PhoneDigits::normalize(phone),
            date_of_birth,
        }
    }
}

/// One page of results as produced by the transport. Never patched in place.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PagedResult<T> {
    pub content: Vec<T>,
    pub page_number: usize,
    pub page_size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
    pub is_last_page: bool,
}

impl<T> PagedResult<T> {
    /// Wraps an unpaged collection as a single, final page.
    pub fn single_page(content: Vec<T>) -> Self {
        let total = content.len();
        Self {
            page_number: 0,
            page_size: total,
            total_elements: total,
            total_pages: usize::from(total > 0),
            is_last_page: true,
            content,
        }
    }

    /// Offset of the first element of this page in the full result set.
    pub fn offset(&self) -> usize {
        self.page_number * self.page_size
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            content: Vec::new(),
            page_number: 0,
            page_size: 0,
            total_elements: 0,
            total_pages: 0,
            is_last_page: true,
        }
    }
}
