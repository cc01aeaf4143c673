//! Wire representations exchanged with the contacts REST backend.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::contact::{Contact, PagedResult};
use crate::domain::types::{ContactId, PhoneDigits, TypeConstraintError};
use crate::format::parse_iso_date;

/// Contact as serialized by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ContactDto {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub date_of_birth: String,
    #[serde(default)]
    pub profile_picture: Option<String>,
}

impl TryFrom<ContactDto> for Contact {
    type Error = TypeConstraintError;

    fn try_from(dto: ContactDto) -> Result<Self, Self::Error> {
        let date_of_birth = parse_iso_date(&dto.date_of_birth).ok_or_else(|| {
            TypeConstraintError::InvalidValue(format!("dateOfBirth {:?}", dto.date_of_birth))
        })?;

        Ok(Contact {
            id: ContactId::new(dto.id)?,
            name: dto.name,
            email: dto.email,
            phone: PhoneDigits::normalize(&dto.phone),
            date_of_birth,
            profile_picture: dto.profile_picture.filter(|p| !p.trim().is_empty()),
        })
    }
}

/// Paged envelope returned by `GET /contacts`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PagedResponseDto {
    pub content: Vec<ContactDto>,
    pub page_number: usize,
    pub page_size: usize,
    pub total_elements: usize,
    pub total_pages: usize,
    #[serde(default)]
    pub last: bool,
}

/// Either the paged envelope or, from unpaged backends, a bare array.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum ListResponseDto {
    Paged(PagedResponseDto),
    Plain(Vec<ContactDto>),
}

fn convert_all(content: Vec<ContactDto>) -> Result<Vec<Contact>, TypeConstraintError> {
    content.into_iter().map(Contact::try_from).collect()
}

impl TryFrom<ListResponseDto> for PagedResult<Contact> {
    type Error = TypeConstraintError;

    fn try_from(dto: ListResponseDto) -> Result<Self, Self::Error> {
        match dto {
            ListResponseDto::Paged(page) => Ok(PagedResult {
                content: convert_all(page.content)?,
                page_number: page.page_number,
                page_size: page.page_size,
                total_elements: page.total_elements,
                total_pages: page.total_pages,
                is_last_page: page.last,
            }),
            ListResponseDto::Plain(content) => Ok(PagedResult::single_page(convert_all(content)?)),
        }
    }
}

/// Error body produced by the backend's exception handlers.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ErrorBodyDto {
    #[serde(default)]
    pub message: Option<String>,
    /// Field-level messages, present on validation failures.
    #[serde(default)]
    pub errors: BTreeMap<String, String>,
}
