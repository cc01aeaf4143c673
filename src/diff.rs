//! Before/after comparison shown when confirming an update.

use chrono::NaiveDate;
use serde::Serialize;

use crate::domain::contact::{Contact, ContactFields};
use crate::domain::types::PhoneDigits;
use crate::format::{format_date, format_phone};
use crate::forms::contact::ContactPayload;

/// Fields the summary can mention. The picture is only ever "replaced".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum ChangedField {
    Name,
    Email,
    Phone,
    DateOfBirth,
    ProfilePicture,
}

impl ChangedField {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Nome",
            Self::Email => "E-mail",
            Self::Phone => "Telefone",
            Self::DateOfBirth => "Data de Nascimento",
            Self::ProfilePicture => "Foto de Perfil",
        }
    }
}

/// One changed field with display-ready values.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FieldChange {
    pub field: ChangedField,
    /// `None` for the picture, whose old value is not rendered.
    pub old_value: Option<String>,
    pub new_value: String,
}

pub const NEW_IMAGE_TEXT: &str = "Nova imagem selecionada";
pub const NO_CHANGES_TEXT: &str = "Nenhuma alteração identificada.";

/// Ordered delta between a stored contact and a proposed edit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum ChangeSummary {
    Changes(Vec<FieldChange>),
    NoChanges,
}

impl ChangeSummary {
    pub fn has_changes(&self) -> bool {
        matches!(self, Self::Changes(_))
    }

    pub fn changes(&self) -> &[FieldChange] {
        match self {
            Self::Changes(changes) => changes,
            Self::NoChanges => &[],
        }
    }

    /// Plain-text rendering, one line per change.
    pub fn render(&self) -> Vec<String> {
        match self {
            Self::NoChanges => vec![NO_CHANGES_TEXT.to_string()],
            Self::Changes(changes) => changes
                .iter()
                .map(|change| match &change.old_value {
                    Some(old) => {
                        format!("{}: {} → {}", change.field.label(), old, change.new_value)
                    }
                    None => format!("{}: {}", change.field.label(), change.new_value),
                })
                .collect(),
        }
    }
}

/// Proposed replacement values, already validated and normalized.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProposedChanges {
    pub name: String,
    pub email: String,
    pub phone: PhoneDigits,
    pub date_of_birth: NaiveDate,
    pub has_new_image: bool,
}

impl ProposedChanges {
    pub fn new(fields: &ContactFields, has_new_image: bool) -> Self {
        Self {
            name: fields.name.clone(),
            email: fields.email.clone(),
            phone: fields.phone.clone(),
            date_of_birth: fields.date_of_birth,
            has_new_image,
        }
    }
}

impl From<&ContactPayload> for ProposedChanges {
    fn from(payload: &ContactPayload) -> Self {
        Self::new(&payload.fields, payload.image.is_some())
    }
}

/// Compares `original` with `proposed`, field by field in display order.
///
/// Text fields compare trimmed values, the phone compares digits only and the
/// date compares calendar days.
pub fn summarize_changes(original: &Contact, proposed: &ProposedChanges) -> ChangeSummary {
    let mut changes = Vec::new();

    if original.name.trim() != proposed.name.trim() {
        changes.push(FieldChange {
            field: ChangedField::Name,
            old_value: Some(original.name.clone()),
            new_value: proposed.name.clone(),
        });
    }

    if original.email.trim() != proposed.email.trim() {
        changes.push(FieldChange {
            field: ChangedField::Email,
            old_value: Some(original.email.clone()),
            new_value: proposed.email.clone(),
        });
    }

    if PhoneDigits::normalize(original.phone.as_str()) != proposed.phone {
        changes.push(FieldChange {
            field: ChangedField::Phone,
            old_value: Some(format_phone(original.phone.as_str())),
            new_value: format_phone(proposed.phone.as_str()),
        });
    }

    if original.date_of_birth != proposed.date_of_birth {
        changes.push(FieldChange {
            field: ChangedField::DateOfBirth,
            old_value: Some(format_date(original.date_of_birth)),
            new_value: format_date(proposed.date_of_birth),
        });
    }

    if proposed.has_new_image {
        changes.push(FieldChange {
            field: ChangedField::ProfilePicture,
            old_value: None,
            new_value: NEW_IMAGE_TEXT.to_string(),
        });
    }

    if changes.is_empty() {
        ChangeSummary::NoChanges
    } else {
        ChangeSummary::Changes(changes)
    }
}
