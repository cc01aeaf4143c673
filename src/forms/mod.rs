//! Form buffers and validation backing the contact editor.

use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};

use thiserror::Error;
use validator::ValidationErrors;

pub mod contact;
pub mod image;

/// Editable contact fields, keyed the way the backend names them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ContactField {
    Name,
    Email,
    Phone,
    DateOfBirth,
}

impl ContactField {
    /// Wire/form key of the field.
    pub const fn key(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
            Self::DateOfBirth => "dateOfBirth",
        }
    }

    /// Human-readable label.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Name => "Nome",
            Self::Email => "E-mail",
            Self::Phone => "Telefone",
            Self::DateOfBirth => "Data de Nascimento",
        }
    }

    /// Resolves a form key, accepting the snake_case Rust field names too.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "name" => Some(Self::Name),
            "email" => Some(Self::Email),
            "phone" => Some(Self::Phone),
            "dateOfBirth" | "date_of_birth" => Some(Self::DateOfBirth),
            _ => None,
        }
    }

    const fn required_message(self) -> &'static str {
        match self {
            Self::Name => "O nome é obrigatório",
            Self::Email => "O email é obrigatório",
            Self::Phone => "O telefone é obrigatório",
            Self::DateOfBirth => "A data de nascimento é obrigatória",
        }
    }
}

impl Display for ContactField {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}

/// Which capitalization rule a name token broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CapitalizationIssue {
    /// A preposition (`de`, `da`, `do`, `e`) was not fully lowercase.
    UppercasePreposition,
    /// A regular name token did not start with an uppercase letter.
    LowercaseInitial,
}

/// Field-level validation failure. `Display` yields the user-facing message.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("{}", .0.required_message())]
    Required(ContactField),

    #[error("Informe nome e sobrenome")]
    MissingSurname,

    #[error("{}", capitalization_message(.0))]
    Capitalization(CapitalizationIssue),

    #[error("Informe um email válido")]
    InvalidFormat,

    #[error("O telefone deve ter 10 ou 11 dígitos")]
    InvalidLength,

    #[error("Informe uma data de nascimento válida")]
    InvalidDate,

    #[error("A data de nascimento não pode ser no futuro")]
    FutureDate,
}

fn capitalization_message(issue: &CapitalizationIssue) -> &'static str {
    match issue {
        CapitalizationIssue::UppercasePreposition => {
            "Preposições como \"de\", \"da\", \"do\" e \"e\" devem ser escritas em minúsculo"
        }
        CapitalizationIssue::LowercaseInitial => {
            "O nome e sobrenome devem começar com letra maiúscula"
        }
    }
}

impl FieldError {
    /// Stable code carried through `validator::ValidationError`.
    pub const fn code(self) -> &'static str {
        match self {
            Self::Required(_) => "required",
            Self::MissingSurname => "missing_surname",
            Self::Capitalization(CapitalizationIssue::UppercasePreposition) => {
                "uppercase_preposition"
            }
            Self::Capitalization(CapitalizationIssue::LowercaseInitial) => "lowercase_initial",
            Self::InvalidFormat => "invalid_format",
            Self::InvalidLength => "invalid_length",
            Self::InvalidDate => "invalid_date",
            Self::FutureDate => "future_date",
        }
    }

    /// Inverse of [`FieldError::code`] for a given field.
    pub fn from_code(field: ContactField, code: &str) -> Option<Self> {
        let error = match code {
            "required" => Self::Required(field),
            "missing_surname" => Self::MissingSurname,
            "uppercase_preposition" => {
                Self::Capitalization(CapitalizationIssue::UppercasePreposition)
            }
            "lowercase_initial" => Self::Capitalization(CapitalizationIssue::LowercaseInitial),
            "invalid_format" => Self::InvalidFormat,
            "invalid_length" => Self::InvalidLength,
            "invalid_date" => Self::InvalidDate,
            "future_date" => Self::FutureDate,
            _ => return None,
        };
        Some(error)
    }
}

/// Field-keyed validation outcome. Empty means the form may be submitted.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationErrorMap(BTreeMap<ContactField, FieldError>);

impl ValidationErrorMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an error; a later error for the same field replaces the earlier one.
    pub fn insert(&mut self, field: ContactField, error: FieldError) {
        self.0.insert(field, error);
    }

    pub fn get(&self, field: ContactField) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    pub fn remove(&mut self, field: ContactField) -> Option<FieldError> {
        self.0.remove(&field)
    }

    pub fn contains(&self, field: ContactField) -> bool {
        self.0.contains_key(&field)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ContactField, FieldError)> + '_ {
        self.0.iter().map(|(field, error)| (*field, *error))
    }

    /// Messages keyed by the wire field name.
    pub fn messages(&self) -> BTreeMap<&'static str, String> {
        self.iter()
            .map(|(field, error)| (field.key(), error.to_string()))
            .collect()
    }
}

impl Display for ValidationErrorMap {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, error) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {error}", field.key())?;
            first = false;
        }
        Ok(())
    }
}

impl From<&ValidationErrors> for ValidationErrorMap {
    fn from(errors: &ValidationErrors) -> Self {
        let mut map = Self::new();
        for (key, field_errors) in errors.field_errors() {
            let Some(field) = ContactField::from_key(&key) else {
                continue;
            };
            if let Some(error) = field_errors
                .iter()
                .find_map(|err| FieldError::from_code(field, &err.code))
            {
                map.insert(field, error);
            }
        }
        map
    }
}
