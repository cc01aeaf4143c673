use std::borrow::Cow;

use chrono::{Local, NaiveDate};
use validator::{Validate, ValidationError};

use crate::domain::contact::{Contact, ContactFields};
use crate::domain::types::PhoneDigits;
use crate::format::{format_phone_input, parse_iso_date};
use crate::forms::image::{ImageFile, ImageLimits, ImageProbe, ImageRejection, accept_image};
use crate::forms::{CapitalizationIssue, ContactField, FieldError, ValidationErrorMap};

/// Name tokens that must stay lowercase.
const PREPOSITIONS: [&str; 4] = ["de", "da", "do", "e"];

/// Requires a first name and surname, capitalized, with lowercase prepositions.
pub fn validate_name(name: &str) -> Result<(), FieldError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Required(ContactField::Name));
    }

    let parts: Vec<&str> = trimmed.split_whitespace().collect();
    if parts.len() < 2 {
        return Err(FieldError::MissingSurname);
    }

    for part in parts {
        let lowercase = part.to_lowercase();
        if PREPOSITIONS.contains(&lowercase.as_str()) {
            if part != lowercase {
                return Err(FieldError::Capitalization(
                    CapitalizationIssue::UppercasePreposition,
                ));
            }
        } else if !part.chars().next().is_some_and(char::is_uppercase) {
            return Err(FieldError::Capitalization(
                CapitalizationIssue::LowercaseInitial,
            ));
        }
    }

    Ok(())
}

/// Accepts `local@domain.tld` shapes: no whitespace, exactly one `@`, and a
/// dot inside the domain part.
pub fn validate_email(email: &str) -> Result<(), FieldError> {
    if email.trim().is_empty() {
        return Err(FieldError::Required(ContactField::Email));
    }

    let Some((local, domain)) = email.split_once('@') else {
        return Err(FieldError::InvalidFormat);
    };

    let clean = |part: &str| !part.is_empty() && !part.contains(char::is_whitespace);
    let has_inner_dot = domain
        .char_indices()
        .any(|(at, c)| c == '.' && at > 0 && at + 1 < domain.len());

    if clean(local) && clean(domain) && !domain.contains('@') && has_inner_dot {
        Ok(())
    } else {
        Err(FieldError::InvalidFormat)
    }
}

/// Requires 10 or 11 digits once formatting is stripped.
pub fn validate_phone(phone: &str) -> Result<(), FieldError> {
    let digits = PhoneDigits::normalize(phone);
    if digits.is_empty() {
        return Err(FieldError::Required(ContactField::Phone));
    }
    if !(10..=11).contains(&digits.len()) {
        return Err(FieldError::InvalidLength);
    }
    Ok(())
}

/// Requires a parseable date that is not after `today`. Time of day is ignored.
pub fn validate_date_of_birth(value: &str, today: NaiveDate) -> Result<NaiveDate, FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::Required(ContactField::DateOfBirth));
    }
    let date = parse_iso_date(value).ok_or(FieldError::InvalidDate)?;
    if date > today {
        return Err(FieldError::FutureDate);
    }
    Ok(date)
}

fn into_validation_error(error: FieldError) -> ValidationError {
    let mut validation_error = ValidationError::new(error.code());
    validation_error.message = Some(Cow::Owned(error.to_string()));
    validation_error
}

fn check_name(name: &str) -> Result<(), ValidationError> {
    validate_name(name).map_err(into_validation_error)
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    validate_email(email).map_err(into_validation_error)
}

fn check_phone(phone: &str) -> Result<(), ValidationError> {
    validate_phone(phone).map_err(into_validation_error)
}

#[derive(Clone, Debug, Default, PartialEq, Validate)]
/// Transient edit buffer behind the contact editor.
pub struct ContactForm {
    /// Full name.
    #[validate(custom(function = "check_name"))]
    pub name: String,
    /// Email address.
    #[validate(custom(function = "check_email"))]
    pub email: String,
    /// Phone as typed, possibly masked.
    #[validate(custom(function = "check_phone"))]
    pub phone: String,
    /// ISO date (`YYYY-MM-DD`).
    pub date_of_birth: String,
    /// Picture the contact already has.
    pub profile_picture: Option<String>,
    /// Newly picked image awaiting upload.
    pub image: Option<ImageFile>,
}

impl ContactForm {
    /// Seeds the buffer from an existing contact.
    pub fn from_contact(contact: &Contact) -> Self {
        Self {
            name: contact.name.clone(),
            email: contact.email.clone(),
            phone: format_phone_input(contact.phone.as_str()),
            date_of_birth: contact.date_of_birth.format("%Y-%m-%d").to_string(),
            profile_picture: contact.profile_picture.clone(),
            image: None,
        }
    }

    /// Runs every field rule against `today`; no rule short-circuits another.
    pub fn validate_at(&self, today: NaiveDate) -> ValidationErrorMap {
        let mut errors = match self.validate() {
            Ok(()) => ValidationErrorMap::new(),
            Err(errors) => ValidationErrorMap::from(&errors),
        };
        if let Err(error) = validate_date_of_birth(&self.date_of_birth, today) {
            errors.insert(ContactField::DateOfBirth, error);
        }
        errors
    }

    /// Validates and produces the normalized field set.
    pub fn to_fields(&self, today: NaiveDate) -> Result<ContactFields, ValidationErrorMap> {
        let errors = self.validate_at(today);
        if !errors.is_empty() {
            return Err(errors);
        }
        let date_of_birth = validate_date_of_birth(&self.date_of_birth, today).map_err(|err| {
            let mut errors = ValidationErrorMap::new();
            errors.insert(ContactField::DateOfBirth, err);
            errors
        })?;
        Ok(ContactFields::new(
            &self.name,
            &self.email,
            &self.phone,
            date_of_birth,
        ))
    }

    /// Builds the multipart payload for create/update.
    pub fn to_payload(&self, today: NaiveDate) -> Result<ContactPayload, ValidationErrorMap> {
        let fields = self.to_fields(today)?;
        Ok(ContactPayload {
            fields,
            image: self.image.clone(),
            existing_picture: self.profile_picture.clone(),
        })
    }
}

/// Validated request body for create/update calls.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContactPayload {
    pub fields: ContactFields,
    pub image: Option<ImageFile>,
    /// Current picture echoed back when no new image replaces it.
    pub existing_picture: Option<String>,
}

pub const IMAGE_PART: &str = "profilePicture";
pub const EXISTING_PICTURE_PART: &str = "profilePictureUrl";

impl ContactPayload {
    /// Text parts in transmission order. The binary image part is separate.
    pub fn text_parts(&self) -> Vec<(&'static str, String)> {
        let mut parts = vec![
            (ContactField::Name.key(), self.fields.name.clone()),
            (ContactField::Email.key(), self.fields.email.clone()),
            (ContactField::Phone.key(), self.fields.phone.to_string()),
            (
                ContactField::DateOfBirth.key(),
                self.fields.date_of_birth.format("%Y-%m-%d").to_string(),
            ),
        ];
        if self.image.is_none()
            && let Some(picture) = self.existing_picture.as_ref().filter(|p| !p.is_empty())
        {
            parts.push((EXISTING_PICTURE_PART, picture.clone()));
        }
        parts
    }
}

/// Editor session: the form buffer plus its validation state. Lives from
/// modal open to modal close.
#[derive(Clone, Debug, Default)]
pub struct ContactEditor {
    /// Record being edited; `None` when creating.
    pub original: Option<Contact>,
    pub form: ContactForm,
    pub errors: ValidationErrorMap,
    pub image_error: Option<ImageRejection>,
}

impl ContactEditor {
    /// Opens a blank editor for a new contact.
    pub fn create() -> Self {
        Self::default()
    }

    /// Opens an editor seeded from `contact`.
    pub fn edit(contact: &Contact) -> Self {
        Self {
            original: Some(contact.clone()),
            form: ContactForm::from_contact(contact),
            ..Self::default()
        }
    }

    pub fn is_update(&self) -> bool {
        self.original.is_some()
    }

    /// Sets a field value and clears its pending error. Phone input is masked
    /// and capped at eleven digits.
    pub fn set_field(&mut self, field: ContactField, value: &str) {
        match field {
            ContactField::Name => self.form.name = value.to_string(),
            ContactField::Email => self.form.email = value.to_string(),
            ContactField::Phone => self.form.phone = format_phone_input(value),
            ContactField::DateOfBirth => self.form.date_of_birth = value.trim().to_string(),
        }
        self.errors.remove(field);
    }

    /// Attaches `file` once it passes the image guard. A rejection leaves the
    /// rest of the form submittable.
    pub fn attach_image(
        &mut self,
        file: ImageFile,
        limits: &ImageLimits,
        probe: &dyn ImageProbe,
    ) -> Result<(), ImageRejection> {
        match accept_image(&file, limits, probe) {
            Ok(info) => {
                log::debug!(
                    "Accepted image {} ({}x{})",
                    file.file_name,
                    info.width,
                    info.height
                );
                self.form.image = Some(file);
                self.image_error = None;
                Ok(())
            }
            Err(rejection) => {
                log::debug!("Rejected image {}: {rejection}", file.file_name);
                self.image_error = Some(rejection.clone());
                Err(rejection)
            }
        }
    }

    /// Validates against `today`, remembering the errors for display.
    pub fn validate_at(&mut self, today: NaiveDate) -> Result<ContactPayload, ValidationErrorMap> {
        match self.form.to_payload(today) {
            Ok(payload) => {
                self.errors = ValidationErrorMap::new();
                Ok(payload)
            }
            Err(errors) => {
                self.errors = errors.clone();
                Err(errors)
            }
        }
    }

    /// Validates against the local calendar date.
    pub fn validate(&mut self) -> Result<ContactPayload, ValidationErrorMap> {
        self.validate_at(Local::now().date_naive())
    }
}
