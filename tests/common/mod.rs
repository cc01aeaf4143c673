use std::cell::{Cell, RefCell};
use std::io::Cursor;

use aquora_contacts::domain::contact::{Contact, PagedResult};
use aquora_contacts::domain::types::{ContactId, PhoneDigits};
use aquora_contacts::forms::contact::ContactPayload;
use aquora_contacts::transport::errors::{TransportError, TransportResult};
use aquora_contacts::transport::{ContactReader, ContactWriter, ListQuery};
use chrono::NaiveDate;
use image::{DynamicImage, ImageFormat, RgbaImage};

/// Backend stand-in keeping contacts in memory and recording list queries.
#[derive(Default)]
pub struct InMemoryTransport {
    contacts: RefCell<Vec<Contact>>,
    next_id: Cell<i64>,
    queries: RefCell<Vec<ListQuery>>,
    fail_next: RefCell<Option<TransportError>>,
}

impl InMemoryTransport {
    /// Seeds `count` contacts with ids `1..=count`.
    pub fn seeded(count: i64) -> Self {
        let transport = Self::default();
        for id in 1..=count {
            transport.contacts.borrow_mut().push(contact(id, &seed_name(id)));
        }
        transport.next_id.set(count + 1);
        transport
    }

    pub fn queries(&self) -> Vec<ListQuery> {
        self.queries.borrow().clone()
    }

    pub fn clear_queries(&self) {
        self.queries.borrow_mut().clear();
    }

    pub fn fail_next(&self, error: TransportError) {
        *self.fail_next.borrow_mut() = Some(error);
    }

    pub fn stored(&self, id: i64) -> Option<Contact> {
        self.contacts
            .borrow()
            .iter()
            .find(|c| c.id.get() == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.contacts.borrow().len()
    }

    fn take_failure(&self) -> TransportResult<()> {
        match self.fail_next.borrow_mut().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    fn not_found() -> TransportError {
        TransportError::NotFound("Contato não encontrado".to_string())
    }

    fn from_payload(
        id: ContactId,
        payload: &ContactPayload,
        previous: Option<&Contact>,
    ) -> Contact {
        let profile_picture = match &payload.image {
            Some(image) => Some(format!("/uploads/{}", image.file_name)),
            None => payload
                .existing_picture
                .clone()
                .or_else(|| previous.and_then(|c| c.profile_picture.clone())),
        };
        Contact {
            id,
            name: payload.fields.name.clone(),
            email: payload.fields.email.clone(),
            phone: payload.fields.phone.clone(),
            date_of_birth: payload.fields.date_of_birth,
            profile_picture,
        }
    }
}

impl ContactReader for InMemoryTransport {
    fn list_contacts(&self, query: &ListQuery) -> TransportResult<PagedResult<Contact>> {
        self.queries.borrow_mut().push(query.clone());
        self.take_failure()?;

        let term = query.search.as_deref().map(str::to_lowercase);
        let matching: Vec<Contact> = self
            .contacts
            .borrow()
            .iter()
            .filter(|c| {
                term.as_deref().is_none_or(|term| {
                    c.name.to_lowercase().contains(term) || c.email.to_lowercase().contains(term)
                })
            })
            .cloned()
            .collect();

        let Some(pagination) = &query.pagination else {
            return Ok(PagedResult::single_page(matching));
        };

        let total_elements = matching.len();
        let total_pages = total_elements.div_ceil(pagination.per_page);
        let content: Vec<Contact> = matching
            .into_iter()
            .skip(pagination.page * pagination.per_page)
            .take(pagination.per_page)
            .collect();

        Ok(PagedResult {
            content,
            page_number: pagination.page,
            page_size: pagination.per_page,
            total_elements,
            total_pages,
            is_last_page: pagination.page + 1 >= total_pages,
        })
    }

    fn get_contact(&self, id: ContactId) -> TransportResult<Contact> {
        self.take_failure()?;
        self.stored(id.get()).ok_or_else(Self::not_found)
    }
}

impl ContactWriter for InMemoryTransport {
    fn create_contact(&self, payload: &ContactPayload) -> TransportResult<Contact> {
        self.take_failure()?;
        let id = ContactId::new(self.next_id.get())?;
        self.next_id.set(id.get() + 1);
        let created = Self::from_payload(id, payload, None);
        self.contacts.borrow_mut().push(created.clone());
        Ok(created)
    }

    fn update_contact(&self, id: ContactId, payload: &ContactPayload) -> TransportResult<Contact> {
        self.take_failure()?;
        let mut contacts = self.contacts.borrow_mut();
        let slot = contacts
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or_else(Self::not_found)?;
        let updated = Self::from_payload(id, payload, Some(&*slot));
        *slot = updated.clone();
        Ok(updated)
    }

    fn delete_contact(&self, id: ContactId) -> TransportResult<()> {
        self.take_failure()?;
        let mut contacts = self.contacts.borrow_mut();
        let before = contacts.len();
        contacts.retain(|c| c.id != id);
        if contacts.len() == before {
            return Err(Self::not_found());
        }
        Ok(())
    }
}

fn seed_name(id: i64) -> String {
    const FIRST: [&str; 4] = ["Ana", "Bruno", "Carla", "Diego"];
    format!("{} Silva{id}", FIRST[(id as usize) % FIRST.len()])
}

pub fn contact(id: i64, name: &str) -> Contact {
    Contact {
        id: ContactId::new(id).expect("valid id"),
        name: name.to_string(),
        email: format!("contato{id}@example.com"),
        phone: PhoneDigits::normalize(&format!("119{:08}", id)),
        date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).expect("valid date"),
        profile_picture: None,
    }
}

/// Blank GIF image of `width` x `height`.
pub fn gif_bytes(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgba8(RgbaImage::new(width, height))
        .write_to(&mut out, ImageFormat::Gif)
        .expect("encodes");
    out.into_inner()
}
