//! Blocking HTTP transport against the contacts REST backend.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::{Client, RequestBuilder, Response};

use crate::domain::contact::{Contact, PagedResult};
use crate::domain::types::ContactId;
use crate::dto::api::{ContactDto, ErrorBodyDto, ListResponseDto};
use crate::forms::contact::{ContactPayload, IMAGE_PART};
use crate::transport::errors::{TransportError, TransportResult};
use crate::transport::{ContactReader, ContactWriter, ListQuery};

/// Talks to `{base_url}/contacts`.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    base_url: String,
    client: Client,
}

impl HttpTransport {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> TransportResult<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn contacts_url(&self) -> String {
        format!("{}/contacts", self.base_url)
    }

    fn contact_url(&self, id: ContactId) -> String {
        format!("{}/contacts/{id}", self.base_url)
    }

    fn send(request: RequestBuilder, fallback: &str) -> TransportResult<Response> {
        let response = request.send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body: ErrorBodyDto = response.json().unwrap_or_default();
        let message = body
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| fallback.to_string());

        log::error!("Backend answered {status}: {message}");

        Err(match status {
            StatusCode::NOT_FOUND => TransportError::NotFound(message),
            StatusCode::BAD_REQUEST if !body.errors.is_empty() => {
                TransportError::ValidationRejected {
                    message,
                    errors: body.errors,
                }
            }
            _ => TransportError::Server {
                status: status.as_u16(),
                message,
            },
        })
    }

    fn multipart(payload: &ContactPayload) -> TransportResult<Form> {
        let mut form = Form::new();
        for (name, value) in payload.text_parts() {
            form = form.text(name, value);
        }
        if let Some(image) = &payload.image {
            let part = Part::bytes(image.bytes.clone())
                .file_name(image.file_name.clone())
                .mime_str(&image.mime_type)?;
            form = form.part(IMAGE_PART, part);
        }
        Ok(form)
    }

    fn read_contact(response: Response) -> TransportResult<Contact> {
        let dto: ContactDto = response.json()?;
        Ok(Contact::try_from(dto)?)
    }
}

impl ContactReader for HttpTransport {
    fn list_contacts(&self, query: &ListQuery) -> TransportResult<PagedResult<Contact>> {
        let mut params: Vec<(&str, String)> = Vec::new();
        if let Some(search) = &query.search {
            params.push(("search", search.clone()));
        }
        if let Some(pagination) = &query.pagination {
            params.push(("page", pagination.page.to_string()));
            params.push(("size", pagination.per_page.to_string()));
        }

        let request = self.client.get(self.contacts_url()).query(&params);
        let response = Self::send(request, "Falha ao buscar contatos")?;
        let dto: ListResponseDto = response.json()?;
        Ok(PagedResult::try_from(dto)?)
    }

    fn get_contact(&self, id: ContactId) -> TransportResult<Contact> {
        let response = Self::send(
            self.client.get(self.contact_url(id)),
            "Falha ao buscar contato",
        )?;
        Self::read_contact(response)
    }
}

impl ContactWriter for HttpTransport {
    fn create_contact(&self, payload: &ContactPayload) -> TransportResult<Contact> {
        let request = self
            .client
            .post(self.contacts_url())
            .multipart(Self::multipart(payload)?);
        let response = Self::send(request, "Falha ao criar contato")?;
        Self::read_contact(response)
    }

    fn update_contact(&self, id: ContactId, payload: &ContactPayload) -> TransportResult<Contact> {
        let request = self
            .client
            .put(self.contact_url(id))
            .multipart(Self::multipart(payload)?);
        let response = Self::send(request, "Falha ao atualizar contato")?;
        Self::read_contact(response)
    }

    fn delete_contact(&self, id: ContactId) -> TransportResult<()> {
        Self::send(
            self.client.delete(self.contact_url(id)),
            "Falha ao excluir contato",
        )?;
        Ok(())
    }
}
