//! Contact session: the single owner of list, editor and notification state.
//!
//! Transport calls happen here and nowhere else. Failures are turned into
//! list error state or an error notification; callers only see them in the
//! returned outcome.

use std::time::Instant;

use chrono::NaiveDate;

use crate::domain::contact::Contact;
use crate::domain::types::ContactId;
use crate::dto::view::ListView;
use crate::forms::ContactField;
use crate::forms::contact::ContactEditor;
use crate::forms::image::{ImageFile, ImageLimits, ImageProbe};
use crate::services::list::{ListController, ListRequest, ListSettings};
use crate::services::notification::{Mutation, NotificationFlow, NotificationState, PendingAction};
use crate::services::{ServiceError, ServiceResult};
use crate::transport::{ContactReader, ContactWriter, TransportError};

/// Result of submitting the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// An update is waiting in the confirmation gate.
    AwaitingConfirmation,
    Created(ContactId),
    /// The backend refused the create; the editor stays open.
    Failed(TransportError),
}

/// Result of confirming the pending action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmOutcome {
    Deleted(ContactId),
    Updated(ContactId),
    Failed(TransportError),
}

#[derive(Debug, Default)]
pub struct ContactSession {
    list: ListController,
    notification: NotificationFlow,
    editor: Option<ContactEditor>,
    image_limits: ImageLimits,
}

impl ContactSession {
    pub fn new(settings: ListSettings, image_limits: ImageLimits) -> Self {
        Self {
            list: ListController::new(settings),
            notification: NotificationFlow::new(),
            editor: None,
            image_limits,
        }
    }

    pub fn list(&self) -> &ListController {
        &self.list
    }

    pub fn notification(&self) -> &NotificationState {
        self.notification.state()
    }

    pub fn editor(&self) -> Option<&ContactEditor> {
        self.editor.as_ref()
    }

    pub fn image_limits(&self) -> &ImageLimits {
        &self.image_limits
    }

    pub fn view(&self) -> ListView {
        ListView::from(&self.list)
    }

    /// Executes a list request and applies its outcome. Returns `false` when
    /// the response was stale.
    fn load<T>(&mut self, transport: &T, request: ListRequest) -> bool
    where
        T: ContactReader + ?Sized,
    {
        let outcome = transport.list_contacts(&request.query);
        self.list.complete(request.generation, outcome)
    }

    fn load_if<T>(&mut self, transport: &T, request: Option<ListRequest>) -> bool
    where
        T: ContactReader + ?Sized,
    {
        request.is_some_and(|request| self.load(transport, request))
    }

    /// Initial load.
    pub fn start<T>(&mut self, transport: &T) -> bool
    where
        T: ContactReader + ?Sized,
    {
        let request = self.list.start();
        self.load(transport, request)
    }

    /// Feeds the search box. Returns whether a load was applied right away.
    pub fn search<T>(&mut self, transport: &T, term: &str, now: Instant) -> bool
    where
        T: ContactReader + ?Sized,
    {
        let request = self.list.search_changed(term, now);
        self.load_if(transport, request)
    }

    /// Runs the debounced search once its window has elapsed.
    pub fn tick<T>(&mut self, transport: &T, now: Instant) -> bool
    where
        T: ContactReader + ?Sized,
    {
        let request = self.list.poll(now);
        self.load_if(transport, request)
    }

    pub fn go_to_page<T>(&mut self, transport: &T, page: usize) -> bool
    where
        T: ContactReader + ?Sized,
    {
        let request = self.list.change_page(page);
        self.load_if(transport, request)
    }

    /// Replays the last list request after a failure.
    pub fn retry<T>(&mut self, transport: &T) -> bool
    where
        T: ContactReader + ?Sized,
    {
        let request = self.list.retry();
        self.load_if(transport, request)
    }

    pub fn open_create(&mut self) {
        self.editor = Some(ContactEditor::create());
    }

    /// Opens the editor for a contact already on screen.
    pub fn open_edit(&mut self, contact: &Contact) {
        self.editor = Some(ContactEditor::edit(contact));
    }

    /// Opens the editor for `id`, fetching the record when it is not loaded.
    pub fn open_edit_by_id<T>(&mut self, transport: &T, id: ContactId) -> ServiceResult<()>
    where
        T: ContactReader + ?Sized,
    {
        let contact = self.lookup(transport, id)?;
        self.open_edit(&contact);
        Ok(())
    }

    /// Fetches a contact for display, preferring the loaded page.
    pub fn show<T>(&mut self, transport: &T, id: ContactId) -> ServiceResult<Contact>
    where
        T: ContactReader + ?Sized,
    {
        self.lookup(transport, id)
    }

    fn lookup<T>(&mut self, transport: &T, id: ContactId) -> ServiceResult<Contact>
    where
        T: ContactReader + ?Sized,
    {
        if let Some(contact) = self.list.find(id) {
            return Ok(contact.clone());
        }
        transport.get_contact(id).map_err(|err| {
            log::error!("Failed to load contact {id}: {err}");
            self.notification
                .error("Erro ao carregar contato", format!("Erro: {err}"));
            ServiceError::from(err)
        })
    }

    pub fn close_editor(&mut self) {
        self.editor = None;
    }

    fn editor_mut(&mut self) -> ServiceResult<&mut ContactEditor> {
        self.editor.as_mut().ok_or(ServiceError::NoEditor)
    }

    pub fn set_field(&mut self, field: ContactField, value: &str) -> ServiceResult<()> {
        self.editor_mut()?.set_field(field, value);
        Ok(())
    }

    /// Runs the image guard and attaches `file` to the open editor.
    pub fn attach_image(&mut self, file: ImageFile, probe: &dyn ImageProbe) -> ServiceResult<()> {
        let limits = self.image_limits.clone();
        self.editor_mut()?.attach_image(file, &limits, probe)?;
        Ok(())
    }

    /// Validates the editor and either creates the contact right away or, for
    /// an existing record, routes the change through update confirmation.
    pub fn submit<T>(&mut self, transport: &T, today: NaiveDate) -> ServiceResult<SubmitOutcome>
    where
        T: ContactReader + ContactWriter + ?Sized,
    {
        let editor = self.editor_mut()?;
        let payload = editor.validate_at(today)?;

        if let Some(original) = editor.original.clone() {
            self.notification.request_update(original, payload);
            return Ok(SubmitOutcome::AwaitingConfirmation);
        }

        match transport.create_contact(&payload) {
            Ok(contact) => {
                log::info!("Created contact {}", contact.id);
                let id = contact.id;
                self.notification.succeed(Mutation::Create, &contact.name);
                self.editor = None;
                let request = self.list.contact_created(contact);
                self.load_if(transport, request);
                Ok(SubmitOutcome::Created(id))
            }
            Err(err) => {
                log::error!("Failed to create contact: {err}");
                self.notification.fail(Mutation::Create, &err);
                Ok(SubmitOutcome::Failed(err))
            }
        }
    }

    /// Puts a delete for `contact` behind the confirmation gate.
    pub fn request_delete(&mut self, contact: &Contact) {
        self.notification.request_delete(contact.id, contact.name.clone());
    }

    pub fn request_delete_by_id<T>(&mut self, transport: &T, id: ContactId) -> ServiceResult<()>
    where
        T: ContactReader + ?Sized,
    {
        let contact = self.lookup(transport, id)?;
        self.request_delete(&contact);
        Ok(())
    }

    /// Executes the confirmed action.
    pub fn confirm<T>(&mut self, transport: &T) -> ServiceResult<ConfirmOutcome>
    where
        T: ContactReader + ContactWriter + ?Sized,
    {
        let action = self
            .notification
            .take_confirmed()
            .ok_or(ServiceError::NoPendingAction)?;

        match action {
            PendingAction::Delete(target) => match transport.delete_contact(target.id) {
                Ok(()) => {
                    log::info!("Deleted contact {}", target.id);
                    self.notification.succeed(Mutation::Delete, &target.name);
                    let request = self.list.contact_deleted(target.id);
                    self.load_if(transport, request);
                    Ok(ConfirmOutcome::Deleted(target.id))
                }
                Err(err) => {
                    log::error!("Failed to delete contact {}: {err}", target.id);
                    self.notification.fail(Mutation::Delete, &err);
                    Ok(ConfirmOutcome::Failed(err))
                }
            },
            PendingAction::Update(pending) => {
                match transport.update_contact(pending.id, &pending.payload) {
                    Ok(contact) => {
                        log::info!("Updated contact {}", contact.id);
                        let id = contact.id;
                        self.notification.succeed(Mutation::Update, &contact.name);
                        self.list.contact_updated(contact);
                        // Another editor may have been opened since the update was raised.
                        if self.editing(id) {
                            self.editor = None;
                        }
                        Ok(ConfirmOutcome::Updated(id))
                    }
                    Err(err) => {
                        log::error!("Failed to update contact {}: {err}", pending.id);
                        self.notification.fail(Mutation::Update, &err);
                        Ok(ConfirmOutcome::Failed(err))
                    }
                }
            }
        }
    }

    fn editing(&self, id: ContactId) -> bool {
        self.editor
            .as_ref()
            .and_then(|editor| editor.original.as_ref())
            .is_some_and(|original| original.id == id)
    }

    /// Dismisses the current notification, abandoning any pending action.
    pub fn close_notification(&mut self) {
        self.notification.close();
    }
}
