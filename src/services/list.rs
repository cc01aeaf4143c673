//! List, search and pagination state.
//!
//! The controller never talks to the transport itself. Every operation that
//! needs data returns a [`ListRequest`] stamped with a generation; the driver
//! executes it and hands the outcome back through
//! [`ListController::complete`]. Only the completion carrying the latest
//! generation is applied, so responses for abandoned search terms or pages
//! are dropped on arrival.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::domain::contact::{Contact, PagedResult};
use crate::domain::types::{ContactId, strip_non_digits};
use crate::transport::ListQuery;
use crate::transport::errors::TransportResult;

pub const DEFAULT_PAGE_SIZE: usize = 10;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// How the list is sourced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListMode {
    /// The server pages and searches.
    #[default]
    Paged,
    /// The whole list is fetched once and searched locally.
    ClientFiltered,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ListSettings {
    pub mode: ListMode,
    pub page_size: usize,
    pub debounce: Duration,
}

impl Default for ListSettings {
    fn default() -> Self {
        Self {
            mode: ListMode::Paged,
            page_size: DEFAULT_PAGE_SIZE,
            debounce: DEFAULT_DEBOUNCE,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ListStatus {
    Idle,
    Loading,
    Loaded,
    /// Holds the user-facing message; the last loaded content is kept.
    Error(String),
}

/// 1-based ordinals shown next to each contact.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DisplayIndexMap(HashMap<ContactId, usize>);

impl DisplayIndexMap {
    /// Numbers `contacts` from `offset + 1` in order.
    pub fn rebuild(offset: usize, contacts: &[Contact]) -> Self {
        Self(
            contacts
                .iter()
                .enumerate()
                .map(|(position, contact)| (contact.id, offset + position + 1))
                .collect(),
        )
    }

    pub fn get(&self, id: ContactId) -> Option<usize> {
        self.0.get(&id).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn next_index(&self) -> usize {
        self.0.values().copied().max().unwrap_or(0) + 1
    }
}

/// A list call the driver must execute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListRequest {
    pub generation: u64,
    pub query: ListQuery,
}

/// Search term waiting for the debounce window to elapse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingSearch {
    pub term: String,
    pub deadline: Instant,
}

#[derive(Debug)]
pub struct ListController {
    settings: ListSettings,
    search_term: String,
    current_page: usize,
    status: ListStatus,
    result: PagedResult<Contact>,
    indices: DisplayIndexMap,
    pending_search: Option<PendingSearch>,
    generation: u64,
    last_query: Option<ListQuery>,
}

impl Default for ListController {
    fn default() -> Self {
        Self::new(ListSettings::default())
    }
}

impl ListController {
    pub fn new(settings: ListSettings) -> Self {
        Self {
            settings,
            search_term: String::new(),
            current_page: 0,
            status: ListStatus::Idle,
            result: PagedResult::default(),
            indices: DisplayIndexMap::default(),
            pending_search: None,
            generation: 0,
            last_query: None,
        }
    }

    pub fn settings(&self) -> &ListSettings {
        &self.settings
    }

    pub fn status(&self) -> &ListStatus {
        &self.status
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    /// Last successfully loaded result.
    pub fn result(&self) -> &PagedResult<Contact> {
        &self.result
    }

    pub fn indices(&self) -> &DisplayIndexMap {
        &self.indices
    }

    pub fn index_of(&self, id: ContactId) -> Option<usize> {
        self.indices.get(id)
    }

    pub fn pending_search(&self) -> Option<&PendingSearch> {
        self.pending_search.as_ref()
    }

    /// When the driver should next call [`ListController::poll`].
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending_search.as_ref().map(|pending| pending.deadline)
    }

    pub fn find(&self, id: ContactId) -> Option<&Contact> {
        self.result.content.iter().find(|contact| contact.id == id)
    }

    /// Contacts to display. In client-filtered mode the current term is
    /// applied here.
    pub fn visible(&self) -> Vec<&Contact> {
        match self.settings.mode {
            ListMode::Paged => self.result.content.iter().collect(),
            ListMode::ClientFiltered => self
                .result
                .content
                .iter()
                .filter(|contact| matches_term(contact, &self.search_term))
                .collect(),
        }
    }

    fn query_for(&self, term: &str, page: usize) -> ListQuery {
        match self.settings.mode {
            ListMode::Paged => ListQuery::new()
                .search(term)
                .paginate(page, self.settings.page_size),
            ListMode::ClientFiltered => ListQuery::new(),
        }
    }

    fn issue(&mut self, query: ListQuery) -> ListRequest {
        self.generation += 1;
        self.status = ListStatus::Loading;
        self.last_query = Some(query.clone());
        ListRequest {
            generation: self.generation,
            query,
        }
    }

    /// Request for the initial load.
    pub fn start(&mut self) -> ListRequest {
        self.pending_search = None;
        let query = self.query_for(&self.search_term, 0);
        self.issue(query)
    }

    /// Handles a keystroke in the search box.
    ///
    /// An empty term loads page 0 immediately. A non-empty term (re)starts the
    /// debounce window and returns nothing; [`ListController::poll`] issues
    /// the request once the window elapses. Any request already in flight is
    /// invalidated.
    pub fn search_changed(&mut self, term: &str, now: Instant) -> Option<ListRequest> {
        self.search_term = term.to_string();

        if self.settings.mode == ListMode::ClientFiltered {
            self.pending_search = None;
            return None;
        }

        self.generation += 1;

        if term.trim().is_empty() {
            self.pending_search = None;
            return Some(self.issue(self.query_for("", 0)));
        }

        log::debug!("Debouncing search for {term:?}");
        self.pending_search = Some(PendingSearch {
            term: term.to_string(),
            deadline: now + self.settings.debounce,
        });
        None
    }

    /// Fires the pending search when its debounce window has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<ListRequest> {
        if self
            .pending_search
            .as_ref()
            .is_none_or(|pending| now < pending.deadline)
        {
            return None;
        }
        let pending = self.pending_search.take()?;
        Some(self.issue(self.query_for(&pending.term, 0)))
    }

    /// Navigates to `page`, cancelling any pending search debounce.
    ///
    /// Client-filtered lists have a single page, so nothing is requested.
    pub fn change_page(&mut self, page: usize) -> Option<ListRequest> {
        if self.settings.mode == ListMode::ClientFiltered {
            return None;
        }
        if self.pending_search.take().is_some() {
            log::debug!("Page change cancelled a pending search");
        }
        let page = match self.result.total_pages {
            0 => page,
            total => page.min(total - 1),
        };
        let term = self.search_term.clone();
        Some(self.issue(self.query_for(&term, page)))
    }

    /// Replays the last request.
    pub fn retry(&mut self) -> Option<ListRequest> {
        let query = self.last_query.clone()?;
        Some(self.issue(query))
    }

    /// Re-fetches the last loaded page for the current term.
    pub fn refresh(&mut self) -> ListRequest {
        self.reload(self.current_page)
    }

    fn reload(&mut self, page: usize) -> ListRequest {
        self.pending_search = None;
        let term = self.search_term.clone();
        self.issue(self.query_for(&term, page))
    }

    /// Applies the outcome of a request. Returns `false` when the completion
    /// was stale and therefore dropped.
    pub fn complete(
        &mut self,
        generation: u64,
        outcome: TransportResult<PagedResult<Contact>>,
    ) -> bool {
        if generation != self.generation {
            log::debug!(
                "Dropping stale list response (generation {generation}, current {})",
                self.generation
            );
            return false;
        }

        match outcome {
            Ok(page) => {
                self.indices = DisplayIndexMap::rebuild(page.offset(), &page.content);
                if self.settings.mode == ListMode::Paged {
                    self.current_page = page.page_number;
                }
                self.result = page;
                self.status = ListStatus::Loaded;
            }
            Err(err) => {
                log::error!("Failed to load contacts: {err}");
                self.status = ListStatus::Error(format!("Falha ao carregar contatos: {err}"));
            }
        }
        true
    }

    /// Reconciles a newly created contact.
    pub fn contact_created(&mut self, contact: Contact) -> Option<ListRequest> {
        match self.settings.mode {
            ListMode::Paged => Some(self.refresh()),
            ListMode::ClientFiltered => {
                let index = self.indices.next_index();
                self.indices.0.insert(contact.id, index);
                self.result.content.push(contact);
                self.result.total_elements += 1;
                self.result.page_size = self.result.content.len();
                self.result.total_pages = 1;
                None
            }
        }
    }

    /// Replaces the record with the same id, keeping its display index.
    pub fn contact_updated(&mut self, contact: Contact) {
        if let Some(slot) = self
            .result
            .content
            .iter_mut()
            .find(|existing| existing.id == contact.id)
        {
            *slot = contact;
        }
    }

    /// Removes the record and renumbers the rest without gaps. Paged lists
    /// also re-fetch, stepping back a page when this one became empty.
    pub fn contact_deleted(&mut self, id: ContactId) -> Option<ListRequest> {
        let before = self.result.content.len();
        self.result.content.retain(|contact| contact.id != id);
        if self.result.content.len() < before {
            self.result.total_elements = self.result.total_elements.saturating_sub(1);
        }
        let offset = match self.settings.mode {
            ListMode::Paged => self.result.offset(),
            ListMode::ClientFiltered => 0,
        };
        self.indices = DisplayIndexMap::rebuild(offset, &self.result.content);

        match self.settings.mode {
            ListMode::ClientFiltered => None,
            ListMode::Paged => {
                let page = if self.result.content.is_empty() {
                    self.current_page.saturating_sub(1)
                } else {
                    self.current_page
                };
                Some(self.reload(page))
            }
        }
    }
}

fn matches_term(contact: &Contact, term: &str) -> bool {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return true;
    }
    // Phone matching only for terms that look like a phone number.
    let digits = strip_non_digits(&term);
    let phone_like = !digits.is_empty() && !term.chars().any(char::is_alphabetic);
    contact.name.to_lowercase().contains(&term)
        || contact.email.to_lowercase().contains(&term)
        || (phone_like && contact.phone.as_str().contains(&digits))
}
