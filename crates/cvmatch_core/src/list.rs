use cvmatch_logging::{cvm_debug, cvm_warn};
use serde_json::Value;

use crate::page::{navigable_pages, LoadError, PageResult, Paged};
use crate::query::{FetchParams, QueryState, SortDirection};
use crate::{Collection, ItemId, ListItem};

/// Sequence token attached to every issued fetch.
pub type RequestId = u64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub request_id: RequestId,
    pub params: FetchParams,
}

/// What happened when a response reached the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Not the latest request; dropped without touching the page.
    Stale,
    Applied,
    /// The requested page no longer exists; the contained request replaces it.
    Clamped(FetchRequest),
    FormatError(String),
    TransportError(String),
}

/// Query state plus the single page it produced, for one collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ListSession<T> {
    collection: Collection,
    query: QueryState,
    page: PageResult<T>,
    last_issued: RequestId,
    loading: bool,
}

impl<T: ListItem> ListSession<T> {
    pub fn new(collection: Collection, page_size: u32) -> Self {
        Self {
            collection,
            query: QueryState::new(page_size, collection.default_sort_field()),
            page: PageResult::default(),
            last_issued: 0,
            loading: false,
        }
    }

    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn query(&self) -> &QueryState {
        &self.query
    }

    pub fn items(&self) -> &[T] {
        &self.page.items
    }

    pub fn current_page(&self) -> u32 {
        self.query.page()
    }

    pub fn total_pages(&self) -> u32 {
        self.page.total_pages
    }

    pub fn total_count(&self) -> u64 {
        self.page.total_count
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Re-issues the current query.
    pub fn refresh(&mut self) -> FetchRequest {
        self.issue(self.query.params())
    }

    /// Out-of-range pages are ignored.
    pub fn set_page(&mut self, page: u32) -> Option<FetchRequest> {
        if page < 1 || page > navigable_pages(self.page.total_pages) {
            return None;
        }
        self.query.set_page(page);
        Some(self.refresh())
    }

    pub fn set_sort(&mut self, field: &str) -> FetchRequest {
        self.query.set_sort(field);
        self.refresh()
    }

    pub fn set_search_term(&mut self, term: &str) -> FetchRequest {
        self.query.set_search_term(term);
        self.refresh()
    }

    /// Direction arrow for `field` when it is the active sort column.
    pub fn sort_indicator(&self, field: &str) -> Option<SortDirection> {
        (self.query.sort_field() == field).then(|| self.query.sort_direction())
    }

    /// At most `window` page numbers around the current page, shifted back near the end.
    pub fn visible_page_numbers(&self, window: u32) -> Vec<u32> {
        let window = window.max(1);
        let total = navigable_pages(self.page.total_pages);
        let mut start = self.query.page().saturating_sub(window / 2).max(1);
        let end = total.min(start + window - 1);
        if end + 1 < start + window {
            start = (end + 1).saturating_sub(window).max(1);
        }
        (start..=end).collect()
    }

    /// Applies a response if it answers the latest request.
    pub fn apply_response(
        &mut self,
        request_id: RequestId,
        response: Result<Value, LoadError>,
    ) -> ApplyOutcome {
        if request_id != self.last_issued {
            cvm_debug!(
                "Discarding stale {} response request_id={} latest={}",
                self.collection,
                request_id,
                self.last_issued
            );
            return ApplyOutcome::Stale;
        }
        self.loading = false;

        let raw = match response {
            Ok(raw) => raw,
            Err(LoadError::Transport(message) | LoadError::NotFound(message)) => {
                cvm_warn!("Failed to load {}: {}", self.collection, message);
                return ApplyOutcome::TransportError(message);
            }
            Err(LoadError::Format(message)) => return self.reject_format(message),
        };

        let paged = match Paged::<T>::decode(raw) {
            Ok(paged) => paged,
            Err(err) => return self.reject_format(err.to_string()),
        };
        let bare = matches!(paged, Paged::Bare(_));
        let page = PageResult::from_paged(paged, self.query.page_size());
        let requested = self.query.page();
        let last_page = navigable_pages(page.total_pages);

        if bare {
            // A bare list is the whole collection on one page.
            self.query.set_page(1);
        }

        if self.query.page() > last_page {
            cvm_debug!(
                "{} page {} out of range (total_pages={}); refetching page {}",
                self.collection,
                requested,
                page.total_pages,
                last_page
            );
            self.page = PageResult {
                items: Vec::new(),
                total_count: page.total_count,
                total_pages: page.total_pages,
            };
            self.query.set_page(last_page);
            return ApplyOutcome::Clamped(self.refresh());
        }

        self.page = page;
        ApplyOutcome::Applied
    }

    /// Drops a deleted record from the current page without waiting for a refetch.
    pub fn remove_item(&mut self, id: ItemId) -> bool {
        let before = self.page.items.len();
        self.page.items.retain(|item| item.item_id() != Some(id));
        let removed = self.page.items.len() != before;
        if removed {
            self.page.total_count = self.page.total_count.saturating_sub(1);
        }
        removed
    }

    fn reject_format(&mut self, message: String) -> ApplyOutcome {
        cvm_warn!("Unexpected {} data format: {}", self.collection, message);
        self.page = PageResult::default();
        ApplyOutcome::FormatError(message)
    }

    fn issue(&mut self, params: FetchParams) -> FetchRequest {
        self.last_issued += 1;
        self.loading = true;
        FetchRequest {
            request_id: self.last_issued,
            params,
        }
    }
}
