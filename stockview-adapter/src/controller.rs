use alloc::string::String;
use alloc::sync::Arc;
use alloc::vec::Vec;

use stockview::{
    ActivationState, LayoutMode, ListWindow, ListWindowOptions, LoadMoreError, QueryDescriptor,
    ResultCache, TailActivation, derive_key,
};

use crate::key::KeySet;
use crate::{FeedStep, FetchError, FetchTicket, FetchedPage};

#[derive(Clone, Debug)]
struct Awaiting {
    key: String,
    page: u32,
}

/// A framework-neutral controller for one paginated listing.
///
/// It owns the known items and a [`ListWindow`], and wires them to a [`ResultCache`] that the
/// caller passes in on every call (one cache per session, shared by any number of feeds).
///
/// Adapters drive it by calling:
/// - `query` when the filter selection changes
/// - `on_scroll` / `on_sentinel` when UI events occur
/// - `complete` when a fetch requested via [`FeedStep::Fetch`] resolves
///
/// Fetches for a key already in flight are not issued twice: the second caller gets
/// [`FeedStep::AwaitingInFlight`] and the first completion is installed for both.
#[derive(Clone, Debug)]
pub struct FeedController<T> {
    list: ListWindow,
    items: Vec<T>,
    query: QueryDescriptor,
    next_page: u32,
    total_count: Option<u64>,
    generation: u64,
    in_flight: KeySet,
    awaiting: Option<Awaiting>,
}

impl<T: Clone> FeedController<T> {
    pub fn new(options: ListWindowOptions) -> Self {
        let options = ListWindowOptions { len: 0, ..options };
        Self {
            list: ListWindow::new(options),
            items: Vec::new(),
            query: QueryDescriptor::new(),
            next_page: 1,
            total_count: None,
            generation: 0,
            in_flight: KeySet::new(),
            awaiting: None,
        }
    }

    pub fn list(&self) -> &ListWindow {
        &self.list
    }

    pub fn list_mut(&mut self) -> &mut ListWindow {
        &mut self.list
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// The items inside the current window.
    pub fn visible(&self) -> &[T] {
        self.list.visible(&self.items)
    }

    /// The active filters, without the paging field.
    pub fn filters(&self) -> &QueryDescriptor {
        &self.query
    }

    pub fn total_count(&self) -> Option<u64> {
        self.total_count
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn next_page(&self) -> u32 {
        self.next_page
    }

    pub fn is_awaiting(&self) -> bool {
        self.awaiting.is_some()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    pub fn is_in_flight(&self, key: &str) -> bool {
        self.in_flight.contains(key)
    }

    pub fn set_layout(&mut self, layout: LayoutMode) {
        self.list.set_layout(layout);
    }

    /// Switches to a new filter selection and loads its first page.
    ///
    /// Known items are dropped and the window goes back to the top. The page in `descriptor`
    /// (default 1) is the first one loaded.
    pub fn query(
        &mut self,
        descriptor: QueryDescriptor,
        cache: &mut ResultCache<T>,
        now_ms: u64,
    ) -> FeedStep {
        let first_page = descriptor.page();
        self.generation = self.generation.wrapping_add(1);
        sdebug!(
            generation = self.generation,
            first_page,
            "FeedController::query"
        );

        self.query = descriptor.without_page();
        self.items.clear();
        self.total_count = None;
        self.next_page = first_page;
        self.awaiting = None;
        self.list.reset(0);
        self.list.set_has_more(false);
        self.list.set_loading(false);

        self.load_page(first_page, cache, now_ms)
    }

    /// Re-runs the active query from its first page, e.g. after a cache clear.
    pub fn refresh(&mut self, cache: &mut ResultCache<T>, now_ms: u64) -> FeedStep {
        let query = self.query.clone();
        self.query(query, cache, now_ms)
    }

    fn load_page(&mut self, page: u32, cache: &mut ResultCache<T>, now_ms: u64) -> FeedStep {
        let descriptor = self.query.clone().with_page(page);
        let key = derive_key(&descriptor);

        if let Some(hit) = cache.get_by_key(&key, now_ms) {
            strace!(key = key.as_str(), page, "page served from cache");
            let appended = self.install(page, &hit.items, hit.total_count);
            return FeedStep::Ready { page, appended };
        }

        self.awaiting = Some(Awaiting {
            key: key.clone(),
            page,
        });
        self.list.set_loading(true);

        if self.in_flight.contains(&key) {
            sdebug!(key = key.as_str(), "page already in flight, awaiting it");
            return FeedStep::AwaitingInFlight { key };
        }

        self.in_flight.insert(key.clone());
        strace!(key = key.as_str(), page, "page fetch requested");
        FeedStep::Fetch(FetchTicket {
            key,
            descriptor,
            page,
            generation: self.generation,
        })
    }

    fn install(&mut self, page: u32, items: &[T], total_count: u64) -> usize {
        let appended = items.len();
        self.items.extend_from_slice(items);
        self.next_page = page.saturating_add(1);
        self.total_count = Some(total_count);

        let known = self.items.len() as u64;
        self.list.set_len(self.items.len());
        self.list.set_has_more(appended > 0 && known < total_count);
        self.list.set_loading(false);
        self.list.clear_pending();
        appended
    }

    /// Hands back the outcome of a fetch issued via [`FeedStep::Fetch`].
    ///
    /// A successful page is always written to the cache, even when the view has moved on (the
    /// result is then reported as [`FeedStep::Stale`]). A failure for the awaited page stops
    /// loading and is returned; nothing is retried.
    pub fn complete(
        &mut self,
        ticket: FetchTicket,
        result: Result<FetchedPage<T>, FetchError>,
        cache: &mut ResultCache<T>,
        now_ms: u64,
    ) -> Result<FeedStep, FetchError> {
        self.in_flight.remove(&ticket.key);
        let awaited = self
            .awaiting
            .as_ref()
            .is_some_and(|a| a.key == ticket.key && a.page == ticket.page);

        match result {
            Ok(page) => {
                let total_count = page.total_count;
                let items: Arc<[T]> = page.items.into();
                cache.set_by_key(ticket.key.clone(), Arc::clone(&items), total_count, now_ms);

                if !awaited {
                    sdebug!(
                        key = ticket.key.as_str(),
                        ticket_generation = ticket.generation,
                        generation = self.generation,
                        "stale page cached"
                    );
                    return Ok(FeedStep::Stale);
                }
                self.awaiting = None;
                let appended = self.install(ticket.page, &items, total_count);
                Ok(FeedStep::Ready {
                    page: ticket.page,
                    appended,
                })
            }
            Err(err) => {
                if !awaited {
                    sdebug!(key = ticket.key.as_str(), error = %err, "stale fetch failed");
                    return Ok(FeedStep::Stale);
                }
                swarn!(key = ticket.key.as_str(), error = %err, "page fetch failed");
                self.awaiting = None;
                self.list.set_loading(false);
                self.list.clear_pending();
                Err(err)
            }
        }
    }

    /// Abandons a ticket without a result.
    pub fn cancel(&mut self, ticket: FetchTicket) {
        self.in_flight.remove(&ticket.key);
        let awaited = self
            .awaiting
            .as_ref()
            .is_some_and(|a| a.key == ticket.key);
        if awaited {
            self.awaiting = None;
            self.list.set_loading(false);
            self.list.clear_pending();
        }
    }

    fn on_tail(
        &mut self,
        tail: Result<TailActivation, LoadMoreError>,
        cache: &mut ResultCache<T>,
        now_ms: u64,
    ) -> Result<FeedStep, FetchError> {
        match tail? {
            TailActivation::Requested(_) => Ok(self.load_page(self.next_page, cache, now_ms)),
            TailActivation::Skipped(reason) => Ok(FeedStep::Skipped(reason)),
        }
    }

    /// Forwards a scroll event; near the bottom it loads the next page.
    pub fn on_scroll(
        &mut self,
        scroll_top: u64,
        container_height: u32,
        scroll_height: u64,
        cache: &mut ResultCache<T>,
        now_ms: u64,
    ) -> Result<FeedStep, FetchError> {
        let update = self
            .list
            .handle_scroll(scroll_top, container_height, scroll_height);
        match update.tail {
            Some(tail) => self.on_tail(tail, cache, now_ms),
            None => Ok(FeedStep::Idle),
        }
    }

    /// Forwards the tail sentinel's activation state.
    pub fn on_sentinel(
        &mut self,
        state: ActivationState,
        cache: &mut ResultCache<T>,
        now_ms: u64,
    ) -> Result<FeedStep, FetchError> {
        let tail = self.list.on_sentinel(state);
        self.on_tail(tail, cache, now_ms)
    }
}
