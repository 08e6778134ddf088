use core::cell::Cell;

use crate::{
    ActivationState, LayoutMode, ListSnapshot, ListWindowOptions, LoadMoreError, LoadRequest,
    SkipReason, TailActivation, VisibleWindow,
};

/// Returns the items covered by `window`.
///
/// Pure: a window that overhangs `items` is clamped, never panics, and nothing is mutated.
pub fn compute_visible<T>(items: &[T], window: VisibleWindow) -> &[T] {
    let w = window.clamp_to(items.len());
    &items[w.start..w.end]
}

/// Result of [`ListWindow::handle_scroll`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrollUpdate {
    pub window: VisibleWindow,
    /// Present when the scroll position reached the tail threshold.
    pub tail: Option<Result<TailActivation, LoadMoreError>>,
}

/// An incremental list renderer.
///
/// Exposes a bounded slice `[start, end)` of the known results and asks for more data as the
/// user approaches the end. Like the cache, it holds no items and no UI objects: the adapter
/// owns the data and feeds in lengths, scroll positions and sentinel activations.
///
/// Scroll-to-index mapping is an estimate. The start index is `scroll_top / item_height`, with
/// a fixed row height per [`LayoutMode`]; nothing is measured. Switching layout changes the
/// estimate but keeps the current window, so the next scroll event may jump.
#[derive(Clone, Debug)]
pub struct ListWindow {
    options: ListWindowOptions,
    window: VisibleWindow,
    has_more: bool,
    loading: bool,
    load_pending: bool,
    last_scroll_top: u64,

    notify_depth: Cell<usize>,
    notify_pending: Cell<bool>,
}

impl ListWindow {
    pub fn new(options: ListWindowOptions) -> Self {
        sdebug!(
            len = options.len,
            items_per_page = options.items_per_page,
            "ListWindow::new"
        );
        let window = VisibleWindow::new(0, options.step().min(options.len));
        Self {
            options,
            window,
            has_more: false,
            loading: false,
            load_pending: false,
            last_scroll_top: 0,
            notify_depth: Cell::new(0),
            notify_pending: Cell::new(false),
        }
    }

    pub fn options(&self) -> &ListWindowOptions {
        &self.options
    }

    fn notify_now(&self) {
        if let Some(cb) = &self.options.on_change {
            cb(self.window);
        }
    }

    fn notify(&self) {
        if self.notify_depth.get() > 0 {
            self.notify_pending.set(true);
            return;
        }
        self.notify_now();
    }

    /// Batches multiple updates into a single `on_change` notification.
    pub fn batch_update(&mut self, f: impl FnOnce(&mut Self)) {
        let depth = self.notify_depth.get();
        self.notify_depth.set(depth.saturating_add(1));

        f(self);

        let depth = self.notify_depth.get();
        debug_assert!(depth > 0, "notify_depth underflow");
        let next = depth.saturating_sub(1);
        self.notify_depth.set(next);

        if next == 0 && self.notify_pending.replace(false) {
            self.notify_now();
        }
    }

    fn set_window(&mut self, window: VisibleWindow) {
        let window = window.clamp_to(self.options.len);
        if self.window == window {
            return;
        }
        strace!(start = window.start, end = window.end, "window changed");
        self.window = window;
        self.notify();
    }

    pub fn window(&self) -> VisibleWindow {
        self.window
    }

    pub fn len(&self) -> usize {
        self.options.len
    }

    pub fn is_empty(&self) -> bool {
        self.options.len == 0
    }

    pub fn items_per_page(&self) -> usize {
        self.options.step()
    }

    /// The currently visible items of `items` (the caller's full known sequence).
    pub fn visible<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        compute_visible(items, self.window)
    }

    /// Updates the known length, e.g. after data was appended.
    ///
    /// The window keeps its start and is re-extended up to one step. Growth clears the pending
    /// load latch.
    pub fn set_len(&mut self, len: usize) {
        let prev = self.options.len;
        if prev == len {
            return;
        }
        self.options.len = len;
        if len > prev {
            self.load_pending = false;
        }
        let start = self.window.start.min(len);
        let end = start.saturating_add(self.options.step()).min(len);
        strace!(prev, len, "ListWindow::set_len");
        self.set_window(VisibleWindow::new(start, end));
    }

    pub fn append(&mut self, added: usize) {
        let len = self.options.len.saturating_add(added);
        self.set_len(len);
    }

    /// Starts over for a new result set: window back to the first step, pending latch cleared.
    pub fn reset(&mut self, len: usize) {
        sdebug!(len, "ListWindow::reset");
        self.options.len = len;
        self.load_pending = false;
        self.last_scroll_top = 0;
        let end = self.options.step().min(len);
        self.set_window(VisibleWindow::new(0, end));
    }

    pub fn layout(&self) -> LayoutMode {
        self.options.layout
    }

    /// Switches the row height estimate. The current window is kept as is.
    pub fn set_layout(&mut self, layout: LayoutMode) {
        if self.options.layout == layout {
            return;
        }
        sdebug!(?layout, "ListWindow::set_layout");
        self.options.layout = layout;
    }

    pub fn item_height(&self) -> u32 {
        self.options.item_height_for(self.options.layout)
    }

    pub fn set_items_per_page(&mut self, items_per_page: usize) {
        self.options.items_per_page = items_per_page;
        let start = self.window.start;
        let end = start.saturating_add(self.options.step()).min(self.options.len);
        self.set_window(VisibleWindow::new(start, end));
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn set_has_more(&mut self, has_more: bool) {
        self.has_more = has_more;
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Mirrors the caller's loading flag. A `true -> false` change clears the pending latch.
    pub fn set_loading(&mut self, loading: bool) {
        if self.loading && !loading {
            self.load_pending = false;
        }
        self.loading = loading;
    }

    /// `true` between a load request and the caller reporting its end.
    pub fn is_load_pending(&self) -> bool {
        self.load_pending
    }

    /// Drops the pending latch without new data (e.g. the caller abandoned the request).
    pub fn clear_pending(&mut self) {
        self.load_pending = false;
    }

    pub fn last_scroll_top(&self) -> u64 {
        self.last_scroll_top
    }

    /// Maps a scroll position to a window.
    ///
    /// `start = scroll_top / item_height` (clamped to the length), `end = min(start + step, len)`.
    /// Only the latest event matters; there is no history.
    #[cfg_attr(not(feature = "tracing"), allow(unused_variables))]
    pub fn on_scroll(
        &mut self,
        scroll_top: u64,
        container_height: u32,
        scroll_height: u64,
    ) -> VisibleWindow {
        strace!(scroll_top, container_height, scroll_height, "ListWindow::on_scroll");
        self.last_scroll_top = scroll_top;
        let len = self.options.len;
        let row = scroll_top / self.item_height() as u64;
        let start = usize::try_from(row).unwrap_or(usize::MAX).min(len);
        let end = start.saturating_add(self.options.step()).min(len);
        self.set_window(VisibleWindow::new(start, end));
        self.window
    }

    /// Whether a scroll position is within `tail_threshold` of the bottom.
    pub fn is_near_tail(&self, scroll_top: u64, container_height: u32, scroll_height: u64) -> bool {
        if scroll_height == 0 {
            return false;
        }
        scroll_top
            .saturating_add(container_height as u64)
            .saturating_add(self.options.tail_threshold as u64)
            >= scroll_height
    }

    /// [`ListWindow::on_scroll`] followed by a tail activation when near the bottom.
    pub fn handle_scroll(
        &mut self,
        scroll_top: u64,
        container_height: u32,
        scroll_height: u64,
    ) -> ScrollUpdate {
        let window = self.on_scroll(scroll_top, container_height, scroll_height);
        let tail = self
            .is_near_tail(scroll_top, container_height, scroll_height)
            .then(|| self.on_tail_activation());
        ScrollUpdate { window, tail }
    }

    /// Requests more data if the list can grow and nothing is in flight.
    ///
    /// Repeated activations while a request is pending (or the caller reports `loading`) are
    /// skipped, so a burst of sentinel signals yields a single `on_load_more` call. A callback
    /// error clears the latch and is returned as is.
    pub fn on_tail_activation(&mut self) -> Result<TailActivation, LoadMoreError> {
        if !self.has_more {
            return Ok(TailActivation::Skipped(SkipReason::NoMore));
        }
        if self.loading {
            return Ok(TailActivation::Skipped(SkipReason::Loading));
        }
        if self.load_pending {
            return Ok(TailActivation::Skipped(SkipReason::Pending));
        }

        let request = LoadRequest {
            offset: self.options.len,
        };
        self.load_pending = true;
        sdebug!(offset = request.offset, "ListWindow: requesting more");

        if let Some(cb) = self.options.on_load_more.clone() {
            if let Err(err) = cb(request) {
                swarn!(error = %err, "ListWindow: load_more failed");
                self.load_pending = false;
                return Err(err);
            }
        }
        Ok(TailActivation::Requested(request))
    }

    /// Feeds a tail-sentinel activation state.
    pub fn on_sentinel(&mut self, state: ActivationState) -> Result<TailActivation, LoadMoreError> {
        if !state.is_intersecting {
            return Ok(TailActivation::Skipped(SkipReason::NotIntersecting));
        }
        self.on_tail_activation()
    }

    pub fn snapshot(&self) -> ListSnapshot {
        ListSnapshot {
            window: self.window,
            layout: self.options.layout,
            has_more: self.has_more,
        }
    }

    /// Restores a snapshot, clamped to the current length.
    pub fn restore(&mut self, snapshot: ListSnapshot) {
        self.batch_update(|w| {
            w.set_layout(snapshot.layout);
            w.set_has_more(snapshot.has_more);
            w.set_window(snapshot.window);
        });
    }
}
