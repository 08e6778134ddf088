use alloc::sync::Arc;

use crate::{LayoutMode, LoadMoreError, LoadRequest, VisibleWindow};

/// Default number of items materialized per window step.
pub const DEFAULT_ITEMS_PER_PAGE: usize = 12;
/// Default estimated row height (px) in grid layout.
pub const DEFAULT_GRID_ITEM_HEIGHT: u32 = 420;
/// Default estimated row height (px) in list layout.
pub const DEFAULT_LIST_ITEM_HEIGHT: u32 = 220;
/// Default distance (px) from the bottom at which scrolling counts as a tail activation.
pub const DEFAULT_TAIL_THRESHOLD: u32 = 200;

/// Invoked when the list reaches its tail and more data may be fetched.
///
/// Returning `Err` reports a synchronous rejection; it is passed back to the caller of
/// `on_tail_activation` and never retried.
pub type LoadMoreCallback = Arc<dyn Fn(LoadRequest) -> Result<(), LoadMoreError> + Send + Sync>;

/// Invoked whenever the visible window changes.
pub type OnWindowChange = Arc<dyn Fn(VisibleWindow) + Send + Sync>;

/// Configuration for [`crate::ListWindow`].
///
/// Cheap to clone: callbacks are stored in `Arc`s.
#[derive(Clone)]
pub struct ListWindowOptions {
    /// Number of items currently known.
    pub len: usize,
    /// Window step size. Values below 1 are treated as 1.
    pub items_per_page: usize,
    pub layout: LayoutMode,
    pub grid_item_height: u32,
    pub list_item_height: u32,
    /// When the scroll position is within this many px of the bottom, `on_scroll` performs a
    /// tail activation.
    pub tail_threshold: u32,
    pub on_load_more: Option<LoadMoreCallback>,
    pub on_change: Option<OnWindowChange>,
}

impl Default for ListWindowOptions {
    fn default() -> Self {
        Self::new(0)
    }
}

impl ListWindowOptions {
    pub fn new(len: usize) -> Self {
        Self {
            len,
            items_per_page: DEFAULT_ITEMS_PER_PAGE,
            layout: LayoutMode::Grid,
            grid_item_height: DEFAULT_GRID_ITEM_HEIGHT,
            list_item_height: DEFAULT_LIST_ITEM_HEIGHT,
            tail_threshold: DEFAULT_TAIL_THRESHOLD,
            on_load_more: None,
            on_change: None,
        }
    }

    pub fn with_items_per_page(mut self, items_per_page: usize) -> Self {
        self.items_per_page = items_per_page;
        self
    }

    pub fn with_layout(mut self, layout: LayoutMode) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_item_heights(mut self, grid_item_height: u32, list_item_height: u32) -> Self {
        self.grid_item_height = grid_item_height;
        self.list_item_height = list_item_height;
        self
    }

    pub fn with_tail_threshold(mut self, tail_threshold: u32) -> Self {
        self.tail_threshold = tail_threshold;
        self
    }

    pub fn with_on_load_more(
        mut self,
        on_load_more: impl Fn(LoadRequest) -> Result<(), LoadMoreError> + Send + Sync + 'static,
    ) -> Self {
        self.on_load_more = Some(Arc::new(on_load_more));
        self
    }

    pub fn with_on_change(
        mut self,
        on_change: impl Fn(VisibleWindow) + Send + Sync + 'static,
    ) -> Self {
        self.on_change = Some(Arc::new(on_change));
        self
    }

    pub(crate) fn step(&self) -> usize {
        self.items_per_page.max(1)
    }

    /// Estimated row height for `layout`, never zero.
    pub fn item_height_for(&self, layout: LayoutMode) -> u32 {
        let h = match layout {
            LayoutMode::Grid => self.grid_item_height,
            LayoutMode::List => self.list_item_height,
        };
        h.max(1)
    }
}

impl core::fmt::Debug for ListWindowOptions {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ListWindowOptions")
            .field("len", &self.len)
            .field("items_per_page", &self.items_per_page)
            .field("layout", &self.layout)
            .field("grid_item_height", &self.grid_item_height)
            .field("list_item_height", &self.list_item_height)
            .field("tail_threshold", &self.tail_threshold)
            .field("on_load_more", &self.on_load_more.is_some())
            .field("on_change", &self.on_change.is_some())
            .finish()
    }
}
