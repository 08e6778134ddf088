//! Headless query-result caching and incremental list windowing for inventory browsing.
//!
//! For the wiring of cache, list window and fetches into one feed, see the
//! `stockview-adapter` crate.
//!
//! The crate has three independent parts:
//! - [`ResultCache`]: result pages keyed by a canonical [`QueryDescriptor`] key, bounded in
//!   size and age.
//! - [`ActivationTracker`]: visibility of regions inside a root, as a stream of transitions,
//!   plus [`LazyMount`] / [`LazyResource`] built on one-shot activation.
//! - [`ListWindow`]: the slice of a result sequence to render, and when to ask for more.
//!
//! It is UI-agnostic and clock-free. A UI layer is expected to provide:
//! - the current time (`now_ms`) for cache operations
//! - region and root bounds for activation checks
//! - scroll position, container height and content height
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod activation;
mod cache;
mod error;
mod key;
mod lazy;
mod options;
mod query;
mod state;
mod types;
mod window;

#[cfg(test)]
mod tests;

pub use activation::{
    ActivationCallback, ActivationTracker, ObservationId, ObserveOptions, expand_root,
    intersection_ratio, is_intersecting,
};
pub use cache::{
    CacheOptions, CacheStats, CachedPage, DEFAULT_CAPACITY, DEFAULT_TTL_MS, ResultCache,
};
pub use error::LoadMoreError;
pub use key::RegionKey;
pub use lazy::{LazyMount, LazyResource, LoadPhase};
pub use options::{
    DEFAULT_GRID_ITEM_HEIGHT, DEFAULT_ITEMS_PER_PAGE, DEFAULT_LIST_ITEM_HEIGHT,
    DEFAULT_TAIL_THRESHOLD, ListWindowOptions, LoadMoreCallback, OnWindowChange,
};
pub use query::{FilterValue, PAGE_FIELD, QueryDescriptor, derive_key};
pub use state::ListSnapshot;
pub use types::{
    ActivationState, Bounds, LayoutMode, LoadRequest, RootMargin, SkipReason, TailActivation,
    VisibleWindow,
};
pub use window::{ListWindow, ScrollUpdate, compute_visible};
