use alloc::string::String;
use alloc::vec::Vec;

use stockview::{QueryDescriptor, SkipReason};

/// A fetch the caller must perform and later hand back to
/// [`crate::FeedController::complete`].
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FetchTicket {
    /// Derived cache key of `descriptor`.
    pub key: String,
    /// Filters including the page to fetch.
    pub descriptor: QueryDescriptor,
    pub page: u32,
    /// Query generation the ticket was issued for.
    pub generation: u64,
}

/// One page returned by the caller's data source.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FetchedPage<T> {
    pub items: Vec<T>,
    /// Total number of results for the filters, across all pages.
    pub total_count: u64,
}

impl<T> FetchedPage<T> {
    pub fn new(items: Vec<T>, total_count: u64) -> Self {
        Self { items, total_count }
    }
}

/// What the caller should do next.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FeedStep {
    /// Items were installed (from the cache or a completed fetch).
    Ready { page: u32, appended: usize },
    /// Nothing cached: perform this fetch.
    Fetch(FetchTicket),
    /// The same page is already being fetched; its completion will be installed.
    AwaitingInFlight { key: String },
    /// A tail signal did not lead to a request.
    Skipped(SkipReason),
    /// Nothing to do.
    Idle,
    /// A completion for a page the current view no longer waits for. It was still cached.
    Stale,
}

impl FeedStep {
    pub fn ticket(self) -> Option<FetchTicket> {
        match self {
            Self::Fetch(t) => Some(t),
            _ => None,
        }
    }
}
