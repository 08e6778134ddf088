use alloc::string::String;

use stockview::LoadMoreError;

/// Errors surfaced by [`crate::FeedController`].
///
/// Fetch errors are opaque: the controller never retries and only hands them back.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("fetch failed: {0}")]
    Failed(String),
    #[error("fetch cancelled")]
    Cancelled,
    #[error(transparent)]
    LoadMore(#[from] LoadMoreError),
}

impl FetchError {
    pub fn failed(reason: impl Into<String>) -> Self {
        Self::Failed(reason.into())
    }
}
