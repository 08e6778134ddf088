use alloc::string::String;

/// Failure reported by a `load_more` callback.
///
/// The list window never inspects or retries it; it is handed back to the caller unchanged.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("load more failed: {reason}")]
pub struct LoadMoreError {
    reason: String,
}

impl LoadMoreError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }
}
