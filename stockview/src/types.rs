/// A half-open index range `[start, end)` over the known result sequence.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VisibleWindow {
    pub start: usize,
    pub end: usize, // exclusive
}

impl VisibleWindow {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Returns this window clamped so that `start <= end <= len`.
    pub fn clamp_to(self, len: usize) -> Self {
        let start = self.start.min(len);
        let end = self.end.min(len).max(start);
        Self { start, end }
    }

    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end
    }
}

/// Layout used to render the list; each mode has its own item height estimate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LayoutMode {
    #[default]
    Grid,
    List,
}

/// Per-region activation state.
///
/// `has_triggered` is only meaningful for one-shot observations; once it is `true` it stays
/// `true` for the lifetime of the observation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ActivationState {
    pub is_intersecting: bool,
    pub has_triggered: bool,
}

/// Axis-aligned bounds in a shared coordinate space (e.g. CSS pixels relative to the document).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Bounds {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl Bounds {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> i64 {
        self.x.saturating_add(self.width as i64)
    }

    pub fn bottom(&self) -> i64 {
        self.y.saturating_add(self.height as i64)
    }

    pub fn area(&self) -> u64 {
        self.width as u64 * self.height as u64
    }
}

/// Grows (positive) or shrinks (negative) the root bounds before intersection checks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootMargin {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl RootMargin {
    pub fn all(px: i32) -> Self {
        Self {
            top: px,
            right: px,
            bottom: px,
            left: px,
        }
    }

    /// Margin on the scroll axis only, the usual choice for pre-triggering list sentinels.
    pub fn vertical(px: i32) -> Self {
        Self {
            top: px,
            right: 0,
            bottom: px,
            left: 0,
        }
    }
}

/// Request handed to the `load_more` callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LoadRequest {
    /// Number of items already known; the next page starts here.
    pub offset: usize,
}

/// Why a tail activation did not request more data.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SkipReason {
    /// `has_more` is false.
    NoMore,
    /// The caller reports a load in progress.
    Loading,
    /// A request was issued and the caller has not finished it yet.
    Pending,
    /// The tail sentinel reported a non-intersecting state.
    NotIntersecting,
}

/// Outcome of a tail activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TailActivation {
    Requested(LoadRequest),
    Skipped(SkipReason),
}

impl TailActivation {
    pub fn is_requested(&self) -> bool {
        matches!(self, Self::Requested(_))
    }
}
