use crate::{LayoutMode, VisibleWindow};

/// A lightweight, serializable snapshot of a list window.
///
/// Capture it when a listing view unmounts and restore it on back-navigation so the user lands
/// on the same slice of results. With `feature = "serde"`, this type implements
/// `Serialize`/`Deserialize`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListSnapshot {
    pub window: VisibleWindow,
    pub layout: LayoutMode,
    pub has_more: bool,
}
