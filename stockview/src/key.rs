use alloc::string::String;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeMap;
#[cfg(feature = "std")]
use std::collections::HashMap;

/// Storage for cache entries, keyed by the derived query key.
#[cfg(feature = "std")]
pub(crate) type EntryMap<V> = HashMap<String, V>;
#[cfg(not(feature = "std"))]
pub(crate) type EntryMap<V> = BTreeMap<String, V>;

/// Bound for caller-chosen region keys observed by [`crate::ActivationTracker`].
#[cfg(feature = "std")]
pub trait RegionKey: core::hash::Hash + Eq {}
#[cfg(feature = "std")]
impl<K: core::hash::Hash + Eq> RegionKey for K {}

#[cfg(not(feature = "std"))]
pub trait RegionKey: Ord {}
#[cfg(not(feature = "std"))]
impl<K: Ord> RegionKey for K {}
