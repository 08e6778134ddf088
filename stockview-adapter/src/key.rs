use alloc::string::String;

#[cfg(not(feature = "std"))]
use alloc::collections::BTreeSet;
#[cfg(feature = "std")]
use std::collections::HashSet;

/// Derived query keys with a fetch in flight.
#[cfg(feature = "std")]
pub(crate) type KeySet = HashSet<String>;
#[cfg(not(feature = "std"))]
pub(crate) type KeySet = BTreeSet<String>;
