//! Adapter utilities for the `stockview` crate.
//!
//! The `stockview` crate is UI-agnostic and keeps its parts independent. This crate wires them
//! into the usual listing flow:
//!
//! - filter change → cache lookup → fetch ticket on a miss
//! - completed fetch → cache write → items appended to the list window
//! - scroll / tail sentinel → next page from cache or a new ticket
//!
//! Fetching itself stays with the caller (any HTTP client, any executor). This crate is
//! intentionally framework-agnostic.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod controller;
mod error;
mod key;
mod ticket;


pub use controller::FeedController;
pub use error::FetchError;
pub use ticket::{FeedStep, FetchTicket, FetchedPage};
