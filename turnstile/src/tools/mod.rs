//! Built-in tools for the demo agent personas.
//!
//! Each tool here shows a different enablement pattern: [`CheckBalance`]
//! gates on verified credentials held by a [`RecordStore`](crate::context::RecordStore),
//! [`CheckAvailability`] gates on a membership id carried directly in the
//! session context, and [`SearchBook`] / [`LibraryTimings`] are open to
//! everyone.

pub mod balance;
pub mod library;

pub use balance::CheckBalance;
pub use library::{BookCatalog, CheckAvailability, LibraryTimings, SearchBook};
