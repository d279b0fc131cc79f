//! Tesla provider for chargeboard
//!
//! This crate loads the two raw charging payloads: the daily history from
//! the owner API and the paginated session history from the ownership API.
//! Every fetched payload is written to a local cache so later runs can
//! render offline.

pub mod cache;
pub mod client;
pub mod loader;
pub mod pagination;

pub use cache::{PayloadKind, RawCache};
pub use client::TeslaClient;
pub use loader::{RawPayloads, TeslaLoader};
pub use pagination::{DEFAULT_PAGE_SIZE, SessionPageSource, collect_sessions};
