//! # deskledger-gmail
//!
//! Read-only access to the Gmail REST API, limited to what a support
//! mailbox report needs:
//!
//! - [`GmailClient::list_labels`] - every label with its display name
//! - [`GmailClient::list_thread_ids`] - thread ids with pagination
//! - [`GmailClient::get_thread`] - thread metadata (labels, dates, headers)
//!
//! Rate-limited requests (HTTP 429) are retried with backoff. Wire types in
//! [`schema`] convert into the `deskledger-core` model, and [`Snapshot`]
//! stores a fetch on disk for offline runs.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod client;
mod error;
pub mod schema;
mod snapshot;

pub use client::{DEFAULT_PAGE_SIZE, GMAIL_API_BASE, GmailClient};
pub use error::{Error, Result};
pub use schema::{WireHeader, WireLabel, WireMessage, WirePayload, WireThread};
pub use snapshot::Snapshot;
