//! Label-based classification of conversations.
//!
//! - **Sector**: the department a conversation belongs to, taken from the
//!   first label whose name starts with the department prefix.
//! - **Status**: three independent flags for closed, open and in-progress
//!   labels.

mod sector;
mod status;

pub use sector::classify_sector;
pub use status::{Status, resolve_status};
