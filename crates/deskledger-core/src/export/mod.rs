//! Report and table export.
//!
//! - [`write_json`] writes any serializable value (normally the
//!   [`KpiReport`](crate::KpiReport)) as pretty-printed JSON.
//! - [`write_records_csv`] writes one row per conversation with localized
//!   yes/no flags.

mod json;
mod table;

pub use json::write_json;
pub use table::{COLUMNS, NOT_AVAILABLE, write_records, write_records_csv, yes_no};
