//! # deskledger-core
//!
//! Classification and KPI aggregation for support mailboxes.
//!
//! This crate provides:
//! - Domain models for labels, messages and conversations
//! - **Classification** - department (sector) and status from label names
//! - **Timing** - hours from a customer's first message to the first reply
//! - **KPI aggregation** - counts per sector, sender, month and quarter
//! - **Export** - JSON report and per-thread CSV table
//!
//! Everything except [`export`] is pure and infallible: missing data falls
//! back to sentinel values instead of failing.
//!
//! ## Example
//!
//! ```ignore
//! use deskledger_core::{LabelCatalog, LabelRules, aggregate, build_conversation_record};
//!
//! let rules = LabelRules::default();
//! let records: Vec<_> = conversations
//!     .iter()
//!     .map(|c| build_conversation_record(c, &catalog, &rules))
//!     .collect();
//! let report = aggregate(&records);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod classify;
mod error;
pub mod export;
pub mod kpi;
pub mod model;
pub mod record;
pub mod rules;
pub mod sender;
pub mod timing;

pub use classify::{Status, classify_sector, resolve_status};
pub use error::{Error, Result};
pub use kpi::{KpiReport, aggregate, sender_key};
pub use model::{Conversation, Header, Label, LabelCatalog, Message};
pub use record::{ConversationRecord, build_conversation_record, build_record};
pub use rules::{LabelRules, UNDEFINED_SECTOR, UNKNOWN_SENDER};
pub use sender::extract_sender;
pub use timing::{Timing, analyze_timing};

/// Rounds to two decimal places, judged on the exact binary value.
///
/// `1.115` is stored just below the midpoint and rounds down to `1.11`.
/// True midpoints are multiples of 1/8 and round away from zero.
#[allow(clippy::float_cmp)]
pub(crate) fn round_hundredths(value: f64) -> f64 {
    let midpoint = (value * 8.0).fract() == 0.0 && (value * 4.0).fract() != 0.0;
    if midpoint || !value.is_finite() {
        return (value * 100.0).round() / 100.0;
    }
    format!("{value:.2}").parse().unwrap_or(value)
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::round_hundredths;

    #[test]
    fn test_round_hundredths_uses_stored_value() {
        // 4_014_000 ms is 1.115 h, stored as 1.11499...
        assert_eq!(round_hundredths(4_014_000.0 / 3_600_000.0), 1.11);
        assert_eq!(round_hundredths(1.115), 1.11);
        assert_eq!(round_hundredths(2.675), 2.67);
        assert_eq!(round_hundredths(1.116), 1.12);
        assert_eq!(round_hundredths(2.0 / 3.0), 0.67);
    }

    #[test]
    fn test_round_hundredths_exact_midpoints_round_up() {
        assert_eq!(round_hundredths(0.125), 0.13);
        assert_eq!(round_hundredths(0.375), 0.38);
        assert_eq!(round_hundredths(2.5), 2.5);
        assert_eq!(round_hundredths(0.0), 0.0);
    }
}
