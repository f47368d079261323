//! KPI aggregation over conversation records.
//!
//! [`aggregate`] folds the full record list into a [`KpiReport`] in a single
//! pass. It is a pure function: the same input always serializes to the same
//! report, since every grouping is a sorted map.

mod quarter;
mod sender_key;

pub use quarter::quarter_key;
pub use sender_key::sender_key;

use std::collections::BTreeMap;

use serde::Serialize;

use crate::record::ConversationRecord;
use crate::round_hundredths;
use quarter::QuarterAccumulator;

/// Count per grouping key.
pub type Counts = BTreeMap<String, u64>;

/// Aggregated support metrics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct KpiReport {
    /// Number of conversations.
    pub total_conversations: usize,
    /// Conversations per sector.
    pub by_sector: Counts,
    /// Conversations per normalized sender address.
    pub by_sender: Counts,
    /// Conversations per opening month (`YYYY-MM`).
    pub by_month: Counts,
    /// Average conversations per month for each quarter (`YYYY-Qn`).
    pub quarterly_average: BTreeMap<String, f64>,
    /// Months with at least one conversation, per quarter.
    pub quarter_active_months: BTreeMap<String, usize>,
    /// Resolved conversations per opening month.
    pub resolved_by_month: Counts,
    /// Open conversations per opening month.
    pub open_by_month: Counts,
    /// In-progress conversations per opening month.
    pub in_progress_by_month: Counts,
    /// Mean hours to first response over answered conversations.
    pub average_response_hours: f64,
    /// Conversations whose first reply predates the opening message.
    pub timing_anomalies: usize,
}

fn bump(counts: &mut Counts, key: &str) {
    *counts.entry(key.to_string()).or_insert(0) += 1;
}

/// Folds conversation records into a KPI report.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn aggregate(records: &[ConversationRecord]) -> KpiReport {
    let mut report = KpiReport {
        total_conversations: records.len(),
        ..KpiReport::default()
    };
    let mut quarters = QuarterAccumulator::default();
    let mut response_sum = 0.0_f64;
    let mut responded = 0_usize;

    for record in records {
        bump(&mut report.by_sector, &record.sector);

        if !record.sender.is_empty() {
            bump(&mut report.by_sender, sender_key(&record.sender));
        }

        if let (Some(opened_at), Some(month)) = (record.opened_at, record.opened_month()) {
            bump(&mut report.by_month, &month);
            if record.resolved {
                bump(&mut report.resolved_by_month, &month);
            }
            if record.open {
                bump(&mut report.open_by_month, &month);
            }
            if record.in_progress {
                bump(&mut report.in_progress_by_month, &month);
            }
            quarters.add(&opened_at, &month);
        }

        if let Some(hours) = record.response_hours {
            response_sum += hours;
            responded += 1;
        }
        if record.timing_anomaly {
            report.timing_anomalies += 1;
        }
    }

    report.quarterly_average = quarters.averages();
    report.quarter_active_months = quarters.active_months();
    if responded > 0 {
        report.average_response_hours = round_hundredths(response_sum / responded as f64);
    }
    report
}
