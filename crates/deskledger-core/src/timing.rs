//! First-response timing.

use chrono::{DateTime, Utc};

use crate::model::Message;
use crate::round_hundredths;
use crate::rules::OUTBOUND_LABEL;

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Opening and first-response times for a conversation.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Timing {
    /// Receive time of the first message.
    pub opened_at: Option<DateTime<Utc>>,
    /// Receive time of the first outbound message.
    pub responded_at: Option<DateTime<Utc>>,
    /// Hours between opening and first response, two decimals.
    pub response_hours: Option<f64>,
    /// The first response predates the opening message.
    pub anomaly: bool,
}

/// Computes opening and first-response times.
///
/// Messages must be oldest first. The first message labelled
/// [`OUTBOUND_LABEL`] counts as the first response, so a thread started by
/// support responds in zero hours. A response dated before the opening
/// message keeps its timestamp but gets no latency and sets
/// [`Timing::anomaly`]. An undated opening or response message leaves the
/// latency unknown.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn analyze_timing(messages: &[Message]) -> Timing {
    let Some(first) = messages.first() else {
        return Timing::default();
    };

    let mut timing = Timing {
        opened_at: first.timestamp(),
        ..Timing::default()
    };

    let Some(response) = messages.iter().find(|m| m.has_label(OUTBOUND_LABEL)) else {
        return timing;
    };

    timing.responded_at = response.timestamp();
    let (Some(opened_ms), Some(responded_ms)) =
        (first.internal_date_millis, response.internal_date_millis)
    else {
        return timing;
    };
    let diff_ms = responded_ms.saturating_sub(opened_ms);
    if diff_ms < 0 {
        timing.anomaly = true;
    } else {
        timing.response_hours = Some(round_hundredths(diff_ms as f64 / MILLIS_PER_HOUR));
    }
    timing
}
