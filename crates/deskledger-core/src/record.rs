//! Per-conversation records.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Serialize, Serializer};
use tracing::{debug, warn};

use crate::classify::{classify_sector, resolve_status};
use crate::model::{Conversation, LabelCatalog, Message};
use crate::rules::LabelRules;
use crate::sender::extract_sender;
use crate::timing::analyze_timing;

/// Classified view of one support conversation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRecord {
    /// Provider thread id.
    pub id: String,
    /// Raw `From` header of the first message.
    pub sender: String,
    /// Department name.
    pub sector: String,
    /// Closed-status label present.
    pub resolved: bool,
    /// Open-status label present.
    pub open: bool,
    /// In-progress-status label present.
    pub in_progress: bool,
    /// Receive time of the first message.
    #[serde(serialize_with = "serialize_timestamp")]
    pub opened_at: Option<DateTime<Utc>>,
    /// Receive time of the first support reply.
    #[serde(serialize_with = "serialize_timestamp")]
    pub responded_at: Option<DateTime<Utc>>,
    /// Hours until the first support reply.
    pub response_hours: Option<f64>,
    /// The first reply is dated before the opening message.
    pub timing_anomaly: bool,
}

impl ConversationRecord {
    /// Opening month as `YYYY-MM`.
    #[must_use]
    pub fn opened_month(&self) -> Option<String> {
        self.opened_at.map(|at| at.format("%Y-%m").to_string())
    }
}

/// Formats a timestamp as ISO-8601 UTC with millisecond precision.
#[must_use]
pub fn format_timestamp(at: &DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[allow(clippy::ref_option)] // Required by serde serialize_with signature
fn serialize_timestamp<S>(at: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match at {
        Some(at) => serializer.serialize_str(&format_timestamp(at)),
        None => serializer.serialize_none(),
    }
}

/// Builds the record for one conversation.
///
/// `label_ids` are the labels considered for sector and status;
/// `messages` must be oldest first. Never fails: missing data degrades to
/// sentinel values.
#[must_use]
pub fn build_record<S: AsRef<str>>(
    id: &str,
    label_ids: &[S],
    catalog: &LabelCatalog,
    messages: &[Message],
    rules: &LabelRules,
) -> ConversationRecord {
    let sector = classify_sector(label_ids, catalog, rules);
    let status = resolve_status(label_ids, catalog, rules);
    let sender = extract_sender(messages);
    let timing = analyze_timing(messages);

    if timing.anomaly {
        warn!("Thread {id}: first reply predates the opening message, response time dropped");
    }
    debug!("Thread {id}: sector={sector} status={status:?}");

    ConversationRecord {
        id: id.to_string(),
        sender,
        sector,
        resolved: status.resolved,
        open: status.open,
        in_progress: status.in_progress,
        opened_at: timing.opened_at,
        responded_at: timing.responded_at,
        response_hours: timing.response_hours,
        timing_anomaly: timing.anomaly,
    }
}

/// Builds the record for a conversation using the labels of all its messages.
#[must_use]
pub fn build_conversation_record(
    conversation: &Conversation,
    catalog: &LabelCatalog,
    rules: &LabelRules,
) -> ConversationRecord {
    let label_ids = conversation.label_ids();
    build_record(
        &conversation.id,
        &label_ids,
        catalog,
        &conversation.messages,
        rules,
    )
}
