//! Originating sender extraction.

use crate::model::Message;
use crate::rules::UNKNOWN_SENDER;

/// Returns the raw `From` header of the first message.
///
/// Falls back to [`UNKNOWN_SENDER`] for an empty thread or a missing header.
/// The value is returned as-is; address normalization happens during
/// aggregation.
#[must_use]
pub fn extract_sender(messages: &[Message]) -> String {
    messages
        .first()
        .and_then(|first| first.header("From"))
        .map_or_else(|| UNKNOWN_SENDER.to_string(), ToString::to_string)
}
