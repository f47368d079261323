//! Gmail API wire types.
//!
//! Only the fields deskledger reads are modelled. Every field has a serde
//! default so partial payloads decode instead of failing; conversion into
//! the core model fills the gaps with neutral values.

use deskledger_core::{Conversation, Header, Label, Message};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Entry of `users.labels.list`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireLabel {
    /// Label id.
    pub id: String,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// `system` or `user`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl From<WireLabel> for Label {
    fn from(label: WireLabel) -> Self {
        Self::new(label.id, label.name)
    }
}

/// Response of `users.labels.list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct LabelList {
    #[serde(default)]
    pub labels: Vec<WireLabel>,
}

/// Response of `users.threads.list`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ThreadList {
    #[serde(default)]
    pub threads: Vec<ThreadStub>,
    pub next_page_token: Option<String>,
}

/// Thread reference in a list page.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct ThreadStub {
    pub id: String,
}

/// Header in a message payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireHeader {
    /// Header name.
    #[serde(default)]
    pub name: String,
    /// Header value.
    #[serde(default)]
    pub value: String,
}

/// Message payload; only headers are requested in metadata format.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WirePayload {
    /// Requested headers.
    #[serde(default)]
    pub headers: Vec<WireHeader>,
}

/// Message within a thread.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireMessage {
    /// Message id.
    #[serde(default)]
    pub id: String,
    /// Labels on this message.
    #[serde(default)]
    pub label_ids: Vec<String>,
    /// Receive time in epoch milliseconds, as a decimal string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub internal_date: Option<String>,
    /// Headers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<WirePayload>,
}

impl WireMessage {
    /// Receive time in epoch milliseconds; `None` when missing or malformed.
    #[must_use]
    pub fn internal_date_millis(&self) -> Option<i64> {
        let raw = self.internal_date.as_deref()?;
        match raw.trim().parse() {
            Ok(millis) => Some(millis),
            Err(_) => {
                debug!("Message {}: unparsable internalDate {raw:?}", self.id);
                None
            }
        }
    }

    /// Converts into the core message model.
    #[must_use]
    pub fn into_message(self) -> Message {
        let internal_date_millis = self.internal_date_millis();
        let headers = self
            .payload
            .map(|p| {
                p.headers
                    .into_iter()
                    .map(|h| Header::new(h.name, h.value))
                    .collect()
            })
            .unwrap_or_default();
        Message {
            label_ids: self.label_ids,
            internal_date_millis,
            headers,
        }
    }
}

/// Response of `users.threads.get`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireThread {
    /// Thread id.
    pub id: String,
    /// Messages, oldest first.
    #[serde(default)]
    pub messages: Vec<WireMessage>,
}

impl WireThread {
    /// Converts into the core conversation model, keeping message order.
    #[must_use]
    pub fn into_conversation(self) -> Conversation {
        Conversation::new(
            self.id,
            self.messages
                .into_iter()
                .map(WireMessage::into_message)
                .collect(),
        )
    }
}
