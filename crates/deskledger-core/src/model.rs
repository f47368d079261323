//! Domain models for support conversations.
//!
//! These types are the provider-neutral shape the classification and
//! aggregation code works on. Wire formats are decoded into them at the
//! API boundary.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};

/// A label from the account's label catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    /// Provider label identifier (e.g. `INBOX`, `Label_42`).
    pub id: String,
    /// Display name, free text.
    pub name: String,
}

impl Label {
    /// Creates a new label.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// The full set of labels for an account, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct LabelCatalog {
    labels: Vec<Label>,
    by_id: HashMap<String, usize>,
}

impl LabelCatalog {
    /// Builds a catalog from a list of labels.
    ///
    /// If an id appears more than once, the first entry wins.
    #[must_use]
    pub fn new(labels: Vec<Label>) -> Self {
        let mut by_id = HashMap::with_capacity(labels.len());
        for (idx, label) in labels.iter().enumerate() {
            by_id.entry(label.id.clone()).or_insert(idx);
        }
        Self { labels, by_id }
    }

    /// Looks up a label by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Label> {
        self.by_id.get(id).map(|&idx| &self.labels[idx])
    }

    /// Number of labels in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Returns true if the catalog has no labels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Iterates labels in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }
}

impl FromIterator<Label> for LabelCatalog {
    fn from_iter<I: IntoIterator<Item = Label>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// A single message header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    /// Header name as sent by the provider.
    pub name: String,
    /// Raw header value.
    pub value: String,
}

impl Header {
    /// Creates a new header.
    #[must_use]
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A message within a conversation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    /// Labels attached to this message.
    pub label_ids: Vec<String>,
    /// Provider receive time, milliseconds since the Unix epoch; `None`
    /// when the provider gave no usable date.
    pub internal_date_millis: Option<i64>,
    /// Headers in provider order.
    pub headers: Vec<Header>,
}

impl Message {
    /// Returns true if the message carries the given label.
    #[must_use]
    pub fn has_label(&self, label_id: &str) -> bool {
        self.label_ids.iter().any(|id| id == label_id)
    }

    /// Returns the value of the first header matching `name`, ignoring case.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|h| h.name.eq_ignore_ascii_case(name))
            .map(|h| h.value.as_str())
    }

    /// Receive time as a UTC timestamp, if known and representable.
    #[must_use]
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.internal_date_millis
            .and_then(|millis| Utc.timestamp_millis_opt(millis).single())
    }
}

/// A conversation (thread) with its messages, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Conversation {
    /// Provider thread id.
    pub id: String,
    /// Messages in chronological order.
    pub messages: Vec<Message>,
}

impl Conversation {
    /// Creates a conversation.
    #[must_use]
    pub fn new(id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self {
            id: id.into(),
            messages,
        }
    }

    /// Distinct label ids across all messages, in order of first appearance.
    #[must_use]
    pub fn label_ids(&self) -> Vec<String> {
        let mut seen = Vec::new();
        for id in self.messages.iter().flat_map(|m| m.label_ids.iter()) {
            if !seen.contains(id) {
                seen.push(id.clone());
            }
        }
        seen
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn message(labels: &[&str], millis: i64) -> Message {
        Message {
            label_ids: labels.iter().map(ToString::to_string).collect(),
            internal_date_millis: Some(millis),
            headers: Vec::new(),
        }
    }

    #[test]
    fn test_catalog_lookup() {
        let catalog = LabelCatalog::new(vec![
            Label::new("L1", "Setor Financeiro"),
            Label::new("L2", "Chamados Fechados"),
        ]);
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.get("L2").unwrap().name, "Chamados Fechados");
        assert!(catalog.get("missing").is_none());
    }

    #[test]
    fn test_catalog_duplicate_id_keeps_first() {
        let catalog: LabelCatalog = [Label::new("L1", "first"), Label::new("L1", "second")]
            .into_iter()
            .collect();
        assert_eq!(catalog.get("L1").unwrap().name, "first");
    }

    #[test]
    fn test_header_lookup_ignores_case() {
        let msg = Message {
            headers: vec![
                Header::new("Subject", "Printer broken"),
                Header::new("FROM", "Jane <jane@x.com>"),
            ],
            ..Message::default()
        };
        assert_eq!(msg.header("from"), Some("Jane <jane@x.com>"));
        assert_eq!(msg.header("To"), None);
    }

    #[test]
    fn test_conversation_label_union_preserves_first_appearance() {
        let conv = Conversation::new(
            "t1",
            vec![
                message(&["INBOX", "L1"], 0),
                message(&["SENT", "L1", "L2"], 10),
            ],
        );
        assert_eq!(conv.label_ids(), vec!["INBOX", "L1", "SENT", "L2"]);
    }

    #[test]
    fn test_message_timestamp() {
        let msg = message(&[], 3_600_000);
        assert_eq!(
            msg.timestamp().unwrap().to_rfc3339(),
            "1970-01-01T01:00:00+00:00"
        );
    }

    #[test]
    fn test_undated_message_has_no_timestamp() {
        assert!(Message::default().timestamp().is_none());
    }
}
