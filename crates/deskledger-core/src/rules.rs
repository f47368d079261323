//! Label naming conventions used to classify conversations.

use serde::{Deserialize, Serialize};

/// System labels that never identify a department.
pub const IGNORED_LABELS: &[&str] = &[
    "INBOX",
    "SENT",
    "IMPORTANT",
    "CATEGORY_PERSONAL",
    "UNREAD",
    "STARRED",
    "CHAT",
    "TRASH",
    "DRAFT",
    "SPAM",
    "CATEGORY_FORUMS",
    "CATEGORY_UPDATES",
    "CATEGORY_PROMOTIONS",
    "CATEGORY_SOCIAL",
];

/// Label the provider attaches to messages sent from the support mailbox.
pub const OUTBOUND_LABEL: &str = "SENT";

/// Sector assigned when no department label is present.
pub const UNDEFINED_SECTOR: &str = "Undefined";

/// Sender assigned when the first message has no `From` header.
pub const UNKNOWN_SENDER: &str = "Unknown";

/// Returns true if `label_id` is a reserved system label.
#[must_use]
pub fn is_ignored(label_id: &str) -> bool {
    IGNORED_LABELS.contains(&label_id)
}

/// Keyword configuration for sector and status labels.
///
/// Built once at startup and shared read-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LabelRules {
    /// Prefix that marks a department label (matched ignoring case).
    pub department_prefix: String,
    /// Label name marking a closed conversation.
    pub closed_status: String,
    /// Label name marking an open conversation.
    pub open_status: String,
    /// Label name marking a conversation being worked on.
    pub in_progress_status: String,
}

impl Default for LabelRules {
    fn default() -> Self {
        Self {
            department_prefix: "Setor".to_string(),
            closed_status: "Chamados Fechados".to_string(),
            open_status: "Chamados em Aberto".to_string(),
            in_progress_status: "Chamados em Andamento".to_string(),
        }
    }
}

/// Strips `prefix` from the start of `text`, comparing case-insensitively.
pub(crate) fn strip_prefix_ignore_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let mut chars = text.char_indices();
    for expected in prefix.chars() {
        let (_, actual) = chars.next()?;
        if !actual.to_lowercase().eq(expected.to_lowercase()) {
            return None;
        }
    }
    let end = chars.next().map_or(text.len(), |(idx, _)| idx);
    Some(&text[end..])
}

/// Compares two label names ignoring case.
pub(crate) fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.chars()
        .flat_map(char::to_lowercase)
        .eq(b.chars().flat_map(char::to_lowercase))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ignored_labels() {
        assert!(is_ignored("INBOX"));
        assert!(is_ignored("CATEGORY_UPDATES"));
        assert!(!is_ignored("Label_1"));
        assert!(!is_ignored("inbox"));
    }

    #[test]
    fn test_strip_prefix_ignore_case() {
        assert_eq!(
            strip_prefix_ignore_case("SETOR Financeiro", "Setor"),
            Some(" Financeiro")
        );
        assert_eq!(strip_prefix_ignore_case("Setor", "setor"), Some(""));
        assert_eq!(strip_prefix_ignore_case("Set", "Setor"), None);
        assert_eq!(strip_prefix_ignore_case("Vendas", "Setor"), None);
    }

    #[test]
    fn test_eq_ignore_case_unicode() {
        assert!(eq_ignore_case("CHAMADOS EM ANDAMENTO", "Chamados em Andamento"));
        assert!(eq_ignore_case("Solução", "SOLUÇÃO"));
        assert!(!eq_ignore_case("Chamados", "Chamados Fechados"));
    }

    #[test]
    fn test_rules_partial_deserialize() {
        let rules: LabelRules =
            serde_json::from_str(r#"{"department_prefix": "Dept"}"#).unwrap_or_default();
        assert_eq!(rules.department_prefix, "Dept");
        assert_eq!(rules.closed_status, "Chamados Fechados");
    }
}
