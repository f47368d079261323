//! Resolution status flags.

use serde::Serialize;

use crate::model::LabelCatalog;
use crate::rules::{LabelRules, eq_ignore_case};

/// Status flags derived from a conversation's labels.
///
/// The flags are independent: a conversation may carry any combination
/// of the three status labels, including none.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Status {
    /// Carries the closed-status label.
    pub resolved: bool,
    /// Carries the open-status label.
    pub open: bool,
    /// Carries the in-progress-status label.
    pub in_progress: bool,
}

/// Resolves status flags by exact, case-insensitive label name match.
#[must_use]
pub fn resolve_status<S: AsRef<str>>(
    label_ids: &[S],
    catalog: &LabelCatalog,
    rules: &LabelRules,
) -> Status {
    let mut status = Status::default();
    for label in label_ids.iter().filter_map(|id| catalog.get(id.as_ref())) {
        if eq_ignore_case(&label.name, &rules.closed_status) {
            status.resolved = true;
        }
        if eq_ignore_case(&label.name, &rules.open_status) {
            status.open = true;
        }
        if eq_ignore_case(&label.name, &rules.in_progress_status) {
            status.in_progress = true;
        }
    }
    status
}
