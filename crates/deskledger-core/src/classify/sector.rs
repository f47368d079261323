//! Department (sector) resolution.

use crate::model::LabelCatalog;
use crate::rules::{self, LabelRules, UNDEFINED_SECTOR};

/// Resolves the sector name for a conversation's labels.
///
/// Labels are scanned in the given order. Reserved system labels and ids
/// missing from the catalog are skipped. The first label whose name starts
/// with the department prefix wins; the prefix and the whitespace after it
/// are removed from the returned name. A prefix with no whitespace after it
/// still matches, but the name is returned unchanged.
///
/// Returns [`UNDEFINED_SECTOR`] when no label qualifies.
#[must_use]
pub fn classify_sector<S: AsRef<str>>(
    label_ids: &[S],
    catalog: &LabelCatalog,
    label_rules: &LabelRules,
) -> String {
    for id in label_ids {
        let id = id.as_ref();
        if rules::is_ignored(id) {
            continue;
        }
        let Some(label) = catalog.get(id) else {
            continue;
        };
        let prefix = &label_rules.department_prefix;
        if let Some(rest) = rules::strip_prefix_ignore_case(&label.name, prefix) {
            let trimmed = rest.trim_start();
            if trimmed.len() < rest.len() {
                return trimmed.to_string();
            }
            return label.name.clone();
        }
    }
    UNDEFINED_SECTOR.to_string()
}
