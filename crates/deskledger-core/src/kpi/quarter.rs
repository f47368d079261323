//! Quarterly volume averages.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Utc};

use crate::round_hundredths;

/// Months per quarter, used as the fixed averaging divisor.
const MONTHS_PER_QUARTER: f64 = 3.0;

/// Quarter key (`YYYY-Q1` .. `YYYY-Q4`) for a timestamp.
#[must_use]
pub fn quarter_key(at: &DateTime<Utc>) -> String {
    let quarter = at.month().div_ceil(3);
    format!("{}-Q{quarter}", at.format("%Y"))
}

#[derive(Debug, Default)]
struct QuarterTally {
    total: u64,
    months: BTreeSet<String>,
}

/// Accumulates conversation counts per quarter.
#[derive(Debug, Default)]
pub(crate) struct QuarterAccumulator {
    quarters: BTreeMap<String, QuarterTally>,
}

impl QuarterAccumulator {
    /// Counts one conversation opened at `at`.
    pub(crate) fn add(&mut self, at: &DateTime<Utc>, month: &str) {
        let tally = self.quarters.entry(quarter_key(at)).or_default();
        tally.total += 1;
        tally.months.insert(month.to_string());
    }

    /// Average per month for each quarter, always dividing by three.
    ///
    /// Quarters with fewer active months are not rescaled, so a partially
    /// observed quarter reads lower than its active months would suggest.
    #[allow(clippy::cast_precision_loss)]
    pub(crate) fn averages(&self) -> BTreeMap<String, f64> {
        self.quarters
            .iter()
            .map(|(key, tally)| {
                let avg = round_hundredths(tally.total as f64 / MONTHS_PER_QUARTER);
                (key.clone(), avg)
            })
            .collect()
    }

    /// Distinct months with activity in each quarter.
    pub(crate) fn active_months(&self) -> BTreeMap<String, usize> {
        self.quarters
            .iter()
            .map(|(key, tally)| (key.clone(), tally.months.len()))
            .collect()
    }
}
