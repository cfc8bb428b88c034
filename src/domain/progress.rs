//! Progress accounting shared by every in-flight deletion
//!
//! One mutex guards the whole table.

use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use super::deletion::DeletionCategory;

/// `(completed, expected)` pair for one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Tally {
    pub completed: usize,
    pub expected: usize,
}

impl Tally {
    /// Every expected item was settled, and nothing more
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.completed == self.expected
    }
}

/// Consistent view taken right after one completion was recorded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub category: DeletionCategory,
    pub category_tally: Tally,
    pub total: Tally,
}

#[derive(Debug, Default)]
struct CounterTable {
    per_category: BTreeMap<DeletionCategory, Tally>,
    total: Tally,
}

#[derive(Debug, Default)]
pub struct ProgressCounters {
    table: Mutex<CounterTable>,
}

impl ProgressCounters {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, CounterTable> {
        // A panicking holder cannot leave the table half-updated: every
        // mutation below is a plain field write.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Set the denominator for a category; the total is the sum over categories.
    pub fn set_expected(&self, category: DeletionCategory, expected: usize) {
        let mut table = self.lock();
        table.per_category.entry(category).or_default().expected = expected;
        table.total.expected = table.per_category.values().map(|t| t.expected).sum();
    }

    /// Count one finished attempt against its category and the total.
    pub fn record_completion(&self, category: DeletionCategory) -> ProgressSnapshot {
        let mut table = self.lock();
        let tally = table.per_category.entry(category).or_default();
        tally.completed += 1;
        let category_tally = *tally;
        table.total.completed += 1;

        ProgressSnapshot {
            category,
            category_tally,
            total: table.total,
        }
    }

    #[must_use]
    pub fn tally(&self, category: DeletionCategory) -> Tally {
        self.lock().per_category.get(&category).copied().unwrap_or_default()
    }

    #[must_use]
    pub fn total(&self) -> Tally {
        self.lock().total
    }

    /// Every category that has been touched, plus the total
    #[must_use]
    pub fn snapshot_all(&self) -> (Vec<(DeletionCategory, Tally)>, Tally) {
        let table = self.lock();
        let categories = table
            .per_category
            .iter()
            .map(|(category, tally)| (*category, *tally))
            .collect();
        (categories, table.total)
    }
}
