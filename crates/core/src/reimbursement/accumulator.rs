use rust_decimal::Decimal;
use std::collections::HashMap;

use crate::transactions::GroupingKey;

/// Running cumulative value per grouping key.
///
/// Owned by a single resolution run and dropped with it. Totals only grow:
/// the engine rejects negative values before they reach the accumulator.
#[derive(Debug, Default, Clone)]
pub struct CumulativeAccumulator {
    totals: HashMap<GroupingKey, Decimal>,
}

impl CumulativeAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `value` to the total of `key` and returns the updated total, or
    /// `None` when the total would overflow. The total is left untouched then.
    pub fn add(&mut self, key: &GroupingKey, value: Decimal) -> Option<Decimal> {
        debug_assert!(value >= Decimal::ZERO, "cumulative totals never decrease");
        let total = self.totals.entry(key.clone()).or_insert(Decimal::ZERO);
        *total = total.checked_add(value)?;
        Some(*total)
    }

    /// Current total of `key`, zero when nothing was added yet.
    pub fn get(&self, key: &GroupingKey) -> Decimal {
        self.totals.get(key).copied().unwrap_or(Decimal::ZERO)
    }

    pub fn len(&self) -> usize {
        self.totals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.totals.is_empty()
    }

    pub fn into_totals(self) -> HashMap<GroupingKey, Decimal> {
        self.totals
    }
}
