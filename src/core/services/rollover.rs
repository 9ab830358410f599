//! Carry-forward of unspent budget from one month into the next.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{BudgetRecord, Month, SpendingRecord};

/// Amount carried from one month's record into the following month.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RolloverEntry {
    pub category_id: String,
    pub amount: f64,
    pub from_month: Month,
    pub to_month: Month,
}

pub struct RolloverService;

impl RolloverService {
    /// Total spent in `category_id` during `month`.
    pub fn spent_in_month<E: SpendingRecord>(expenses: &[E], category_id: &str, month: &Month) -> f64 {
        expenses
            .iter()
            .filter(|expense| expense.category_id() == category_id && month.contains(expense.date()))
            .map(|expense| expense.amount())
            .sum()
    }

    /// Positive carry-forward amounts into `month`, one per rollover-enabled
    /// category of the previous month. Overspent categories contribute nothing.
    pub fn compute<E: SpendingRecord>(
        records: &[BudgetRecord],
        month: &Month,
        expenses: &[E],
    ) -> Vec<RolloverEntry> {
        let from_month = match month.previous() {
            Some(previous) => previous,
            None => return Vec::new(),
        };
        let mut remaining_by_category: BTreeMap<&str, f64> = BTreeMap::new();

        for record in records
            .iter()
            .filter(|record| record.month == from_month && record.rollover)
        {
            if remaining_by_category.contains_key(record.category_id.as_str()) {
                continue;
            }
            let spent = Self::spent_in_month(expenses, &record.category_id, &from_month);
            let remaining = (record.amount - spent).max(0.0);
            remaining_by_category.insert(record.category_id.as_str(), remaining);
        }

        remaining_by_category
            .into_iter()
            .filter(|(_, remaining)| *remaining > 0.0)
            .map(|(category_id, amount)| RolloverEntry {
                category_id: category_id.to_string(),
                amount,
                from_month,
                to_month: *month,
            })
            .collect()
    }

    /// Adds the computed carry-forward onto `month`'s existing records.
    ///
    /// Returns the new list alongside the entries that were actually applied;
    /// categories with no record in `month` are skipped.
    pub fn apply<E: SpendingRecord>(
        records: Vec<BudgetRecord>,
        month: &Month,
        expenses: &[E],
        now: DateTime<Utc>,
    ) -> (Vec<BudgetRecord>, Vec<RolloverEntry>) {
        let entries = Self::compute(&records, month, expenses);
        if entries.is_empty() {
            return (records, entries);
        }

        let mut applied = Vec::with_capacity(entries.len());
        let mut records = records;
        for entry in entries {
            let target = records
                .iter_mut()
                .find(|record| record.matches(&entry.category_id, month));
            match target {
                Some(record) => {
                    record.amount += entry.amount;
                    record.updated_at = now;
                    debug!(
                        category = %entry.category_id,
                        amount = entry.amount,
                        from = %entry.from_month,
                        to = %entry.to_month,
                        "applied budget rollover"
                    );
                    applied.push(entry);
                }
                None => debug!(
                    category = %entry.category_id,
                    %month,
                    "no target budget for rollover"
                ),
            }
        }
        (records, applied)
    }
}
