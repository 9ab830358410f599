use chrono::{DateTime, NaiveDate, Utc};

use crate::domain::{Expense, ExpenseDraft, Month, SpendingRecord};
use crate::errors::{Result, TrackerError};

/// Validated create/update/delete helpers plus simple spending aggregates.
pub struct ExpenseService;

impl ExpenseService {
    pub fn create(draft: ExpenseDraft, today: NaiveDate, now: DateTime<Utc>) -> Result<Expense> {
        draft.validate(today)?;
        Ok(Expense::from_draft(draft, now))
    }

    /// Replaces the editable fields of expense `id`, keeping its creation time.
    pub fn update(
        expenses: &[Expense],
        id: &str,
        draft: ExpenseDraft,
        today: NaiveDate,
        now: DateTime<Utc>,
    ) -> Result<Vec<Expense>> {
        draft.validate(today)?;
        let position = Self::position(expenses, id)?;
        let mut updated = expenses.to_vec();
        let target = &mut updated[position];
        let created_at = target.created_at;
        let mut replacement = Expense::from_draft(draft, now);
        replacement.id = target.id.clone();
        replacement.created_at = created_at;
        *target = replacement;
        Ok(updated)
    }

    pub fn delete(expenses: &[Expense], id: &str) -> Result<Vec<Expense>> {
        Self::position(expenses, id)?;
        Ok(expenses
            .iter()
            .filter(|expense| expense.id != id)
            .cloned()
            .collect())
    }

    pub fn total<E: SpendingRecord>(expenses: &[E]) -> f64 {
        expenses.iter().map(|expense| expense.amount()).sum()
    }

    pub fn total_for_category<E: SpendingRecord>(expenses: &[E], category_id: &str) -> f64 {
        expenses
            .iter()
            .filter(|expense| expense.category_id() == category_id)
            .map(|expense| expense.amount())
            .sum()
    }

    pub fn expenses_for_month<'a, E: SpendingRecord>(expenses: &'a [E], month: &Month) -> Vec<&'a E> {
        expenses
            .iter()
            .filter(|expense| month.contains(expense.date()))
            .collect()
    }

    fn position(expenses: &[Expense], id: &str) -> Result<usize> {
        expenses
            .iter()
            .position(|expense| expense.id == id)
            .ok_or_else(|| TrackerError::NotFound(format!("expense `{}`", id)))
    }
}
