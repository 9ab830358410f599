//! Queries, edits, and month provisioning over budget record lists.
//!
//! Every function here treats the record list as a value: callers pass the
//! current list in and replace their copy with what comes back.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::domain::{
    BudgetRecord, BudgetTemplate, BudgetUpdate, Category, Month, SpendingRecord,
};
use crate::errors::{Result, TrackerError};

use super::rollover::{RolloverEntry, RolloverService};

/// Inputs provisioning needs besides the record list itself.
#[derive(Debug, Clone, Copy)]
pub struct ProvisionContext<'a> {
    pub categories: &'a [Category],
    pub template: &'a BudgetTemplate,
    pub now: DateTime<Utc>,
}

/// Outcome of [`BudgetService::provision_month`].
#[derive(Debug, Clone, PartialEq)]
pub struct ProvisionReport {
    pub records: Vec<BudgetRecord>,
    pub created: usize,
    pub rollovers: Vec<RolloverEntry>,
}

impl ProvisionReport {
    /// True when the month already had records and nothing changed.
    pub fn is_noop(&self) -> bool {
        self.created == 0
    }
}

/// Stateless budgeting utilities that operate over record slices.
pub struct BudgetService;

impl BudgetService {
    /// Returns the record for `(category_id, month)`, if any.
    pub fn find_budget<'a>(
        records: &'a [BudgetRecord],
        category_id: &str,
        month: &Month,
    ) -> Option<&'a BudgetRecord> {
        records
            .iter()
            .find(|record| record.matches(category_id, month))
    }

    pub fn budgets_for_month<'a>(records: &'a [BudgetRecord], month: &Month) -> Vec<&'a BudgetRecord> {
        records
            .iter()
            .filter(|record| record.month == *month)
            .collect()
    }

    /// Sum of all amounts budgeted for `month`; zero when none exist.
    pub fn total_budget_for_month(records: &[BudgetRecord], month: &Month) -> f64 {
        records
            .iter()
            .filter(|record| record.month == *month)
            .map(|record| record.amount)
            .sum()
    }

    /// One template-amount record per known category for `month`.
    pub fn default_records(month: Month, ctx: &ProvisionContext<'_>) -> Vec<BudgetRecord> {
        ctx.categories
            .iter()
            .map(|category| {
                BudgetRecord::new(
                    category.id.clone(),
                    month,
                    ctx.template.amount_for(&category.id),
                    ctx.now,
                )
            })
            .collect()
    }

    /// Ensures `month` has a full set of records.
    ///
    /// When any record for `month` already exists the list is returned untouched,
    /// so repeated calls never duplicate records or re-apply rollover.
    pub fn provision_month<E: SpendingRecord>(
        records: Vec<BudgetRecord>,
        month: Month,
        rollover_enabled: bool,
        expenses: &[E],
        ctx: &ProvisionContext<'_>,
    ) -> ProvisionReport {
        if records.iter().any(|record| record.month == month) {
            debug!(%month, "budgets already provisioned");
            return ProvisionReport {
                records,
                created: 0,
                rollovers: Vec::new(),
            };
        }

        let fresh = Self::default_records(month, ctx);
        let created = fresh.len();
        let mut updated = records;
        updated.extend(fresh);

        let (records, rollovers) = if rollover_enabled {
            RolloverService::apply(updated, &month, expenses, ctx.now)
        } else {
            (updated, Vec::new())
        };

        info!(
            %month,
            created,
            rollovers = rollovers.len(),
            "provisioned monthly budgets"
        );
        ProvisionReport {
            records,
            created,
            rollovers,
        }
    }

    /// Applies `update` to the record with `id`, returning the new list.
    pub fn update_budget(
        records: &[BudgetRecord],
        id: &str,
        update: BudgetUpdate,
        now: DateTime<Utc>,
    ) -> Result<Vec<BudgetRecord>> {
        update.validate()?;
        if !records.iter().any(|record| record.id == id) {
            return Err(TrackerError::NotFound(format!("budget `{}`", id)));
        }
        let updated = records
            .iter()
            .map(|record| {
                if record.id != id {
                    return record.clone();
                }
                let mut edited = record.clone();
                if let Some(amount) = update.amount {
                    edited.amount = amount;
                }
                if let Some(rollover) = update.rollover {
                    edited.rollover = rollover;
                }
                edited.updated_at = now;
                edited
            })
            .collect();
        Ok(updated)
    }

    pub fn validate_budget(record: &BudgetRecord) -> Result<()> {
        record.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{default_categories, Expense};

    fn month(value: &str) -> Month {
        value.parse().unwrap()
    }

    fn context<'a>(categories: &'a [Category], template: &'a BudgetTemplate) -> ProvisionContext<'a> {
        ProvisionContext {
            categories,
            template,
            now: Utc::now(),
        }
    }

    #[test]
    fn find_budget_reports_absence() {
        let records = vec![BudgetRecord::new("1", month("2024-01"), 10.0, Utc::now())];
        assert!(BudgetService::find_budget(&records, "1", &month("2024-01")).is_some());
        assert!(BudgetService::find_budget(&records, "1", &month("2024-02")).is_none());
        assert!(BudgetService::find_budget(&records, "2", &month("2024-01")).is_none());
        assert!(BudgetService::find_budget(&[], "2", &month("2024-01")).is_none());
    }

    #[test]
    fn totals_only_count_requested_month() {
        let now = Utc::now();
        let records = vec![
            BudgetRecord::new("1", month("2024-01"), 10.0, now),
            BudgetRecord::new("2", month("2024-01"), 15.5, now),
            BudgetRecord::new("1", month("2024-02"), 99.0, now),
        ];
        assert_eq!(BudgetService::total_budget_for_month(&records, &month("2024-01")), 25.5);
        assert_eq!(BudgetService::budgets_for_month(&records, &month("2024-02")).len(), 1);
        assert_eq!(BudgetService::total_budget_for_month(&records, &month("2030-01")), 0.0);
    }

    #[test]
    fn provisioning_uses_template_amounts() {
        let categories = default_categories();
        let template = BudgetTemplate::from_amounts([("1", 500.0)]);
        let report = BudgetService::provision_month(
            Vec::new(),
            month("2024-03"),
            false,
            &[] as &[Expense],
            &context(&categories, &template),
        );
        assert_eq!(report.created, categories.len());
        let food = BudgetService::find_budget(&report.records, "1", &month("2024-03")).unwrap();
        assert_eq!(food.amount, 500.0);
        let other = BudgetService::find_budget(&report.records, "8", &month("2024-03")).unwrap();
        assert_eq!(other.amount, 0.0);
    }

    #[test]
    fn provisioning_existing_month_is_noop() {
        let categories = default_categories();
        let template = BudgetTemplate::zero();
        let ctx = context(&categories, &template);
        let existing = vec![BudgetRecord::new("1", month("2024-03"), 42.0, Utc::now())];
        let report = BudgetService::provision_month(
            existing.clone(),
            month("2024-03"),
            true,
            &[] as &[Expense],
            &ctx,
        );
        assert!(report.is_noop());
        assert_eq!(report.records, existing);
    }

    #[test]
    fn update_budget_validates_and_bumps_timestamp() {
        let created = Utc::now() - chrono::Duration::days(1);
        let records = vec![BudgetRecord::new("1", month("2024-01"), 10.0, created)];
        let now = Utc::now();

        let updated =
            BudgetService::update_budget(&records, "1-2024-01", BudgetUpdate::amount(75.0), now)
                .unwrap();
        assert_eq!(updated[0].amount, 75.0);
        assert_eq!(updated[0].updated_at, now);
        assert_eq!(updated[0].created_at, created);

        let err = BudgetService::update_budget(&records, "1-2024-01", BudgetUpdate::amount(-5.0), now)
            .unwrap_err();
        assert!(matches!(err, TrackerError::Validation(_)));

        let err = BudgetService::update_budget(&records, "9-2024-01", BudgetUpdate::rollover(true), now)
            .unwrap_err();
        assert!(matches!(err, TrackerError::NotFound(_)));
    }
}
