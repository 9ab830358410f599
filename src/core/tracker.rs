//! The single owner of tracker state: configuration, budget records, and expenses.
//!
//! Every mutation replaces whole lists and then persists them. Persistence
//! failures are logged and remembered per key but never undo the in-memory
//! change. A key whose stored payload could not be read is never overwritten.

use std::collections::{BTreeMap, BTreeSet};
use std::mem;

use tracing::{info, warn};

use crate::config::{ConfigManager, TrackerConfig};
use crate::core::services::{
    BudgetAlert, BudgetService, CategorySpending, ExpenseService, MonthlyBudgetSummary,
    ProvisionContext, RolloverEntry, SummaryService,
};
use crate::core::time::Clock;
use crate::domain::{
    default_categories, record_id, BudgetRecord, BudgetUpdate, Category, Expense, ExpenseDraft,
    Month,
};
use crate::errors::{Result, TrackerError};
use crate::storage::{
    load_budgets, load_expenses, save_budgets, save_expenses, BudgetSource, KeyValueStore,
    StorageKeys,
};

/// What happened while loading persisted state.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadMetadata {
    pub budget_source: BudgetSource,
    pub warnings: Vec<String>,
}

/// Result of switching to a month: how many records were created and what rolled in.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthActivation {
    pub month: Month,
    pub created: usize,
    pub rollovers: Vec<RolloverEntry>,
}

impl MonthActivation {
    fn unchanged(month: Month) -> Self {
        Self {
            month,
            created: 0,
            rollovers: Vec::new(),
        }
    }
}

pub struct ExpenseTracker {
    store: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    config: TrackerConfig,
    categories: Vec<Category>,
    budgets: Vec<BudgetRecord>,
    expenses: Vec<Expense>,
    selected_month: Month,
    metadata: LoadMetadata,
    persist_errors: BTreeMap<&'static str, TrackerError>,
    unreadable: BTreeSet<&'static str>,
}

impl ExpenseTracker {
    /// Loads everything from `store` and provisions the current month.
    pub fn open(store: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        let selected_month = Month::current(clock.as_ref());
        let mut tracker = Self {
            store,
            clock,
            config: TrackerConfig::default(),
            categories: default_categories(),
            budgets: Vec::new(),
            expenses: Vec::new(),
            selected_month,
            metadata: LoadMetadata {
                budget_source: BudgetSource::Defaults,
                warnings: Vec::new(),
            },
            persist_errors: BTreeMap::new(),
            unreadable: BTreeSet::new(),
        };
        tracker.bootstrap();
        tracker
    }

    fn bootstrap(&mut self) {
        self.unreadable.clear();
        self.config = ConfigManager::load(self.store.as_ref());
        let report = load_budgets(
            self.store.as_ref(),
            self.clock.as_ref(),
            &self.categories,
            self.config.template(),
        );
        let mut warnings = report.warnings;
        self.budgets = report.records;
        if report.source == BudgetSource::Unavailable {
            self.unreadable.insert(StorageKeys::BUDGETS_V2);
        }
        self.expenses = match load_expenses(self.store.as_ref(), &mut warnings) {
            Ok(expenses) => expenses,
            Err(err) => {
                warn!(error = %err, "reading expenses failed; not persisting them this session");
                warnings.push(format!("reading expenses failed: {}", err));
                self.unreadable.insert(StorageKeys::EXPENSES);
                Vec::new()
            }
        };
        self.selected_month = Month::current(self.clock.as_ref());

        let activation = self.provision(self.selected_month);
        info!(
            source = ?report.source,
            budgets = self.budgets.len(),
            expenses = self.expenses.len(),
            created = activation.created,
            warnings = warnings.len(),
            "tracker opened"
        );
        self.metadata = LoadMetadata {
            budget_source: report.source,
            warnings,
        };
        self.persist_budgets();
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    pub fn budgets(&self) -> &[BudgetRecord] {
        &self.budgets
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn selected_month(&self) -> Month {
        self.selected_month
    }

    pub fn load_metadata(&self) -> &LoadMetadata {
        &self.metadata
    }

    /// The last failure persisting `key`, cleared by the next successful write of that key.
    pub fn persist_error(&self, key: &str) -> Option<&TrackerError> {
        self.persist_errors.get(key)
    }

    pub fn persist_errors(&self) -> &BTreeMap<&'static str, TrackerError> {
        &self.persist_errors
    }

    /// Replaces the configuration. Changes apply to months provisioned from now on.
    pub fn update_config(&mut self, config: TrackerConfig) -> Result<()> {
        config.validate()?;
        let result = ConfigManager::save(self.store.as_ref(), &config);
        self.config = config;
        self.record_persist(StorageKeys::SETTINGS, result);
        Ok(())
    }

    /// Switches the selected month, provisioning it the first time it is visited.
    pub fn select_month(&mut self, month: Month) -> MonthActivation {
        if month == self.selected_month {
            return MonthActivation::unchanged(month);
        }
        self.selected_month = month;
        let activation = self.provision(month);
        if activation.created > 0 {
            self.persist_budgets();
        }
        activation
    }

    /// Fails without changing the selection when already at 0000-01.
    pub fn select_previous_month(&mut self) -> Result<MonthActivation> {
        let month = self.selected_month.previous().ok_or_else(|| {
            TrackerError::validation(format!("no month before {}", self.selected_month))
        })?;
        Ok(self.select_month(month))
    }

    /// Fails without changing the selection when already at 9999-12.
    pub fn select_next_month(&mut self) -> Result<MonthActivation> {
        let month = self.selected_month.next().ok_or_else(|| {
            TrackerError::validation(format!("no month after {}", self.selected_month))
        })?;
        Ok(self.select_month(month))
    }

    pub fn select_current_month(&mut self) -> MonthActivation {
        self.select_month(Month::current(self.clock.as_ref()))
    }

    fn provision(&mut self, month: Month) -> MonthActivation {
        let ctx = ProvisionContext {
            categories: &self.categories,
            template: &self.config.budget_template,
            now: self.clock.now(),
        };
        let report = BudgetService::provision_month(
            mem::take(&mut self.budgets),
            month,
            self.config.rollover_enabled,
            &self.expenses,
            &ctx,
        );
        self.budgets = report.records;
        MonthActivation {
            month,
            created: report.created,
            rollovers: report.rollovers,
        }
    }

    pub fn add_expense(&mut self, draft: ExpenseDraft) -> Result<Expense> {
        let expense = ExpenseService::create(draft, self.clock.today(), self.clock.now())?;
        self.expenses.push(expense.clone());
        self.persist_expenses();
        Ok(expense)
    }

    pub fn update_expense(&mut self, id: &str, draft: ExpenseDraft) -> Result<&Expense> {
        let updated = ExpenseService::update(
            &self.expenses,
            id,
            draft,
            self.clock.today(),
            self.clock.now(),
        )?;
        self.expenses = updated;
        self.persist_expenses();
        self.expenses
            .iter()
            .find(|expense| expense.id == id)
            .ok_or_else(|| TrackerError::NotFound(format!("expense `{}`", id)))
    }

    pub fn delete_expense(&mut self, id: &str) -> Result<()> {
        self.expenses = ExpenseService::delete(&self.expenses, id)?;
        self.persist_expenses();
        Ok(())
    }

    /// The selected month's record for `category_id`.
    pub fn budget_for(&self, category_id: &str) -> Option<&BudgetRecord> {
        BudgetService::find_budget(&self.budgets, category_id, &self.selected_month)
    }

    pub fn set_budget_amount(&mut self, category_id: &str, amount: f64) -> Result<()> {
        self.update_selected(category_id, BudgetUpdate::amount(amount))
    }

    pub fn set_rollover(&mut self, category_id: &str, rollover: bool) -> Result<()> {
        self.update_selected(category_id, BudgetUpdate::rollover(rollover))
    }

    fn update_selected(&mut self, category_id: &str, update: BudgetUpdate) -> Result<()> {
        let id = record_id(category_id, &self.selected_month);
        self.budgets = BudgetService::update_budget(&self.budgets, &id, update, self.clock.now())?;
        self.persist_budgets();
        Ok(())
    }

    pub fn summary(&self) -> MonthlyBudgetSummary {
        SummaryService::month_summary(
            &self.budgets,
            &self.expenses,
            &self.categories,
            &self.selected_month,
        )
    }

    pub fn alerts(&self) -> Vec<BudgetAlert> {
        SummaryService::alerts(
            &self.budgets,
            &self.expenses,
            &self.categories,
            &self.selected_month,
            &self.config.alert_policy(),
        )
    }

    /// Summaries for the configured number of months ending at the selected one.
    pub fn history(&self) -> Vec<MonthlyBudgetSummary> {
        SummaryService::history(
            &self.budgets,
            &self.expenses,
            &self.categories,
            &self.selected_month,
            self.config.history_months,
        )
    }

    /// Spending breakdown for the selected month.
    pub fn category_breakdown(&self) -> Vec<CategorySpending> {
        let month_expenses = ExpenseService::expenses_for_month(&self.expenses, &self.selected_month);
        SummaryService::category_breakdown(&month_expenses, &self.categories)
    }

    /// Clears every persisted key and starts over from defaults.
    pub fn reset(&mut self) {
        self.persist_errors.clear();
        for key in StorageKeys::ALL {
            if let Err(err) = self.store.remove(key) {
                warn!(key, error = %err, "clearing key failed");
                self.persist_errors.insert(key, err);
            }
        }
        self.budgets.clear();
        self.expenses.clear();
        self.bootstrap();
        info!("tracker reset to defaults");
    }

    fn persist_budgets(&mut self) {
        let result = self
            .guard_unreadable(StorageKeys::BUDGETS_V2)
            .and_then(|()| save_budgets(self.store.as_ref(), &self.budgets));
        self.record_persist(StorageKeys::BUDGETS_V2, result);
    }

    fn persist_expenses(&mut self) {
        let result = self
            .guard_unreadable(StorageKeys::EXPENSES)
            .and_then(|()| save_expenses(self.store.as_ref(), &self.expenses));
        self.record_persist(StorageKeys::EXPENSES, result);
    }

    fn guard_unreadable(&self, key: &'static str) -> Result<()> {
        if self.unreadable.contains(key) {
            return Err(TrackerError::Storage(format!(
                "`{}` could not be read at load; refusing to overwrite it",
                key
            )));
        }
        Ok(())
    }

    fn record_persist(&mut self, key: &'static str, result: Result<()>) {
        match result {
            Ok(()) => {
                self.persist_errors.remove(key);
            }
            Err(err) => {
                warn!(key, error = %err, "persisting failed; keeping in-memory state");
                self.persist_errors.insert(key, err);
            }
        }
    }
}
