pub mod budget_service;
pub mod expense_service;
pub mod migration;
pub mod rollover;
pub mod summary_service;

pub use budget_service::{BudgetService, ProvisionContext, ProvisionReport};
pub use expense_service::ExpenseService;
pub use migration::{coerce_amount, LegacyBudgets, MigrationService};
pub use rollover::{RolloverEntry, RolloverService};
pub use summary_service::{
    AlertLevel, AlertPolicy, BudgetAlert, BudgetProgress, CategorySpending, MonthlyBudgetSummary,
    SummaryService,
};
