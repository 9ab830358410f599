//! Domain types for expenses, categories, and monthly budget records.

pub mod budget;
pub mod category;
pub mod common;
pub mod expense;
pub mod month;

pub use budget::{record_id, BudgetRecord, BudgetUpdate};
pub use category::{default_categories, BudgetTemplate, Category};
pub use common::{Displayable, Identifiable, NamedEntity, SpendingRecord};
pub use expense::{Expense, ExpenseDraft};
pub use month::{current_month, format_month, next_month, previous_month, Month};
