//! Derived analytics: monthly budget progress, alerts, history, and spending breakdowns.

use std::collections::HashMap;

use serde::Serialize;

use crate::currency::{calculate_percentage, format_currency};
use crate::domain::{BudgetRecord, Category, Month, SpendingRecord};

use super::{budget_service::BudgetService, expense_service::ExpenseService, rollover::RolloverService};

const UNKNOWN_CATEGORY: &str = "Unknown Category";

/// Budget usage for one category in one month.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetProgress {
    pub category_id: String,
    pub name: String,
    pub budget: f64,
    pub spent: f64,
    pub remaining: f64,
    pub percentage: f64,
    pub is_over_budget: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBudgetSummary {
    pub month: Month,
    pub total_budget: f64,
    pub total_spent: f64,
    pub total_remaining: f64,
    pub percentage_used: f64,
    /// What would carry into the next month if it were provisioned now.
    pub projected_rollover: f64,
    pub is_over_budget: bool,
    pub categories: Vec<BudgetProgress>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertLevel {
    Danger,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetAlert {
    pub level: AlertLevel,
    /// `None` for the month-wide alert.
    pub category_id: Option<String>,
    pub title: String,
    pub message: String,
    pub percentage: f64,
    pub is_over_budget: bool,
}

/// Thresholds (in percent of budget) at which warnings fire.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertPolicy {
    pub category_warning: f64,
    pub total_warning: f64,
    pub currency: String,
}

impl Default for AlertPolicy {
    fn default() -> Self {
        Self {
            category_warning: 80.0,
            total_warning: 90.0,
            currency: "USD".into(),
        }
    }
}

/// Spending grouped by category across a set of expenses.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategorySpending {
    /// `None` groups expenses whose category no longer exists.
    pub category_id: Option<String>,
    pub name: String,
    pub total: f64,
    pub percentage: f64,
    pub count: usize,
}

pub struct SummaryService;

impl SummaryService {
    pub fn month_summary<E: SpendingRecord>(
        budgets: &[BudgetRecord],
        expenses: &[E],
        categories: &[Category],
        month: &Month,
    ) -> MonthlyBudgetSummary {
        let month_expenses = ExpenseService::expenses_for_month(expenses, month);
        let progress: Vec<BudgetProgress> = categories
            .iter()
            .map(|category| {
                let budget = BudgetService::find_budget(budgets, &category.id, month)
                    .map(|record| record.amount)
                    .unwrap_or(0.0);
                let spent = ExpenseService::total_for_category(&month_expenses, &category.id);
                let remaining = budget - spent;
                BudgetProgress {
                    category_id: category.id.clone(),
                    name: category.name.clone(),
                    budget,
                    spent,
                    remaining,
                    percentage: calculate_percentage(spent, budget),
                    is_over_budget: remaining < 0.0,
                }
            })
            .collect();

        let total_budget = BudgetService::total_budget_for_month(budgets, month);
        let total_spent = ExpenseService::total(&month_expenses);
        let total_remaining = total_budget - total_spent;
        let projected_rollover = month
            .next()
            .map(|next| {
                RolloverService::compute(budgets, &next, expenses)
                    .iter()
                    .map(|entry| entry.amount)
                    .sum()
            })
            .unwrap_or(0.0);

        MonthlyBudgetSummary {
            month: *month,
            total_budget,
            total_spent,
            total_remaining,
            percentage_used: calculate_percentage(total_spent, total_budget),
            projected_rollover,
            is_over_budget: total_remaining < 0.0,
            categories: progress,
        }
    }

    /// Over-budget (danger) and near-limit (warning) alerts, danger first.
    pub fn alerts<E: SpendingRecord>(
        budgets: &[BudgetRecord],
        expenses: &[E],
        categories: &[Category],
        month: &Month,
        policy: &AlertPolicy,
    ) -> Vec<BudgetAlert> {
        let summary = Self::month_summary(budgets, expenses, categories, month);
        let mut alerts = Vec::new();

        if summary.total_remaining < 0.0 {
            alerts.push(BudgetAlert {
                level: AlertLevel::Danger,
                category_id: None,
                title: "Overall Budget Exceeded".into(),
                message: format!(
                    "You've exceeded your total budget by {}",
                    format_currency(summary.total_remaining.abs(), &policy.currency)
                ),
                percentage: summary.percentage_used,
                is_over_budget: true,
            });
        } else if summary.percentage_used >= policy.total_warning {
            alerts.push(BudgetAlert {
                level: AlertLevel::Warning,
                category_id: None,
                title: "Near Total Budget Limit".into(),
                message: format!(
                    "You've used {:.1}% of your total budget",
                    summary.percentage_used
                ),
                percentage: summary.percentage_used,
                is_over_budget: false,
            });
        }

        for progress in &summary.categories {
            if progress.remaining < 0.0 {
                alerts.push(BudgetAlert {
                    level: AlertLevel::Danger,
                    category_id: Some(progress.category_id.clone()),
                    title: format!("{} Budget Exceeded", progress.name),
                    message: format!(
                        "You've exceeded your {} budget by {}",
                        progress.name,
                        format_currency(progress.remaining.abs(), &policy.currency)
                    ),
                    percentage: progress.percentage,
                    is_over_budget: true,
                });
            } else if progress.percentage >= policy.category_warning && progress.percentage < 100.0 {
                alerts.push(BudgetAlert {
                    level: AlertLevel::Warning,
                    category_id: Some(progress.category_id.clone()),
                    title: format!("{} Near Limit", progress.name),
                    message: format!(
                        "You've used {:.1}% of your {} budget",
                        progress.percentage, progress.name
                    ),
                    percentage: progress.percentage,
                    is_over_budget: false,
                });
            }
        }

        alerts.sort_by_key(|alert| alert.level);
        alerts
    }

    /// Summaries for the `count` months ending at `end`, oldest first.
    pub fn history<E: SpendingRecord>(
        budgets: &[BudgetRecord],
        expenses: &[E],
        categories: &[Category],
        end: &Month,
        count: usize,
    ) -> Vec<MonthlyBudgetSummary> {
        end.trailing(count)
            .iter()
            .map(|month| Self::month_summary(budgets, expenses, categories, month))
            .collect()
    }

    /// Spending per category, largest first. Only categories with spending appear.
    pub fn category_breakdown<E: SpendingRecord>(
        expenses: &[E],
        categories: &[Category],
    ) -> Vec<CategorySpending> {
        let lookup: HashMap<&str, &Category> = categories
            .iter()
            .map(|category| (category.id.as_str(), category))
            .collect();
        let grand_total = ExpenseService::total(expenses);

        let mut grouped: HashMap<Option<&str>, (f64, usize)> = HashMap::new();
        for expense in expenses {
            let key = lookup
                .get(expense.category_id())
                .map(|category| category.id.as_str());
            let entry = grouped.entry(key).or_insert((0.0, 0));
            entry.0 += expense.amount();
            entry.1 += 1;
        }

        let mut breakdown: Vec<CategorySpending> = grouped
            .into_iter()
            .map(|(key, (total, count))| CategorySpending {
                category_id: key.map(str::to_string),
                name: key
                    .and_then(|id| lookup.get(id))
                    .map(|category| category.name.clone())
                    .unwrap_or_else(|| UNKNOWN_CATEGORY.into()),
                total,
                percentage: calculate_percentage(total, grand_total),
                count,
            })
            .collect();
        breakdown.sort_by(|a, b| b.total.total_cmp(&a.total).then_with(|| a.name.cmp(&b.name)));
        breakdown
    }
}
