use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::common::Identifiable;
use crate::domain::month::Month;
use crate::errors::{Result, TrackerError};

/// Deterministic record id: `<categoryId>-<YYYY-MM>`.
pub fn record_id(category_id: &str, month: &Month) -> String {
    format!("{}-{}", category_id, month)
}

/// Spending ceiling for one category in one calendar month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct BudgetRecord {
    pub id: String,
    pub category_id: String,
    pub amount: f64,
    pub month: Month,
    pub rollover: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl BudgetRecord {
    /// A freshly provisioned record with rollover disabled.
    pub fn new(
        category_id: impl Into<String>,
        month: Month,
        amount: f64,
        now: DateTime<Utc>,
    ) -> Self {
        let category_id = category_id.into();
        Self {
            id: record_id(&category_id, &month),
            category_id,
            amount,
            month,
            rollover: false,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(TrackerError::validation("budget id is required"));
        }
        if self.category_id.trim().is_empty() {
            return Err(TrackerError::validation("budget category id is required"));
        }
        validate_amount(self.amount)
    }

    pub fn matches(&self, category_id: &str, month: &Month) -> bool {
        self.category_id == category_id && self.month == *month
    }
}

impl Identifiable for BudgetRecord {
    fn id(&self) -> &str {
        &self.id
    }
}

/// Partial edit applied to an existing record.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BudgetUpdate {
    pub amount: Option<f64>,
    pub rollover: Option<bool>,
}

impl BudgetUpdate {
    pub fn amount(amount: f64) -> Self {
        Self {
            amount: Some(amount),
            rollover: None,
        }
    }

    pub fn rollover(enabled: bool) -> Self {
        Self {
            amount: None,
            rollover: Some(enabled),
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self.amount {
            Some(amount) => validate_amount(amount),
            None => Ok(()),
        }
    }
}

pub(crate) fn validate_amount(amount: f64) -> Result<()> {
    if !amount.is_finite() {
        return Err(TrackerError::validation("budget amount must be a number"));
    }
    if amount < 0.0 {
        return Err(TrackerError::validation(format!(
            "budget amount {} must not be negative",
            amount
        )));
    }
    Ok(())
}
