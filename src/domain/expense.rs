//! Expense entries recorded by the user.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

use crate::domain::common::{Identifiable, SpendingRecord};
use crate::domain::month::Month;
use crate::errors::{Result, TrackerError};

/// A single spending transaction.
///
/// `category` may point at a category that no longer exists; consumers treat
/// such entries as uncategorized rather than failing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    pub id: String,
    pub amount: f64,
    pub category: String,
    #[serde(deserialize_with = "deserialize_date")]
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Expense {
    /// Builds a new expense from a validated draft, assigning a fresh id.
    pub fn from_draft(draft: ExpenseDraft, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            amount: draft.amount,
            category: draft.category,
            date: draft.date,
            notes: normalize_notes(draft.notes),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn month(&self) -> Month {
        Month::of_date(self.date)
    }
}

impl Identifiable for Expense {
    fn id(&self) -> &str {
        &self.id
    }
}

impl SpendingRecord for Expense {
    fn category_id(&self) -> &str {
        &self.category
    }

    fn date(&self) -> NaiveDate {
        self.date
    }

    fn amount(&self) -> f64 {
        self.amount
    }
}

/// User-supplied fields for creating or editing an expense.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseDraft {
    pub amount: f64,
    pub category: String,
    pub date: NaiveDate,
    pub notes: Option<String>,
}

impl ExpenseDraft {
    pub fn new(amount: f64, category: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            amount,
            category: category.into(),
            date,
            notes: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Rejects drafts that would produce an invalid expense as of `today`.
    pub fn validate(&self, today: NaiveDate) -> Result<()> {
        if !self.amount.is_finite() || self.amount <= 0.0 {
            return Err(TrackerError::validation(
                "amount must be a number greater than 0",
            ));
        }
        if self.category.trim().is_empty() {
            return Err(TrackerError::validation("a category is required"));
        }
        if self.date > today {
            return Err(TrackerError::validation(format!(
                "date {} cannot be in the future",
                self.date
            )));
        }
        Ok(())
    }
}

/// Accepts `YYYY-MM-DD` as well as full date-time strings such as
/// `2024-04-01T10:00:00.000Z`, keeping only the calendar date.
fn deserialize_date<'de, D>(deserializer: D) -> std::result::Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    let day = raw.split(['T', ' ']).next().unwrap_or_default();
    NaiveDate::parse_from_str(day, "%Y-%m-%d")
        .map_err(|err| serde::de::Error::custom(format!("invalid date `{}`: {}", raw, err)))
}

fn normalize_notes(notes: Option<String>) -> Option<String> {
    notes
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}
