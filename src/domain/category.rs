//! Domain types representing spending categories and their budget template.

use std::collections::BTreeMap;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::domain::common::{Displayable, Identifiable, NamedEntity};

/// Static reference entity used to group expenses and budgets.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub color: String,
    pub icon: String,
}

impl Category {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        color: impl Into<String>,
        icon: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            color: color.into(),
            icon: icon.into(),
        }
    }
}

impl Identifiable for Category {
    fn id(&self) -> &str {
        &self.id
    }
}

impl NamedEntity for Category {
    fn name(&self) -> &str {
        &self.name
    }
}

impl Displayable for Category {
    fn display_label(&self) -> String {
        format!("{} {}", self.icon, self.name)
    }
}

static EXPENSE_CATEGORIES: Lazy<Vec<Category>> = Lazy::new(|| {
    vec![
        Category::new("1", "Food & Dining", "#10B981", "🍽️"),
        Category::new("2", "Transportation", "#3B82F6", "🚗"),
        Category::new("3", "Shopping", "#8B5CF6", "🛍️"),
        Category::new("4", "Entertainment", "#F59E0B", "🎬"),
        Category::new("5", "Utilities", "#EF4444", "⚡"),
        Category::new("6", "Healthcare", "#06B6D4", "🏥"),
        Category::new("7", "Education", "#84CC16", "📚"),
        Category::new("8", "Other", "#6B7280", "📝"),
    ]
});

/// The fixed set of built-in expense categories.
pub fn default_categories() -> Vec<Category> {
    EXPENSE_CATEGORIES.clone()
}

/// Starting amounts assigned to freshly provisioned budget records.
///
/// Categories absent from the template start at zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BudgetTemplate {
    amounts: BTreeMap<String, f64>,
}

impl BudgetTemplate {
    /// A template that provisions every category at zero.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Builds a template, discarding entries that are negative or not finite.
    pub fn from_amounts<I, K>(amounts: I) -> Self
    where
        I: IntoIterator<Item = (K, f64)>,
        K: Into<String>,
    {
        let amounts = amounts
            .into_iter()
            .filter(|(_, amount)| amount.is_finite() && *amount >= 0.0)
            .map(|(id, amount)| (id.into(), amount))
            .collect();
        Self { amounts }
    }

    /// Monthly amounts the tracker historically shipped with for the built-in categories.
    pub fn suggested() -> Self {
        Self::from_amounts([
            ("1", 500.0),
            ("2", 300.0),
            ("3", 400.0),
            ("4", 200.0),
            ("5", 150.0),
            ("6", 100.0),
            ("7", 200.0),
            ("8", 150.0),
        ])
    }

    pub fn amount_for(&self, category_id: &str) -> f64 {
        match self.amounts.get(category_id) {
            Some(amount) if amount.is_finite() && *amount >= 0.0 => *amount,
            _ => 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.amounts.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_categories_have_unique_ids() {
        let categories = default_categories();
        assert_eq!(categories.len(), 8);
        let mut ids: Vec<&str> = categories.iter().map(|c| c.id.as_str()).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 8);
        assert!(categories.iter().all(|c| !c.name.is_empty() && c.color.starts_with('#')));
    }

    #[test]
    fn template_defaults_missing_and_invalid_amounts_to_zero() {
        let template = BudgetTemplate::from_amounts([("1", 250.0), ("2", -4.0), ("3", f64::NAN)]);
        assert_eq!(template.amount_for("1"), 250.0);
        assert_eq!(template.amount_for("2"), 0.0);
        assert_eq!(template.amount_for("3"), 0.0);
        assert_eq!(template.amount_for("missing"), 0.0);
        assert!(BudgetTemplate::zero().is_empty());
    }

    #[test]
    fn template_serializes_as_plain_map() {
        let template = BudgetTemplate::from_amounts([("4", 200.0)]);
        let json = serde_json::to_string(&template).unwrap();
        assert_eq!(json, r#"{"4":200.0}"#);
    }

    #[test]
    fn category_serializes_camel_case() {
        let category = Category::new("9", "Pets", "#000000", "🐾");
        let json = serde_json::to_value(&category).unwrap();
        assert_eq!(json["isCustom"], serde_json::json!(false));
        assert_eq!(category.display_label(), "🐾 Pets");
    }
}
