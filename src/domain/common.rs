use chrono::NaiveDate;

/// Identifies entities that expose a stable unique identifier.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Provides access to a human-friendly entity name.
pub trait NamedEntity {
    fn name(&self) -> &str;
}

/// Supplies a presentation-ready label for UI or logs.
pub trait Displayable {
    fn display_label(&self) -> String;
}

/// Read-only view of a spending entry: the `(category, date, amount)` triple
/// the rollover engine and the analytics consume.
pub trait SpendingRecord {
    fn category_id(&self) -> &str;
    fn date(&self) -> NaiveDate;
    fn amount(&self) -> f64;
}

impl<T: SpendingRecord + ?Sized> SpendingRecord for &T {
    fn category_id(&self) -> &str {
        (**self).category_id()
    }

    fn date(&self) -> NaiveDate {
        (**self).date()
    }

    fn amount(&self) -> f64 {
        (**self).amount()
    }
}

impl SpendingRecord for (String, NaiveDate, f64) {
    fn category_id(&self) -> &str {
        &self.0
    }

    fn date(&self) -> NaiveDate {
        self.1
    }

    fn amount(&self) -> f64 {
        self.2
    }
}

// Re-export common dependencies so consumers can rely on this module as a façade.
pub use chrono;
pub use serde;
