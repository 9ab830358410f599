//! Conversion of the legacy `{categoryId: amount}` budget shape into records.

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::core::time::Clock;
use crate::domain::{BudgetRecord, Month};

/// Legacy payload: a single-month mapping of category id to amount.
pub type LegacyBudgets = Map<String, Value>;

pub struct MigrationService;

impl MigrationService {
    /// Produces exactly one record per legacy entry, stamped with `month`
    /// (the clock's current month when `None`) and rollover disabled.
    pub fn migrate_legacy(
        legacy: &LegacyBudgets,
        month: Option<Month>,
        clock: &dyn Clock,
    ) -> Vec<BudgetRecord> {
        let target = month.unwrap_or_else(|| Month::current(clock));
        let now = clock.now();
        let records: Vec<BudgetRecord> = legacy
            .iter()
            .map(|(category_id, raw)| {
                let amount = coerce_amount(raw);
                if amount == 0.0 && !is_zero_literal(raw) {
                    debug!(category = %category_id, value = %raw, "legacy amount coerced to zero");
                }
                BudgetRecord::new(category_id.clone(), target, amount, now)
            })
            .collect();
        info!(month = %target, count = records.len(), "migrated legacy budgets");
        records
    }
}

/// Lenient numeric reading of a legacy amount. Anything that does not yield a
/// finite, non-negative number becomes zero.
pub fn coerce_amount(value: &Value) -> f64 {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_leading_number(text),
        _ => None,
    };
    match parsed {
        Some(amount) if amount.is_finite() && amount >= 0.0 => amount,
        _ => 0.0,
    }
}

/// Parses the longest numeric prefix of `text`, so `"12.5 USD"` reads as `12.5`.
fn parse_leading_number(text: &str) -> Option<f64> {
    let trimmed = text.trim_start();
    let mut end = 0;
    let mut seen_digit = false;
    let mut seen_dot = false;
    for (idx, ch) in trimmed.char_indices() {
        match ch {
            '+' | '-' if idx == 0 => {}
            '0'..='9' => seen_digit = true,
            '.' if !seen_dot => seen_dot = true,
            _ => break,
        }
        end = idx + ch.len_utf8();
    }
    if !seen_digit {
        return None;
    }
    trimmed[..end].parse().ok()
}

fn is_zero_literal(value: &Value) -> bool {
    matches!(value, Value::Number(number) if number.as_f64() == Some(0.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::time::FixedClock;
    use serde_json::json;

    fn legacy(value: Value) -> LegacyBudgets {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn coerces_bad_amounts_to_zero_without_dropping_keys() {
        let clock = FixedClock::at_date(2024, 6, 1);
        let input = legacy(json!({"1": 500, "2": "bad", "3": null}));
        let records =
            MigrationService::migrate_legacy(&input, Some("2024-01".parse().unwrap()), &clock);
        let summary: Vec<(&str, f64, &str)> = records
            .iter()
            .map(|r| (r.category_id.as_str(), r.amount, r.id.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("1", 500.0, "1-2024-01"),
                ("2", 0.0, "2-2024-01"),
                ("3", 0.0, "3-2024-01"),
            ]
        );
        assert!(records.iter().all(|r| !r.rollover));
        assert!(records.iter().all(|r| r.created_at == clock.now()));
    }

    #[test]
    fn defaults_to_current_month() {
        let clock = FixedClock::at_date(2024, 6, 15);
        let records = MigrationService::migrate_legacy(&legacy(json!({"4": 200})), None, &clock);
        assert_eq!(records[0].month.to_string(), "2024-06");
        assert_eq!(records[0].id, "4-2024-06");
    }

    #[test]
    fn reads_numeric_strings_leniently() {
        assert_eq!(coerce_amount(&json!("150")), 150.0);
        assert_eq!(coerce_amount(&json!(" 12.5 USD")), 12.5);
        assert_eq!(coerce_amount(&json!("-40")), 0.0);
        assert_eq!(coerce_amount(&json!("NaN")), 0.0);
        assert_eq!(coerce_amount(&json!(true)), 0.0);
        assert_eq!(coerce_amount(&json!([1, 2])), 0.0);
        assert_eq!(coerce_amount(&json!(-3.5)), 0.0);
    }

    #[test]
    fn empty_legacy_map_yields_no_records() {
        let clock = FixedClock::at_date(2024, 6, 15);
        assert!(MigrationService::migrate_legacy(&LegacyBudgets::new(), None, &clock).is_empty());
    }
}
