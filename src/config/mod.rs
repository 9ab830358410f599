use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::core::services::AlertPolicy;
use crate::domain::BudgetTemplate;
use crate::errors::{Result, TrackerError};
use crate::storage::{KeyValueStore, StorageKeys};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackerConfig {
    pub currency: String,
    pub rollover_enabled: bool,
    pub category_alert_threshold: f64,
    pub total_alert_threshold: f64,
    pub history_months: usize,
    #[serde(skip_serializing_if = "BudgetTemplate::is_empty")]
    pub budget_template: BudgetTemplate,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            currency: "USD".into(),
            rollover_enabled: true,
            category_alert_threshold: 80.0,
            total_alert_threshold: 90.0,
            history_months: 6,
            budget_template: BudgetTemplate::zero(),
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<()> {
        if self.currency.trim().is_empty() {
            return Err(TrackerError::validation("currency code is required"));
        }
        for (label, value) in [
            ("category alert threshold", self.category_alert_threshold),
            ("total alert threshold", self.total_alert_threshold),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(TrackerError::Validation(format!(
                    "{} must be a positive percentage, got {}",
                    label, value
                )));
            }
        }
        if self.history_months == 0 {
            return Err(TrackerError::validation("history must cover at least one month"));
        }
        Ok(())
    }

    pub fn alert_policy(&self) -> AlertPolicy {
        AlertPolicy {
            category_warning: self.category_alert_threshold,
            total_warning: self.total_alert_threshold,
            currency: self.currency.clone(),
        }
    }

    pub fn template(&self) -> &BudgetTemplate {
        &self.budget_template
    }
}

/// Reads and writes [`TrackerConfig`] under the settings key of a store.
pub struct ConfigManager;

impl ConfigManager {
    /// Missing, unreadable, or invalid settings all yield the defaults.
    pub fn load(store: &dyn KeyValueStore) -> TrackerConfig {
        let raw = match store.get(StorageKeys::SETTINGS) {
            Ok(Some(raw)) => raw,
            Ok(None) => return TrackerConfig::default(),
            Err(err) => {
                warn!(error = %err, "reading settings failed; using defaults");
                return TrackerConfig::default();
            }
        };
        let parsed = serde_json::from_str::<TrackerConfig>(&raw)
            .map_err(TrackerError::from)
            .and_then(|config| config.validate().map(|_| config));
        match parsed {
            Ok(config) => config,
            Err(err) => {
                warn!(error = %err, "discarding invalid settings; using defaults");
                TrackerConfig::default()
            }
        }
    }

    pub fn save(store: &dyn KeyValueStore, config: &TrackerConfig) -> Result<()> {
        config.validate()?;
        let json = serde_json::to_string_pretty(config)
            .map_err(|err| TrackerError::Storage(format!("serializing settings: {}", err)))?;
        store.set(StorageKeys::SETTINGS, &json)
    }
}
