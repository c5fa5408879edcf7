//! Configuration validation with range checks.

use crate::describe::PROVIDERS;
use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.limits.describe_timeout_ms == 0 {
            return Err(ConfigError::ValidationError(
                "limits.describe_timeout_ms must be > 0".into(),
            ));
        }
        if !PROVIDERS.contains(&self.service.provider.as_str()) {
            return Err(ConfigError::ValidationError(format!(
                "service.provider must be one of {}",
                PROVIDERS.join(", ")
            )));
        }
        if self.service.max_tokens == 0 {
            return Err(ConfigError::ValidationError(
                "service.max_tokens must be > 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.service.temperature) {
            return Err(ConfigError::ValidationError(
                "service.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        for (name, labels) in [
            ("primary", &self.catalog.primary),
            ("secondary", &self.catalog.secondary),
            ("bonus", &self.catalog.bonus),
        ] {
            if labels.iter().any(|l| l.trim().is_empty()) {
                return Err(ConfigError::ValidationError(format!(
                    "catalog.{name} contains an empty label"
                )));
            }
            let mut seen = std::collections::HashSet::new();
            if let Some(dup) = labels.iter().find(|l| !seen.insert(l.trim())) {
                return Err(ConfigError::ValidationError(format!(
                    "catalog.{name} lists '{dup}' more than once"
                )));
            }
        }
        Ok(())
    }
}
