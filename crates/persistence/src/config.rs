//! Paging configuration for the query-plan builder.

use serde::{Deserialize, Serialize};

use crate::error::{StorageResult, ValidationError};
use crate::types::DEFAULT_PAGE_SIZE;

/// Paging limits applied by the query-plan builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlanConfig {
    /// Limit used when a select plan has no explicit `limit`.
    pub default_page_size: u64,

    /// Upper bound for any limit. `None` means unbounded.
    pub max_page_size: Option<u64>,
}

impl Default for PlanConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: None,
        }
    }
}

impl PlanConfig {
    /// Returns every inconsistency in the configuration.
    pub fn problems(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.default_page_size == 0 {
            problems.push("default_page_size must be > 0".to_string());
        }

        if let Some(max) = self.max_page_size {
            if max == 0 {
                problems.push("max_page_size must be > 0 when provided".to_string());
            } else if self.default_page_size > max {
                problems.push(format!(
                    "default_page_size ({}) exceeds max_page_size ({})",
                    self.default_page_size, max
                ));
            }
        }

        problems
    }

    /// Validates configuration invariants.
    pub fn validate(&self) -> StorageResult<()> {
        let problems = self.problems();
        if problems.is_empty() {
            return Ok(());
        }
        Err(ValidationError::InvalidConfig {
            message: problems.join("; "),
        }
        .into())
    }

    /// Clamps a requested limit to `max_page_size`.
    pub fn clamp_limit(&self, limit: u64) -> u64 {
        match self.max_page_size {
            Some(max) => limit.min(max),
            None => limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = PlanConfig::default();
        assert_eq!(config.default_page_size, 20);
        assert!(config.validate().is_ok());
        assert_eq!(config.clamp_limit(10_000), 10_000);
    }

    #[test]
    fn validate_rejects_zero_default() {
        let config = PlanConfig {
            default_page_size: 0,
            ..Default::default()
        };
        assert_eq!(config.problems().len(), 1);
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_default_above_max() {
        let config = PlanConfig {
            default_page_size: 50,
            max_page_size: Some(25),
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("exceeds max_page_size"));
        assert_eq!(config.clamp_limit(100), 25);
    }

    #[test]
    fn deserialize_fills_defaults() {
        let config: PlanConfig = serde_json::from_str(r#"{"max_page_size": 100}"#).unwrap();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.max_page_size, Some(100));
    }
}
