use crate::config::ConfigError;
use crate::types::ServiceCheckStatus;

pub const DEFAULT_WARNING_PERCENT: f64 = 80.0;
pub const DEFAULT_CRITICAL_PERCENT: f64 = 100.0;

/// Usage percentages at which a resource turns WARNING and CRITICAL.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub warning: f64,
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            warning: DEFAULT_WARNING_PERCENT,
            critical: DEFAULT_CRITICAL_PERCENT,
        }
    }
}

impl Thresholds {
    pub fn new(warning: f64, critical: f64) -> Result<Self, ConfigError> {
        if !warning.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "warning_threshold",
                reason: "must be finite".to_string(),
            });
        }
        if !critical.is_finite() {
            return Err(ConfigError::InvalidValue {
                field: "critical_threshold",
                reason: "must be finite".to_string(),
            });
        }
        if warning > critical {
            return Err(ConfigError::InvalidThresholds { warning, critical });
        }
        Ok(Self { warning, critical })
    }

    pub fn evaluate(&self, percent: f64) -> ServiceCheckStatus {
        if percent >= self.critical {
            ServiceCheckStatus::Critical
        } else if percent >= self.warning {
            ServiceCheckStatus::Warning
        } else {
            ServiceCheckStatus::Ok
        }
    }
}
