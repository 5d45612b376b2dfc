//! Controller configuration

use std::time::Duration;

use crate::error::{KubeError, Result};

/// Delay before re-running a pass that left targets pending
pub const DEFAULT_REQUEUE_INTERVAL: Duration = Duration::from_secs(60);

/// Delay before retrying a pass that failed outright
pub const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(30);

/// Settings for the cleanup controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Flat interval between passes while targets remain
    pub requeue_interval: Duration,

    /// Interval after a failed pass (policy load or status write)
    pub error_backoff: Duration,

    /// Only watch policies in this namespace; all namespaces when `None`
    pub namespace: Option<String>,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            requeue_interval: DEFAULT_REQUEUE_INTERVAL,
            error_backoff: DEFAULT_ERROR_BACKOFF,
            namespace: None,
        }
    }
}

impl ControllerConfig {
    /// Reject settings that would make the controller spin
    pub fn validate(&self) -> Result<()> {
        if self.requeue_interval.is_zero() {
            return Err(KubeError::InvalidConfig(
                "requeue interval must be greater than zero".to_string(),
            ));
        }
        if self.error_backoff.is_zero() {
            return Err(KubeError::InvalidConfig(
                "error backoff must be greater than zero".to_string(),
            ));
        }
        if matches!(&self.namespace, Some(ns) if ns.is_empty()) {
            return Err(KubeError::InvalidConfig(
                "namespace must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ControllerConfig::default();
        assert_eq!(config.requeue_interval, Duration::from_secs(60));
        assert!(config.namespace.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_zero_intervals_rejected() {
        let config = ControllerConfig {
            requeue_interval: Duration::ZERO,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(KubeError::InvalidConfig(_))));

        let config = ControllerConfig {
            error_backoff: Duration::ZERO,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_empty_namespace_rejected() {
        let config = ControllerConfig {
            namespace: Some(String::new()),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
