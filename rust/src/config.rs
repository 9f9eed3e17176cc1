//! Configuration types for the scheduling system.

use serde::{Deserialize, Serialize};

/// Configuration for the schedule calculator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScheduleConfig {
    /// Duration in hours for tasks without a positive duration
    pub default_duration_hours: f64,
    /// Window in milliseconds within which a dependency's completion counts
    /// as driving its dependent's start during the critical path trace.
    /// Changing it changes which path is marked critical on near-ties.
    pub critical_tolerance_ms: i64,
    /// Verbosity level: 0=silent, 1=changes, 2=checks, 3=debug.
    pub verbosity: u8,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            default_duration_hours: 1.0,
            critical_tolerance_ms: 1000,
            verbosity: 0,
        }
    }
}

impl ScheduleConfig {
    /// Build a config, taking defaults for any field left unset.
    pub fn new(
        default_duration_hours: Option<f64>,
        critical_tolerance_ms: Option<i64>,
        verbosity: Option<u8>,
    ) -> Self {
        let defaults = Self::default();
        Self {
            default_duration_hours: default_duration_hours
                .filter(|h| h.is_finite() && *h > 0.0)
                .unwrap_or(defaults.default_duration_hours),
            critical_tolerance_ms: critical_tolerance_ms
                .map(|ms| ms.max(0))
                .unwrap_or(defaults.critical_tolerance_ms),
            verbosity: verbosity.unwrap_or(defaults.verbosity),
        }
    }

    /// Tolerance as a chrono duration.
    pub fn tolerance(&self) -> chrono::Duration {
        chrono::Duration::milliseconds(self.critical_tolerance_ms)
    }
}
