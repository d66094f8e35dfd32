//! JSON planner configuration.
//!
//! Every field has a default, so `{}` is a valid configuration: plan for
//! the first candidate goal with the blocking driver, never cancel, no
//! trace. Unknown fields are rejected.
//!
//! ```json
//! {
//!   "goal_mode": { "kind": "cheapest_of" },
//!   "watchdog": { "kind": "cost_ceiling", "limit": 12.5 },
//!   "driver": "yielding",
//!   "trace": true
//! }
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use quarry_search::policy::GoalMode;
use quarry_search::watchdog::{AlwaysContinue, CostCeiling, Deadline, TimeSlice, Watchdog};

/// Error loading or validating a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid JSON for [`PlannerConfig`].
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The document parsed but a value is out of range.
    #[error("configuration validation failed: {0}")]
    Invalid(String),
}

/// Goal selection, mirroring [`GoalMode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum GoalModeConfig {
    Single { index: usize },
    CheapestOf,
}

impl Default for GoalModeConfig {
    fn default() -> Self {
        Self::Single { index: 0 }
    }
}

impl From<GoalModeConfig> for GoalMode {
    fn from(config: GoalModeConfig) -> Self {
        match config {
            GoalModeConfig::Single { index } => Self::Single(index),
            GoalModeConfig::CheapestOf => Self::CheapestOf,
        }
    }
}

/// Watchdog policy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum WatchdogConfig {
    #[default]
    AlwaysContinue,
    /// Cancel once the next entry costs at least `limit`.
    CostCeiling { limit: f64 },
    /// Cancel `millis` after the watchdog is built.
    Deadline { millis: u64 },
    /// Suspend every `millis` of wall-clock time.
    TimeSlice { millis: u64 },
}

impl WatchdogConfig {
    /// Build the watchdog. Deadlines start counting now.
    #[must_use]
    pub fn build(&self) -> Box<dyn Watchdog + Send> {
        match *self {
            Self::AlwaysContinue => Box::new(AlwaysContinue),
            Self::CostCeiling { limit } => Box::new(CostCeiling::new(limit)),
            Self::Deadline { millis } => Box::new(Deadline::after(Duration::from_millis(millis))),
            Self::TimeSlice { millis } => Box::new(TimeSlice::new(Duration::from_millis(millis))),
        }
    }
}

/// Which execution driver runs the search.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriverKind {
    #[default]
    Blocking,
    Yielding,
    Stepped,
}

impl DriverKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Blocking => "blocking",
            Self::Yielding => "yielding",
            Self::Stepped => "stepped",
        }
    }
}

/// Harness planner configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlannerConfig {
    pub goal_mode: GoalModeConfig,
    pub watchdog: WatchdogConfig,
    pub driver: DriverKind,
    /// Forward engine trace lines to `tracing` at debug level.
    pub trace: bool,
}

impl PlannerConfig {
    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        tracing::debug!(path = %path.display(), ?config, "planner config loaded");
        Ok(config)
    }

    /// Parse and validate a configuration document.
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is invalid or a value is out of range.
    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a cost ceiling that is negative
    /// or not finite.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let WatchdogConfig::CostCeiling { limit } = self.watchdog {
            if !limit.is_finite() || limit < 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "cost ceiling must be a finite non-negative number, got {limit}"
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn goal_mode(&self) -> GoalMode {
        self.goal_mode.into()
    }
}
