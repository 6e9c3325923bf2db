//! Settings for PopSim synthesis steps.
//!
//! Load the run settings from a YAML or TOML file to pick the geography
//! hierarchy, the total-household control and the integerizer tuning
//! without code changes.
//!
//! # Examples
//!
//! Load settings from a YAML string:
//!
//! ```
//! use popsim_config::Settings;
//! use std::time::Duration;
//!
//! let settings = Settings::from_yaml_str(r#"
//!     geographies: [COUNTY, PUMA, TAZ, MAZ]
//!     seed_geography: PUMA
//!     total_hh_control: num_hh
//!     integerizer:
//!       termination:
//!         seconds_spent_limit: 30
//! "#).unwrap();
//!
//! assert_eq!(settings.meta_geography(), Some("COUNTY"));
//! assert_eq!(settings.integerizer.time_limit(), Some(Duration::from_secs(30)));
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Run settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct Settings {
    /// Geographies from coarsest to finest; the first is the meta geography.
    pub geographies: Vec<String>,

    /// Geography at which households are sampled and integerized.
    pub seed_geography: String,

    /// Control column that anchors the household count during integerization.
    pub total_hh_control: String,

    /// Skips seed integerization entirely.
    #[serde(default)]
    pub no_integerization_ever: bool,

    /// Integerizer tuning.
    #[serde(default)]
    pub integerizer: IntegerizerConfig,
}

impl Settings {
    /// Creates settings with default integerizer tuning.
    pub fn new(
        geographies: Vec<String>,
        seed_geography: impl Into<String>,
        total_hh_control: impl Into<String>,
    ) -> Self {
        Self {
            geographies,
            seed_geography: seed_geography.into(),
            total_hh_control: total_hh_control.into(),
            no_integerization_ever: false,
            integerizer: IntegerizerConfig::default(),
        }
    }

    /// Loads and validates settings, picking the format from the extension.
    ///
    /// `.toml` files are parsed as TOML, anything else as YAML.
    ///
    /// # Errors
    ///
    /// Returns error if the file doesn't exist, doesn't parse, or fails
    /// [`validate`](Self::validate).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let settings = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml_file(path)?,
            _ => Self::from_yaml_file(path)?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Loads settings from a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Parses settings from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(s)?)
    }

    /// Loads settings from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parses settings from a YAML string.
    pub fn from_yaml_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(s)?)
    }

    /// Coarsest geography, whose controls are factored down to seeds.
    pub fn meta_geography(&self) -> Option<&str> {
        self.geographies.first().map(String::as_str)
    }

    /// Returns true if there is a meta level distinct from the seed level.
    pub fn has_meta_level(&self) -> bool {
        self.meta_geography()
            .is_some_and(|meta| meta != self.seed_geography)
    }

    pub fn with_integerizer(mut self, integerizer: IntegerizerConfig) -> Self {
        self.integerizer = integerizer;
        self
    }

    pub fn with_no_integerization(mut self) -> Self {
        self.no_integerization_ever = true;
        self
    }

    /// Checks structural consistency.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.geographies.is_empty() {
            return Err(ConfigError::Invalid("geographies must not be empty".into()));
        }
        if !self.geographies.contains(&self.seed_geography) {
            return Err(ConfigError::Invalid(format!(
                "seed_geography '{}' is not one of geographies {:?}",
                self.seed_geography, self.geographies
            )));
        }
        if self.total_hh_control.is_empty() {
            return Err(ConfigError::Invalid("total_hh_control must be set".into()));
        }
        self.integerizer.validate()
    }
}

/// Integerizer tuning.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct IntegerizerConfig {
    /// Number of zones integerized concurrently.
    pub thread_count: ThreadCount,

    /// What to do when a zone fails.
    pub failure_policy: FailurePolicy,

    /// Treat NaN controls that no household data explains as fatal.
    pub strict_control_cleaning: bool,

    /// Per-zone termination.
    pub termination: TerminationConfig,

    /// Late acceptance history size.
    pub late_acceptance_size: usize,

    /// Candidate moves evaluated per step.
    pub move_sample_size: usize,

    /// Base random seed; each zone mixes in its own id.
    pub random_seed: u64,
}

impl Default for IntegerizerConfig {
    fn default() -> Self {
        Self {
            thread_count: ThreadCount::Auto,
            failure_policy: FailurePolicy::Abort,
            strict_control_cleaning: false,
            termination: TerminationConfig::default(),
            late_acceptance_size: 400,
            move_sample_size: 32,
            random_seed: 0,
        }
    }
}

impl IntegerizerConfig {
    /// Per-zone time limit, if configured.
    pub fn time_limit(&self) -> Option<Duration> {
        self.termination.time_limit()
    }

    pub fn with_thread_count(mut self, thread_count: ThreadCount) -> Self {
        self.thread_count = thread_count;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    pub fn with_random_seed(mut self, seed: u64) -> Self {
        self.random_seed = seed;
        self
    }

    pub fn with_step_count_limit(mut self, steps: u64) -> Self {
        self.termination.step_count_limit = Some(steps);
        self
    }

    pub fn with_seconds_spent_limit(mut self, seconds: u64) -> Self {
        self.termination.seconds_spent_limit = Some(seconds);
        self
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.late_acceptance_size == 0 {
            return Err(ConfigError::Invalid(
                "integerizer.late_acceptance_size must be positive".into(),
            ));
        }
        if self.move_sample_size == 0 {
            return Err(ConfigError::Invalid(
                "integerizer.move_sample_size must be positive".into(),
            ));
        }
        if let ThreadCount::Count(0) = self.thread_count {
            return Err(ConfigError::Invalid(
                "integerizer.thread_count must be positive".into(),
            ));
        }
        Ok(())
    }
}

/// Zone-level failure handling.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first failing zone aborts the whole run.
    #[default]
    Abort,

    /// Every zone is attempted and failures are reported together.
    Report,
}

/// Zone concurrency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadCount {
    /// One thread per available core, capped at the number of zones.
    #[default]
    Auto,

    /// A specific number of threads, capped at the number of zones.
    Count(usize),
}

impl ThreadCount {
    /// Resolves to an actual thread count for `zone_count` zones.
    pub fn resolve(&self, zone_count: usize) -> usize {
        let wanted = match self {
            ThreadCount::Auto => std::thread::available_parallelism()
                .map(|p| p.get())
                .unwrap_or(1),
            ThreadCount::Count(n) => *n,
        };
        wanted.min(zone_count).max(1)
    }
}

impl std::fmt::Display for ThreadCount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ThreadCount::Auto => write!(f, "Auto"),
            ThreadCount::Count(n) => write!(f, "{}", n),
        }
    }
}

/// Per-zone termination.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", default)]
pub struct TerminationConfig {
    /// Maximum seconds to spend on one zone.
    pub seconds_spent_limit: Option<u64>,

    /// Maximum local search steps for one zone.
    pub step_count_limit: Option<u64>,

    /// Maximum steps without improving the best score.
    pub unimproved_step_count_limit: Option<u64>,
}

impl Default for TerminationConfig {
    fn default() -> Self {
        Self {
            seconds_spent_limit: Some(10),
            step_count_limit: Some(100_000),
            unimproved_step_count_limit: Some(5_000),
        }
    }
}

impl TerminationConfig {
    /// Returns the time limit as a Duration, if any.
    pub fn time_limit(&self) -> Option<Duration> {
        self.seconds_spent_limit
            .filter(|s| *s > 0)
            .map(Duration::from_secs)
    }
}
