//! Join configuration.
//!
//! Thresholds and column names come from an optional TOML file; command-line
//! flags override individual thresholds. Everything missing falls back to the
//! defaults (50 km, 5 days, source column names).
//!
//! ```toml
//! [match]
//! max_distance_km = 50.0
//! max_time_delta_days = 5
//!
//! [columns]
//! fire_date = "дата первого наблюдения"
//! storm_date = "dt"
//! ```

use std::fs;
use std::path::Path;

use firestorm_algo::MatchPolicy;
use firestorm_core::{FirestormError, FirestormResult};
use firestorm_io::ColumnMapping;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct JoinConfig {
    /// Acceptance thresholds
    #[serde(default, rename = "match")]
    pub matching: MatchConfig,
    /// Input column names
    #[serde(default)]
    pub columns: ColumnMapping,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchConfig {
    #[serde(default = "default_max_distance_km")]
    pub max_distance_km: f64,
    #[serde(default = "default_max_time_delta_days")]
    pub max_time_delta_days: i64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_distance_km: default_max_distance_km(),
            max_time_delta_days: default_max_time_delta_days(),
        }
    }
}

fn default_max_distance_km() -> f64 {
    MatchPolicy::DEFAULT_MAX_DISTANCE_KM
}

fn default_max_time_delta_days() -> i64 {
    MatchPolicy::DEFAULT_MAX_TIME_DAYS
}

impl JoinConfig {
    pub fn load(path: &Path) -> FirestormResult<Self> {
        let contents = fs::read_to_string(path).map_err(|err| {
            FirestormError::Config(format!("reading config {}: {err}", path.display()))
        })?;
        Self::from_toml(&contents)
            .map_err(|err| FirestormError::Config(format!("{}: {err}", path.display())))
    }

    pub fn load_or_default(path: Option<&Path>) -> FirestormResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn with_overrides(mut self, max_distance_km: Option<f64>, max_time_days: Option<i64>) -> Self {
        if let Some(km) = max_distance_km {
            self.matching.max_distance_km = km;
        }
        if let Some(days) = max_time_days {
            self.matching.max_time_delta_days = days;
        }
        self
    }

    /// Validated policy; bad thresholds are configuration errors.
    pub fn policy(&self) -> FirestormResult<MatchPolicy> {
        MatchPolicy::with_days(
            self.matching.max_distance_km,
            self.matching.max_time_delta_days,
        )
    }
}
