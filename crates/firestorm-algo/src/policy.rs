use chrono::{Duration, NaiveDateTime};
use firestorm_core::{FirestormError, FirestormResult, Kilometers};

/// Acceptance window for a fire/storm pairing.
///
/// A candidate passes when it is within `max_distance` along the ellipsoid
/// AND its timestamp is within `max_time_delta` of the fire, before or after.
/// Both bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchPolicy {
    max_distance: Kilometers,
    max_time_delta: Duration,
}

impl MatchPolicy {
    pub const DEFAULT_MAX_DISTANCE_KM: f64 = 50.0;
    pub const DEFAULT_MAX_TIME_DAYS: i64 = 5;

    /// Builds a validated policy.
    ///
    /// `max_distance_km` must be finite and strictly positive; the time window
    /// must not be negative.
    pub fn new(max_distance_km: f64, max_time_delta: Duration) -> FirestormResult<Self> {
        if !max_distance_km.is_finite() || max_distance_km <= 0.0 {
            return Err(FirestormError::Config(format!(
                "max distance must be a positive number of kilometres, got {max_distance_km}"
            )));
        }
        if max_time_delta < Duration::zero() {
            return Err(FirestormError::Config(format!(
                "max time delta must not be negative, got {max_time_delta}"
            )));
        }
        Ok(Self {
            max_distance: Kilometers(max_distance_km),
            max_time_delta,
        })
    }

    pub fn with_days(max_distance_km: f64, max_days: i64) -> FirestormResult<Self> {
        if max_days < 0 {
            return Err(FirestormError::Config(format!(
                "max time window must not be negative, got {max_days} days"
            )));
        }
        let window = Duration::try_days(max_days).ok_or_else(|| {
            FirestormError::Config(format!("max time window of {max_days} days is too large"))
        })?;
        Self::new(max_distance_km, window)
    }

    pub fn max_distance(&self) -> Kilometers {
        self.max_distance
    }

    pub fn max_time_delta(&self) -> Duration {
        self.max_time_delta
    }

    /// True iff `distance <= max_distance` and `|time_delta| <= max_time_delta`.
    pub fn accepts(&self, distance: Kilometers, time_delta: Duration) -> bool {
        distance <= self.max_distance && abs_duration(time_delta) <= self.max_time_delta
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            max_distance: Kilometers(Self::DEFAULT_MAX_DISTANCE_KM),
            max_time_delta: Duration::days(Self::DEFAULT_MAX_TIME_DAYS),
        }
    }
}

/// Unsigned gap between two timestamps.
pub fn time_gap(a: NaiveDateTime, b: NaiveDateTime) -> Duration {
    abs_duration(a - b)
}

fn abs_duration(d: Duration) -> Duration {
    if d < Duration::zero() {
        -d
    } else {
        d
    }
}
