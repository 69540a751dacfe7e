//! Typed fire and storm records.
//!
//! Records are validated when they are built so that the matching loop only
//! ever sees finite, in-range coordinates and real timestamps. The fields stay
//! public for ergonomic construction in tests; [`FireRecord::new`] and
//! [`StormRecord::new`] are the checked entry points used at ingestion.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::{Dataset, FirestormError, FirestormResult};
use crate::units::Kilometers;

/// Coordinate outside the WGS-84 domain.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordinateError {
    #[error("latitude {0} is outside [-90, 90]")]
    Latitude(f64),
    #[error("longitude {0} is outside [-180, 180]")]
    Longitude(f64),
}

impl CoordinateError {
    /// Name of the offending coordinate field.
    pub fn field(&self) -> &'static str {
        match self {
            CoordinateError::Latitude(_) => "lat",
            CoordinateError::Longitude(_) => "lon",
        }
    }

    pub fn into_validation(self, dataset: Dataset, record: usize) -> FirestormError {
        FirestormError::validation(dataset, record, self.field(), self.to_string())
    }
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Checks that both coordinates are finite and within WGS-84 bounds.
    pub fn validate(&self) -> Result<(), CoordinateError> {
        if !self.lat.is_finite() || !(-90.0..=90.0).contains(&self.lat) {
            return Err(CoordinateError::Latitude(self.lat));
        }
        if !self.lon.is_finite() || !(-180.0..=180.0).contains(&self.lon) {
            return Err(CoordinateError::Longitude(self.lon));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FireRecord {
    /// Row position in the fire table.
    pub id: usize,
    pub position: GeoPoint,
    pub fire_date: NaiveDateTime,
}

impl FireRecord {
    pub fn new(id: usize, lat: f64, lon: f64, fire_date: NaiveDateTime) -> FirestormResult<Self> {
        let record = Self {
            id,
            position: GeoPoint::new(lat, lon),
            fire_date,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> FirestormResult<()> {
        self.position
            .validate()
            .map_err(|err| err.into_validation(Dataset::Fires, self.id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StormRecord {
    /// Row position in the storm table.
    pub id: usize,
    pub position: GeoPoint,
    pub storm_date: NaiveDateTime,
    /// Intensity measurement, carried through unchanged into a match.
    pub amplitude: f64,
}

impl StormRecord {
    pub fn new(
        id: usize,
        lat: f64,
        lon: f64,
        storm_date: NaiveDateTime,
        amplitude: f64,
    ) -> FirestormResult<Self> {
        let record = Self {
            id,
            position: GeoPoint::new(lat, lon),
            storm_date,
            amplitude,
        };
        record.validate()?;
        Ok(record)
    }

    pub fn validate(&self) -> FirestormResult<()> {
        self.position
            .validate()
            .map_err(|err| err.into_validation(Dataset::Storms, self.id))?;
        if !self.amplitude.is_finite() {
            return Err(FirestormError::validation(
                Dataset::Storms,
                self.id,
                "amplitude",
                format!("amplitude {} is not finite", self.amplitude),
            ));
        }
        Ok(())
    }
}

/// The storm accepted for a fire.
#[derive(Debug, Clone, PartialEq)]
pub struct StormMatch {
    /// Row position of the matched storm.
    pub storm_id: usize,
    pub storm_date: NaiveDateTime,
    pub amplitude: f64,
    pub distance: Kilometers,
}

/// Outcome of matching one fire: `None` when no storm passed the window.
pub type MatchResult = Option<StormMatch>;

/// A fire record with its match flattened alongside.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichedFireRecord {
    pub fire: FireRecord,
    pub matched: MatchResult,
}

impl EnrichedFireRecord {
    pub fn new(fire: FireRecord, matched: MatchResult) -> Self {
        Self { fire, matched }
    }

    pub fn is_matched(&self) -> bool {
        self.matched.is_some()
    }

    pub fn nearest_storm_date(&self) -> Option<NaiveDateTime> {
        self.matched.as_ref().map(|m| m.storm_date)
    }

    pub fn storm_amplitude(&self) -> Option<f64> {
        self.matched.as_ref().map(|m| m.amplitude)
    }

    pub fn distance_km(&self) -> Option<f64> {
        self.matched.as_ref().map(|m| m.distance.value())
    }
}
