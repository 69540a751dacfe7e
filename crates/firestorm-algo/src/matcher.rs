use firestorm_core::{
    Dataset, FireRecord, FirestormResult, MatchResult, StormMatch, StormRecord,
};
use tracing::trace;

use crate::distance::geodesic_km;
use crate::geo_index::GeoIndex;
use crate::policy::{time_gap, MatchPolicy};

/// Matches fires against a fixed storm collection.
///
/// **Algorithm:**
/// 1. Query the R-tree with the fire's `(lat, lon)` for the single planar-nearest storm.
/// 2. Measure the geodesic distance from fire to that storm.
/// 3. Take the unsigned gap between fire and storm dates.
/// 4. Accept the storm iff [`MatchPolicy::accepts`] holds; otherwise the fire is unmatched.
///
/// Only the planar-nearest storm is ever checked. Near the poles or across
/// the antimeridian a geodesically closer storm can lose to it and will not
/// be considered.
#[derive(Debug)]
pub struct FireStormMatcher<'a> {
    storms: &'a [StormRecord],
    index: GeoIndex,
    policy: MatchPolicy,
}

impl<'a> FireStormMatcher<'a> {
    /// Validates every storm and bulk-loads the index.
    pub fn new(storms: &'a [StormRecord], policy: MatchPolicy) -> FirestormResult<Self> {
        for storm in storms {
            storm.validate()?;
        }
        Ok(Self {
            storms,
            index: GeoIndex::from_storms(storms),
            policy,
        })
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    pub fn num_storms(&self) -> usize {
        self.index.len()
    }

    pub fn match_fire(&self, fire: &FireRecord) -> FirestormResult<MatchResult> {
        fire.validate()?;

        let Some(neighbor) = self.index.nearest_one(fire.position.lat, fire.position.lon) else {
            return Ok(None);
        };
        let storm = &self.storms[neighbor.index];

        let distance = geodesic_km(fire.position, storm.position)
            .map_err(|err| err.into_validation(Dataset::Storms, storm.id))?;
        let gap = time_gap(fire.fire_date, storm.storm_date);

        if self.policy.accepts(distance, gap) {
            trace!(
                fire = fire.id,
                storm = storm.id,
                distance_km = distance.value(),
                gap_hours = gap.num_hours(),
                "storm accepted"
            );
            Ok(Some(StormMatch {
                storm_id: storm.id,
                storm_date: storm.storm_date,
                amplitude: storm.amplitude,
                distance,
            }))
        } else {
            trace!(
                fire = fire.id,
                storm = storm.id,
                distance_km = distance.value(),
                gap_hours = gap.num_hours(),
                "nearest storm outside match window"
            );
            Ok(None)
        }
    }
}
