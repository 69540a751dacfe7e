use firestorm_core::{EnrichedFireRecord, FireRecord, FirestormResult, StormRecord};
#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, info, warn};

use crate::matcher::FireStormMatcher;
use crate::policy::MatchPolicy;

/// Top-level driver for the fire/storm join.
///
/// Holds only the validated [`MatchPolicy`]; the tables are passed to
/// [`run`](Self::run) so nothing outlives a single join.
///
/// **Failure mode:** abort-all. The first fire or storm that fails validation
/// ends the run with an error naming that record; no partial table is
/// returned.
#[derive(Debug, Clone, Copy)]
pub struct DatasetJoinPipeline {
    policy: MatchPolicy,
}

impl DatasetJoinPipeline {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> &MatchPolicy {
        &self.policy
    }

    /// Matches every fire in input order. Output length equals `fires.len()`.
    pub fn run(
        &self,
        fires: &[FireRecord],
        storms: &[StormRecord],
    ) -> FirestormResult<Vec<EnrichedFireRecord>> {
        let matcher = self.prepare(fires, storms)?;
        fires
            .iter()
            .map(|fire| enrich(&matcher, fire))
            .collect()
    }

    /// Same as [`run`](Self::run), with fires matched on the rayon pool.
    ///
    /// Results are collected in input order. When several fires are invalid
    /// the reported one is not necessarily the earliest.
    #[cfg(feature = "parallel")]
    pub fn run_parallel(
        &self,
        fires: &[FireRecord],
        storms: &[StormRecord],
    ) -> FirestormResult<Vec<EnrichedFireRecord>> {
        let matcher = self.prepare(fires, storms)?;
        fires
            .par_iter()
            .map(|fire| enrich(&matcher, fire))
            .collect()
    }

    fn prepare<'a>(
        &self,
        fires: &[FireRecord],
        storms: &'a [StormRecord],
    ) -> FirestormResult<FireStormMatcher<'a>> {
        if storms.is_empty() {
            warn!(
                fires = fires.len(),
                "storm table is empty; every fire will be left unmatched"
            );
        }
        let matcher = FireStormMatcher::new(storms, self.policy)?;
        info!(
            fires = fires.len(),
            storms = matcher.num_storms(),
            max_distance_km = self.policy.max_distance().value(),
            max_time_hours = self.policy.max_time_delta().num_hours(),
            "storm index built"
        );
        Ok(matcher)
    }
}

fn enrich(matcher: &FireStormMatcher<'_>, fire: &FireRecord) -> FirestormResult<EnrichedFireRecord> {
    let matched = matcher.match_fire(fire).inspect_err(|err| {
        debug!(fire = fire.id, error = %err, "fire failed validation");
    })?;
    Ok(EnrichedFireRecord::new(fire.clone(), matched))
}
