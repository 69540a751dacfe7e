use firestorm_core::EnrichedFireRecord;
use serde::{Deserialize, Serialize};

/// Counts reported after a join so callers can log how many fires found a storm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSummary {
    pub num_fires: usize,
    pub num_storms: usize,
    pub num_matched: usize,
    pub num_unmatched: usize,
    /// Mean distance over matched fires, in kilometres.
    pub mean_distance_km: Option<f64>,
}

impl JoinSummary {
    pub fn from_records(records: &[EnrichedFireRecord], num_storms: usize) -> Self {
        let distances: Vec<f64> = records.iter().filter_map(|r| r.distance_km()).collect();
        let num_matched = distances.len();
        let mean_distance_km = if distances.is_empty() {
            None
        } else {
            Some(distances.iter().sum::<f64>() / num_matched as f64)
        };
        Self {
            num_fires: records.len(),
            num_storms,
            num_matched,
            num_unmatched: records.len() - num_matched,
            mean_distance_km,
        }
    }
}
