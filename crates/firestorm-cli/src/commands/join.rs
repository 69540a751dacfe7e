use std::path::Path;
use std::time::Instant;

use anyhow::Result;
use firestorm_algo::{DatasetJoinPipeline, JoinSummary};
use firestorm_cli::{Commands, JoinConfig};
use firestorm_core::{Dataset, EnrichedFireRecord, FireRecord, FirestormResult, StormRecord};
use firestorm_io::{fires_from_table, storms_from_table, write_enriched, RawTable};
use tracing::info;

use crate::commands::telemetry::record_run_timed;
use crate::commands::util::configure_threads;

/// Handle `firestorm join`: attach the nearest qualifying storm to every fire.
///
/// **Algorithm:**
/// 1. Resolve thresholds (config file, then flags) into a validated policy.
///    Bad thresholds fail here, before any input is read.
/// 2. Read both tables (CSV, or the first sheet of an Excel workbook) and
///    build typed records. Any unusable cell aborts the run with the table,
///    row and column in the error.
/// 3. Build an R-tree over storm coordinates and match each fire against its
///    planar-nearest storm, accepting it only within the geodesic distance and
///    time window.
/// 4. Write the fire table with `nearest_storm_date`, `storm_amplitude` and
///    `distance_to_storm` appended (empty when unmatched).
///
/// A run manifest is written next to the output whether the join succeeds or not.
pub fn handle(command: &Commands) -> Result<()> {
    let Commands::Join {
        fires,
        storms,
        out,
        config,
        max_distance_km,
        max_time_days,
        threads,
    } = command
    else {
        unreachable!();
    };

    let start = Instant::now();
    let mut effective = (String::new(), String::new());

    let res = (|| -> Result<JoinSummary> {
        let cfg = JoinConfig::load_or_default(config.as_deref().map(Path::new))?
            .with_overrides(*max_distance_km, *max_time_days);
        let policy = cfg.policy()?;
        effective = (
            cfg.matching.max_distance_km.to_string(),
            cfg.matching.max_time_delta_days.to_string(),
        );

        let workers = configure_threads(threads);

        let fire_table = RawTable::read(Path::new(fires), Dataset::Fires)?;
        let storm_table = RawTable::read(Path::new(storms), Dataset::Storms)?;
        let fire_records = fires_from_table(&fire_table, &cfg.columns)?;
        let storm_records = storms_from_table(&storm_table, &cfg.columns)?;
        info!(
            fires = fire_records.len(),
            storms = storm_records.len(),
            workers,
            "inputs loaded"
        );

        let pipeline = DatasetJoinPipeline::new(policy);
        let records = run_pipeline(&pipeline, &fire_records, &storm_records, workers)?;
        write_enriched(&fire_table, &records, Path::new(out))?;

        let summary = JoinSummary::from_records(&records, storm_records.len());
        println!(
            "Fire/storm join completed: {} fires × {} storms (≤ {} km, ≤ {} days)",
            summary.num_fires,
            summary.num_storms,
            cfg.matching.max_distance_km,
            cfg.matching.max_time_delta_days
        );
        println!(
            "  Matched: {} fires, Unmatched: {} fires",
            summary.num_matched, summary.num_unmatched
        );
        if let Some(mean) = summary.mean_distance_km {
            println!("  Mean match distance: {mean:.3} km");
        }
        println!("  Output: {}", out);
        Ok(summary)
    })();

    let params = [
        ("fires", fires.as_str()),
        ("storms", storms.as_str()),
        ("out", out.as_str()),
        ("config", config.as_deref().unwrap_or("")),
        ("max_distance_km", effective.0.as_str()),
        ("max_time_days", effective.1.as_str()),
        ("threads", threads.as_str()),
    ];
    record_run_timed(out, "join", &params, start, &res);
    res.map(|_| ())
}

fn run_pipeline(
    pipeline: &DatasetJoinPipeline,
    fires: &[FireRecord],
    storms: &[StormRecord],
    workers: usize,
) -> FirestormResult<Vec<EnrichedFireRecord>> {
    #[cfg(feature = "parallel")]
    if workers > 1 {
        return pipeline.run_parallel(fires, storms);
    }
    #[cfg(not(feature = "parallel"))]
    let _ = workers;
    pipeline.run(fires, storms)
}
