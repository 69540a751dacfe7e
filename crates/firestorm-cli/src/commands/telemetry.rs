use firestorm_cli::manifest::{record_manifest, ManifestTelemetry, Param};
use std::{env, path::Path, time::Instant};
use tracing::{info, warn};

const TELEMETRY_ENV_KEYS: &[&str] = &[
    "FIRESTORM_ENV",
    "FIRESTORM_CORRELATION_ID",
    "GITHUB_RUN_ID",
    "GITHUB_WORKFLOW",
    "GITHUB_SHA",
];

fn collect_telemetry_env() -> Vec<Param> {
    TELEMETRY_ENV_KEYS
        .iter()
        .filter_map(|key| {
            env::var(key).ok().map(|value| Param {
                name: key.to_string(),
                value,
            })
        })
        .collect()
}

/// Records a run manifest next to `out` with status and wall-clock duration.
///
/// Manifest failures are logged and never fail the command itself.
pub fn record_run_timed<T: serde::Serialize>(
    out: &str,
    command: &str,
    params: &[(&str, &str)],
    start: Instant,
    result: &anyhow::Result<T>,
) {
    let duration_ms = start.elapsed().as_millis();
    let (status, summary) = match result {
        Ok(value) => ("success", serde_json::to_value(value).ok()),
        Err(err) => ("failure", Some(serde_json::json!({ "error": format!("{err:#}") }))),
    };
    let telemetry = ManifestTelemetry {
        status: status.to_string(),
        duration_ms: Some(duration_ms),
        env: collect_telemetry_env(),
        summary,
    };
    match record_manifest(Path::new(out), command, params, telemetry) {
        Ok(path) => info!(path = %path.display(), "recorded run manifest"),
        Err(err) => warn!("failed to record run manifest: {err:#}"),
    }
}
