use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct ManifestEntry {
    pub run_id: String,
    pub command: String,
    pub version: String,
    pub timestamp: String,
    pub outputs: Vec<String>,
    pub params: Vec<Param>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub duration_ms: Option<u128>,
    #[serde(default)]
    pub env: Vec<Param>,
    #[serde(default)]
    pub summary: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Param {
    pub name: String,
    pub value: String,
}

/// Run metadata captured after the command finishes.
#[derive(Debug, Default)]
pub struct ManifestTelemetry {
    pub status: String,
    pub duration_ms: Option<u128>,
    pub env: Vec<Param>,
    pub summary: Option<serde_json::Value>,
}

/// Writes `run-<uuid>.json` next to `output` and returns its path.
pub fn record_manifest(
    output: &Path,
    command: &str,
    params: &[(&str, &str)],
    telemetry: ManifestTelemetry,
) -> Result<std::path::PathBuf> {
    let run_id = Uuid::new_v4().to_string();
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    fs::create_dir_all(&dir)?;
    let manifest = ManifestEntry {
        run_id: run_id.clone(),
        command: command.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now().to_rfc3339(),
        outputs: vec![output.display().to_string()],
        params: params
            .iter()
            .map(|(k, v)| Param {
                name: k.to_string(),
                value: v.to_string(),
            })
            .collect(),
        status: Some(telemetry.status),
        duration_ms: telemetry.duration_ms,
        env: telemetry.env,
        summary: telemetry.summary,
    };
    let json = serde_json::to_string_pretty(&manifest)?;
    let path = dir.join(format!("run-{}.json", run_id));
    fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

pub fn read_manifest(path: &Path) -> Result<ManifestEntry> {
    let json = fs::read_to_string(path)?;
    let manifest = serde_json::from_str(&json)?;
    Ok(manifest)
}
