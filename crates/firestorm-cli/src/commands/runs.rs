//! `firestorm runs`: browse the manifests that `firestorm join` leaves next
//! to its outputs.
//!
//! Each manifest is decoded back into a [`JoinRun`]: the inputs, the match
//! window that was in effect, and either the match counts or the error the
//! run stopped on.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use firestorm_algo::JoinSummary;
use firestorm_cli::manifest::{read_manifest, ManifestEntry};
use firestorm_cli::{RunFormat, RunsCommands};
use serde::Serialize;
use tabwriter::TabWriter;
use tracing::warn;
use walkdir::WalkDir;

/// How a recorded join ended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum JoinOutcome {
    Completed(JoinSummary),
    Failed { error: String },
    /// Manifest has no readable summary (older or hand-edited file).
    Unknown,
}

/// One recorded `firestorm join`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JoinRun {
    pub run_id: String,
    pub timestamp: String,
    pub duration_ms: Option<u128>,
    pub fires: Option<String>,
    pub storms: Option<String>,
    pub output: Option<String>,
    pub max_distance_km: Option<String>,
    pub max_time_days: Option<String>,
    pub manifest_path: PathBuf,
    #[serde(flatten)]
    pub outcome: JoinOutcome,
}

impl JoinRun {
    pub fn from_manifest(manifest: ManifestEntry, manifest_path: PathBuf) -> Self {
        let param = |name: &str| {
            manifest
                .params
                .iter()
                .find(|p| p.name == name && !p.value.is_empty())
                .map(|p| p.value.clone())
        };
        let outcome = match (manifest.status.as_deref(), manifest.summary.clone()) {
            (Some("success"), Some(summary)) => serde_json::from_value(summary)
                .map(JoinOutcome::Completed)
                .unwrap_or(JoinOutcome::Unknown),
            (Some("failure"), Some(summary)) => match summary.get("error").and_then(|e| e.as_str()) {
                Some(error) => JoinOutcome::Failed {
                    error: error.to_string(),
                },
                None => JoinOutcome::Unknown,
            },
            _ => JoinOutcome::Unknown,
        };
        Self {
            fires: param("fires"),
            storms: param("storms"),
            output: param("out").or_else(|| manifest.outputs.first().cloned()),
            max_distance_km: param("max_distance_km"),
            max_time_days: param("max_time_days"),
            run_id: manifest.run_id,
            timestamp: manifest.timestamp,
            duration_ms: manifest.duration_ms,
            manifest_path,
            outcome,
        }
    }

    pub fn status(&self) -> &'static str {
        match self.outcome {
            JoinOutcome::Completed(_) => "ok",
            JoinOutcome::Failed { .. } => "failed",
            JoinOutcome::Unknown => "?",
        }
    }

    /// Match window as `≤50 km / ±5 d`, or `-` when not recorded.
    pub fn window(&self) -> String {
        match (&self.max_distance_km, &self.max_time_days) {
            (Some(km), Some(days)) => format!("≤{km} km / ±{days} d"),
            _ => "-".to_string(),
        }
    }
}

fn is_join_manifest(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with("run-") && name.ends_with(".json"))
}

fn load_join(path: &Path) -> Result<Option<JoinRun>> {
    let manifest =
        read_manifest(path).with_context(|| format!("reading manifest {}", path.display()))?;
    if manifest.command != "join" {
        return Ok(None);
    }
    Ok(Some(JoinRun::from_manifest(manifest, path.to_path_buf())))
}

/// Recorded joins under `root`, oldest first.
///
/// Unreadable manifests are skipped with a warning so one bad file does not
/// hide the rest.
pub fn scan_runs(root: &Path) -> Result<Vec<JoinRun>> {
    if !root.exists() {
        bail!("run root {} does not exist", root.display());
    }
    let mut runs = Vec::new();
    let walker = WalkDir::new(root).into_iter().filter_entry(|entry| {
        entry.depth() == 0
            || !entry.file_type().is_dir()
            || !entry.file_name().to_string_lossy().starts_with('.')
    });
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_join_manifest(entry.path()) {
            continue;
        }
        match load_join(entry.path()) {
            Ok(Some(run)) => runs.push(run),
            Ok(None) => {}
            Err(err) => warn!("skipping {}: {err:#}", entry.path().display()),
        }
    }
    runs.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
    Ok(runs)
}

/// Resolves a manifest path, or a run id (or unique run id prefix) under `root`.
pub fn find_run(root: &Path, target: &str) -> Result<JoinRun> {
    if target.is_empty() {
        bail!("run id or manifest path cannot be empty");
    }
    let path = Path::new(target);
    if path.is_file() {
        return load_join(path)?
            .with_context(|| format!("{} is not a join manifest", path.display()));
    }

    let mut hits: Vec<JoinRun> = scan_runs(root)?
        .into_iter()
        .filter(|run| run.run_id.starts_with(target))
        .collect();
    match hits.len() {
        0 => bail!("no join run matching '{target}' under {}", root.display()),
        1 => Ok(hits.remove(0)),
        n => bail!("run id prefix '{target}' is ambiguous ({n} runs); use more characters"),
    }
}

pub fn write_table<W: Write>(runs: &[JoinRun], out: W) -> Result<()> {
    let mut tw = TabWriter::new(out);
    writeln!(tw, "RUN\tSTATUS\tWHEN\tMATCHED\tUNMATCHED\tWINDOW\tOUTPUT")?;
    for run in runs {
        let (matched, unmatched) = match &run.outcome {
            JoinOutcome::Completed(s) => (s.num_matched.to_string(), s.num_unmatched.to_string()),
            _ => ("-".to_string(), "-".to_string()),
        };
        writeln!(
            tw,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            short_id(&run.run_id),
            run.status(),
            run.timestamp,
            matched,
            unmatched,
            run.window(),
            run.output.as_deref().unwrap_or("-"),
        )?;
    }
    tw.flush()?;
    Ok(())
}

pub fn write_description<W: Write>(run: &JoinRun, mut out: W) -> Result<()> {
    writeln!(out, "Join run {} ({})", run.run_id, run.status())?;
    writeln!(out, "  Recorded: {}", run.timestamp)?;
    if let Some(ms) = run.duration_ms {
        writeln!(out, "  Duration: {ms} ms")?;
    }
    writeln!(out, "  Fires:    {}", run.fires.as_deref().unwrap_or("-"))?;
    writeln!(out, "  Storms:   {}", run.storms.as_deref().unwrap_or("-"))?;
    writeln!(out, "  Output:   {}", run.output.as_deref().unwrap_or("-"))?;
    writeln!(out, "  Window:   {}", run.window())?;
    match &run.outcome {
        JoinOutcome::Completed(summary) => {
            writeln!(
                out,
                "  Matched: {} of {} fires against {} storms",
                summary.num_matched, summary.num_fires, summary.num_storms
            )?;
            if let Some(mean) = summary.mean_distance_km {
                writeln!(out, "  Mean match distance: {mean:.3} km")?;
            }
        }
        JoinOutcome::Failed { error } => writeln!(out, "  Error: {error}")?,
        JoinOutcome::Unknown => writeln!(out, "  No summary recorded")?,
    }
    writeln!(out, "  Manifest: {}", run.manifest_path.display())?;
    Ok(())
}

fn short_id(run_id: &str) -> &str {
    run_id.get(..8).unwrap_or(run_id)
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    serde_json::to_writer_pretty(io::stdout(), value).context("serializing to JSON")?;
    println!();
    Ok(())
}

pub fn handle(command: &RunsCommands) -> Result<()> {
    match command {
        RunsCommands::List { root, format } => {
            let runs = scan_runs(root)?;
            match format {
                RunFormat::Plain => write_table(&runs, io::stdout()),
                RunFormat::Json => print_json(&runs),
            }
        }
        RunsCommands::Describe {
            target,
            root,
            format,
        } => {
            let run = find_run(root, target)?;
            match format {
                RunFormat::Plain => write_description(&run, io::stdout()),
                RunFormat::Json => print_json(&run),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use firestorm_cli::manifest::{record_manifest, ManifestTelemetry};
    use std::fs;
    use tempfile::tempdir;

    fn record(dir: &Path, status: &str, summary: serde_json::Value) -> PathBuf {
        record_manifest(
            &dir.join("fires_with_storms.csv"),
            "join",
            &[
                ("fires", "fires.xls"),
                ("storms", "storms.csv"),
                ("out", "fires_with_storms.csv"),
                ("config", ""),
                ("max_distance_km", "50"),
                ("max_time_days", "5"),
            ],
            ManifestTelemetry {
                status: status.into(),
                duration_ms: Some(40),
                summary: Some(summary),
                ..Default::default()
            },
        )
        .unwrap()
    }

    fn completed() -> serde_json::Value {
        serde_json::json!({
            "num_fires": 10,
            "num_storms": 4,
            "num_matched": 3,
            "num_unmatched": 7,
            "mean_distance_km": 12.5
        })
    }

    #[test]
    fn completed_run_carries_summary_and_window() {
        let dir = tempdir().unwrap();
        let path = record(dir.path(), "success", completed());
        let run = find_run(dir.path(), path.to_str().unwrap()).unwrap();
        assert_eq!(run.status(), "ok");
        assert_eq!(run.window(), "≤50 km / ±5 d");
        assert_eq!(run.fires.as_deref(), Some("fires.xls"));
        match &run.outcome {
            JoinOutcome::Completed(summary) => {
                assert_eq!(summary.num_matched, 3);
                assert_eq!(summary.mean_distance_km, Some(12.5));
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn failed_run_keeps_error() {
        let dir = tempdir().unwrap();
        record(
            dir.path(),
            "failure",
            serde_json::json!({ "error": "Validation error in storms record 3: field 'dt': 'x' is not a date" }),
        );
        let runs = scan_runs(dir.path()).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status(), "failed");

        let mut text = Vec::new();
        write_description(&runs[0], &mut text).unwrap();
        let text = String::from_utf8(text).unwrap();
        assert!(text.contains("Error: Validation error in storms record 3"));
        assert!(text.contains("Fires:    fires.xls"));
    }

    #[test]
    fn run_id_prefix_resolves() {
        let dir = tempdir().unwrap();
        record(dir.path(), "success", completed());
        let id = scan_runs(dir.path()).unwrap()[0].run_id.clone();
        let run = find_run(dir.path(), &id[..6]).unwrap();
        assert_eq!(run.run_id, id);
        assert!(find_run(dir.path(), "zzzz").is_err());
    }

    #[test]
    fn other_commands_and_broken_files_are_skipped() {
        let dir = tempdir().unwrap();
        record(dir.path(), "success", completed());
        record_manifest(
            &dir.path().join("x.csv"),
            "config",
            &[],
            ManifestTelemetry::default(),
        )
        .unwrap();
        fs::write(dir.path().join("run-broken.json"), "{ not json").unwrap();

        let runs = scan_runs(dir.path()).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].status(), "ok");
    }

    #[test]
    fn table_lists_counts() {
        let dir = tempdir().unwrap();
        record(dir.path(), "success", completed());
        let runs = scan_runs(dir.path()).unwrap();

        let mut text = Vec::new();
        write_table(&runs, &mut text).unwrap();
        let text = String::from_utf8(text).unwrap();
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("RUN"));
        let row = lines.next().unwrap();
        assert!(row.starts_with(&runs[0].run_id[..8]));
        assert!(row.contains(" 3 "));
        assert!(row.contains(" 7 "));
        assert!(row.contains("≤50 km / ±5 d"));
    }
}
