use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const FIRES: &str = "\
lat,lon,дата первого наблюдения,region
55.7500,37.6200,2021-07-10,moscow
60.0000,100.0000,2021-07-10,evenkia
";

const STORMS: &str = "\
lat,lon,dt,amplitude
55.7510,37.6210,2021-07-09 14:30:00,-12.5
10.0000,10.0000,2021-07-10 00:00:00,3.0
";

fn write_inputs(dir: &Path) -> (String, String) {
    let fires = dir.join("fires.csv");
    let storms = dir.join("storms.csv");
    fs::write(&fires, FIRES).unwrap();
    fs::write(&storms, STORMS).unwrap();
    (
        fires.display().to_string(),
        storms.display().to_string(),
    )
}

fn firestorm() -> Command {
    Command::cargo_bin("firestorm").unwrap()
}

#[test]
fn join_appends_match_columns() {
    let dir = tempdir().unwrap();
    let (fires, storms) = write_inputs(dir.path());
    let out = dir.path().join("fires_with_storms.csv");

    firestorm()
        .args(["join", "--fires", fires.as_str(), "--storms", storms.as_str(), "-o"])
        .arg(&out)
        .args(["--threads", "1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fire/storm join completed"))
        .stdout(predicate::str::contains("Matched: 1 fires, Unmatched: 1 fires"));

    let written = fs::read_to_string(&out).unwrap();
    let mut lines = written.lines();
    let header = lines.next().unwrap();
    assert!(header.ends_with("nearest_storm_date,storm_amplitude,distance_to_storm"));
    assert!(header.contains("region"));

    let matched = lines.next().unwrap();
    assert!(matched.contains("2021-07-09 14:30:00"));
    assert!(matched.contains("-12.5"));
    let unmatched = lines.next().unwrap();
    assert!(unmatched.ends_with("evenkia,,,"));
    assert!(lines.next().is_none());

    assert_eq!(manifest_paths(dir.path()).len(), 1);
    assert!(!dir.path().join("join").exists());
}

#[test]
fn invalid_threshold_fails_before_reading_inputs() {
    let dir = tempdir().unwrap();
    let out = dir.path().join("out.csv");

    firestorm()
        .args([
            "join",
            "--fires",
            "does-not-exist.csv",
            "--storms",
            "does-not-exist.csv",
            "--max-distance-km",
            "0",
            "-o",
        ])
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Configuration error"));
    assert!(!out.exists());
}

#[test]
fn bad_cell_names_dataset_record_and_field() {
    let dir = tempdir().unwrap();
    let (fires, _) = write_inputs(dir.path());
    let storms = dir.path().join("bad_storms.csv");
    fs::write(
        &storms,
        "lat,lon,dt,amplitude\n55.0,37.0,2021-07-09,1.0\n55.0,37.0,yesterday,1.0\n",
    )
    .unwrap();
    let out = dir.path().join("out.csv");

    firestorm()
        .args(["join", "--fires", fires.as_str(), "--storms"])
        .arg(&storms)
        .arg("-o")
        .arg(&out)
        .assert()
        .failure()
        .stderr(predicate::str::contains("storms record 1"))
        .stderr(predicate::str::contains("field 'dt'"));
    assert!(!out.exists());
}

#[test]
fn config_show_prints_defaults() {
    firestorm()
        .args(["config", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[match]"))
        .stdout(predicate::str::contains("max_distance_km = 50.0"))
        .stdout(predicate::str::contains("max_time_delta_days = 5"));
}

#[test]
fn config_file_thresholds_apply() {
    let dir = tempdir().unwrap();
    let (fires, storms) = write_inputs(dir.path());
    let config = dir.path().join("firestorm.toml");
    fs::write(&config, "[match]\nmax_distance_km = 0.05\n").unwrap();
    let out = dir.path().join("out.csv");

    firestorm()
        .args(["join", "--fires", fires.as_str(), "--storms", storms.as_str(), "--config"])
        .arg(&config)
        .arg("-o")
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("Matched: 0 fires, Unmatched: 2 fires"));
}

fn manifest_paths(dir: &Path) -> Vec<std::path::PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .unwrap()
                .to_string_lossy()
                .starts_with("run-")
        })
        .collect()
}

fn join_once(dir: &Path) -> std::path::PathBuf {
    let (fires, storms) = write_inputs(dir);
    firestorm()
        .args(["join", "--fires", fires.as_str(), "--storms", storms.as_str(), "-o"])
        .arg(dir.join("joined.csv"))
        .assert()
        .success();
    let manifests = manifest_paths(dir);
    assert_eq!(manifests.len(), 1);
    manifests[0].clone()
}

#[test]
fn runs_list_shows_match_counts() {
    let dir = tempdir().unwrap();
    join_once(dir.path());

    firestorm()
        .args(["runs", "list", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("MATCHED"))
        .stdout(predicate::str::contains("ok"))
        .stdout(predicate::str::contains("≤50 km / ±5 d"));

    firestorm()
        .args(["runs", "list", "--format", "json", "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("\"outcome\": \"completed\""))
        .stdout(predicate::str::contains("\"num_matched\": 1"));
}

#[test]
fn runs_describe_by_id_and_by_path() {
    let dir = tempdir().unwrap();
    let manifest = join_once(dir.path());
    let stem = manifest.file_stem().unwrap().to_string_lossy().to_string();
    let run_id = stem.trim_start_matches("run-").to_string();

    firestorm()
        .args(["runs", "describe", run_id.as_str(), "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("Join run {run_id} (ok)")))
        .stdout(predicate::str::contains("Matched: 1 of 2 fires against 2 storms"));

    firestorm()
        .args(["runs", "describe", &run_id[..8], "--root"])
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains(run_id.as_str()));

    firestorm()
        .args(["runs", "describe", "--format", "json"])
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains(format!("\"run_id\": \"{run_id}\"")));
}

#[test]
fn runs_describe_reports_failed_join() {
    let dir = tempdir().unwrap();
    let (fires, _) = write_inputs(dir.path());
    firestorm()
        .args(["join", "--fires", fires.as_str(), "--storms", "missing.csv", "-o"])
        .arg(dir.path().join("joined.csv"))
        .assert()
        .failure();
    let manifest = manifest_paths(dir.path()).remove(0);

    firestorm()
        .args(["runs", "describe"])
        .arg(&manifest)
        .assert()
        .success()
        .stdout(predicate::str::contains("(failed)"))
        .stdout(predicate::str::contains("Error:"))
        .stdout(predicate::str::contains("missing.csv"));
}

#[test]
fn runs_describe_unknown_id_fails() {
    let dir = tempdir().unwrap();
    join_once(dir.path());

    firestorm()
        .args(["runs", "describe", "ffffffff-nope", "--root"])
        .arg(dir.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("no join run matching 'ffffffff-nope'"));
}

#[test]
fn join_reads_fire_workbook() {
    let dir = tempdir().unwrap();
    let (_, storms) = write_inputs(dir.path());
    let workbook = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../firestorm-io/tests/data/fires.xlsx");
    let out = dir.path().join("fires_with_storms.csv");

    firestorm()
        .arg("join")
        .arg("--fires")
        .arg(&workbook)
        .args(["--storms", storms.as_str(), "--max-distance-km", "100", "-o"])
        .arg(&out)
        .assert()
        .success()
        .stdout(predicate::str::contains("3 fires"))
        .stdout(predicate::str::contains("Matched: 1 fires, Unmatched: 2 fires"));

    let written = fs::read_to_string(&out).unwrap();
    assert!(written.starts_with("номер,lat,lon,дата первого наблюдения,nearest_storm_date"));
    // ~93 km from the Moscow storm, 9.5 hours apart
    assert!(written.contains("\n101,55,37,2021-07-10 00:00:00,2021-07-09 14:30:00,-12.5,"));
    assert!(written.contains("\n102,55,37,2021-07-01 00:00:00,,,"));
}
