use clap::{CommandFactory, Parser, Subcommand, ValueEnum, ValueHint};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "firestorm", author, version, about, long_about = None)]
pub struct Cli {
    /// Set the logging level
    #[arg(long, default_value = "info", global = true)]
    pub log_level: tracing::Level,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Attach the nearest qualifying storm to every fire
    Join {
        /// Fire observations (CSV, XLS or XLSX)
        #[arg(long, value_hint = ValueHint::FilePath)]
        fires: String,
        /// Lightning/storm observations (CSV, XLS or XLSX)
        #[arg(long, value_hint = ValueHint::FilePath)]
        storms: String,
        /// Output file path (CSV or Parquet)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        out: String,
        /// TOML file with match thresholds and column names
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<String>,
        /// Maximum geodesic distance in kilometres (overrides config)
        #[arg(long)]
        max_distance_km: Option<f64>,
        /// Maximum time gap in days, either direction (overrides config)
        #[arg(long)]
        max_time_days: Option<i64>,
        /// Worker threads for matching ("auto" or a number; 1 disables parallelism)
        #[arg(long, default_value = "auto")]
        threads: String,
    },
    /// Configuration helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
    /// Run management
    Runs {
        #[command(subcommand)]
        command: RunsCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Print the effective configuration as TOML
    Show {
        /// Optional TOML file to merge over the defaults
        #[arg(long, value_hint = ValueHint::FilePath)]
        config: Option<String>,
    },
}

#[derive(Subcommand, Debug)]
pub enum RunsCommands {
    /// List recorded joins with their match counts
    List {
        /// Root path to scan for run manifests
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Output format for the listing
        #[arg(long, value_enum, default_value_t = RunFormat::Plain)]
        format: RunFormat,
    },
    /// Show inputs, match window and outcome of one recorded join
    Describe {
        /// Manifest path, run id, or a unique run id prefix
        target: String,
        /// Root path where manifests are scanned (used when target is a run_id)
        #[arg(long, default_value = ".")]
        root: PathBuf,
        /// Output format for the description
        #[arg(long, value_enum, default_value_t = RunFormat::Plain)]
        format: RunFormat,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RunFormat {
    Plain,
    Json,
}

pub fn build_cli_command() -> clap::Command {
    Cli::command()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        build_cli_command().debug_assert();
    }

    #[test]
    fn join_overrides_parse() {
        let cli = Cli::try_parse_from([
            "firestorm",
            "join",
            "--fires",
            "f.csv",
            "--storms",
            "s.csv",
            "-o",
            "out.csv",
            "--max-distance-km",
            "25.5",
            "--max-time-days",
            "3",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Join {
                max_distance_km,
                max_time_days,
                threads,
                config,
                ..
            }) => {
                assert_eq!(max_distance_km, Some(25.5));
                assert_eq!(max_time_days, Some(3));
                assert_eq!(threads, "auto");
                assert_eq!(config, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
