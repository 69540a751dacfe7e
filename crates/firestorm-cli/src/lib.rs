pub mod cli;
pub mod config;
pub mod manifest;

pub use cli::{build_cli_command, Cli, Commands, ConfigCommands, RunFormat, RunsCommands};
pub use config::{JoinConfig, MatchConfig};
