use clap::Parser;
use firestorm_cli::{build_cli_command, Cli, Commands};
use std::io;
use tracing::{debug, error};
use tracing_subscriber::FmtSubscriber;

mod commands;

fn main() {
    let cli = Cli::parse();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(cli.log_level)
        .with_writer(io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    debug!("firestorm v{}", env!("CARGO_PKG_VERSION"));

    let result = match &cli.command {
        Some(command @ Commands::Join { .. }) => commands::join::handle(command),
        Some(Commands::Config { command }) => commands::config::handle(command),
        Some(Commands::Runs { command }) => commands::runs::handle(command),
        None => build_cli_command()
            .print_help()
            .map_err(anyhow::Error::from),
    };

    if let Err(err) = result {
        error!("{err:#}");
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}
