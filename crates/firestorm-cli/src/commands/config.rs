use std::path::Path;

use anyhow::{Context, Result};
use firestorm_cli::{ConfigCommands, JoinConfig};

/// Handle `firestorm config show`: print the defaults merged with an optional file.
pub fn handle(command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show { config } => {
            let cfg = JoinConfig::load_or_default(config.as_deref().map(Path::new))?;
            cfg.policy()?;
            let text = cfg.to_toml().context("serializing configuration")?;
            print!("{text}");
            Ok(())
        }
    }
}
