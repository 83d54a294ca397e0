use clap::Subcommand;
use std::path::{Path, PathBuf};

use crate::config::{self, ConfigSource};

// ── CLI Schema ──

#[derive(Subcommand)]
pub enum ConfigCmd {
    /// Print the effective policy as YAML
    Show {
        /// Policy file (defaults to $BRAID_CONFIG or the user config dir)
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

// ── Dispatch ──

pub fn run(cmd: ConfigCmd) -> anyhow::Result<()> {
    match cmd {
        ConfigCmd::Show { config } => show(config.as_deref()),
    }
}

// ── Command Implementations ──

fn describe(source: &ConfigSource) -> String {
    match source {
        ConfigSource::File(path) => format!("# from {}", path.display()),
        ConfigSource::Defaults => "# built-in defaults".to_string(),
    }
}

/// `braid config show`
pub fn show(config_path: Option<&Path>) -> anyhow::Result<()> {
    let (cfg, source) = config::load(config_path)?;
    println!("{}", describe(&source));
    print!("{}", serde_yaml::to_string(&cfg)?);
    Ok(())
}
