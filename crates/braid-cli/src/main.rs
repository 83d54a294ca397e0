mod cmd_config;
mod cmd_explain;
mod cmd_reconcile;
mod config;
mod feed;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "braid",
    version,
    about = "Reconcile repository timelines reported by several providers"
)]
struct Cli {
    /// Log engine decisions (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Merge raw event feeds into one deduplicated timeline
    Reconcile {
        /// Feed files: `.json` arrays or JSON Lines (repeatable)
        #[arg(required = true)]
        feeds: Vec<PathBuf>,
        /// Policy file (YAML, or JSON with a .json extension)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Grouping strategy: anchor or transitive (overrides the policy)
        #[arg(long)]
        strategy: Option<braid_reconcile::GroupingStrategy>,
        /// Output format: summary, json, or jsonl
        #[arg(long, default_value = "summary")]
        format: cmd_reconcile::OutputFormat,
        /// Write output to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Report whether two raw events match, and by which rule
    Explain {
        /// Feed files containing both events
        #[arg(required = true)]
        feeds: Vec<PathBuf>,
        /// Id of the first event
        #[arg(long)]
        a: String,
        /// Id of the second event
        #[arg(long)]
        b: String,
        /// Policy file
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// Inspect the reconciliation policy
    Config {
        #[command(subcommand)]
        cmd: cmd_config::ConfigCmd,
    },
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let repo_root = std::env::current_dir()?;

    match cli.cmd {
        Command::Reconcile {
            feeds,
            config,
            strategy,
            format,
            out,
        } => cmd_reconcile::execute(cmd_reconcile::ReconcileParams {
            repo_root: &repo_root,
            feeds: &feeds,
            config: config.as_deref(),
            strategy,
            format,
            out: out.as_deref(),
        }),
        Command::Explain {
            feeds,
            a,
            b,
            config,
        } => cmd_explain::execute(&repo_root, &feeds, &a, &b, config.as_deref()),
        Command::Config { cmd } => cmd_config::run(cmd),
    }
}
