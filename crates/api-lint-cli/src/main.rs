//! api-lint CLI tool.
//!
//! Usage:
//! ```bash
//! api-lint check [OPTIONS] <DESCRIPTOR.json>...
//! api-lint list-rules
//! api-lint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Linter for API schemas following the AIP guidelines
#[derive(Parser)]
#[command(name = "api-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "API_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lint descriptor files
    Check {
        /// Descriptor files (JSON) to lint
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,

        /// Disable a rule or rule group (can be specified multiple times)
        #[arg(long = "disable-rule", value_name = "RULE")]
        disable_rules: Vec<String>,

        /// Number of worker threads (0 = all cores, 1 = sequential)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// List available rules
    ListRules,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for lint results.
#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable diagnostics.
    #[default]
    Text,
    /// JSON output.
    Json,
    /// One-line-per-problem compact format.
    Compact,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Check {
            files,
            format,
            disable_rules,
            jobs,
        } => {
            let source = config_resolver::resolve(&std::env::current_dir()?, cli.config.as_deref());
            let found = commands::check::run(&files, format, &disable_rules, jobs, &source)?;
            if found {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::ListRules => commands::list_rules::run(),
        Commands::Init { force } => commands::init::run(force),
    }
}
