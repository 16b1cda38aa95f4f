use anyhow::Result;
use clap::Parser;
use sql_enumgen::config::{Config, DEFAULT_CONFIG_FILE};
use sql_enumgen::generator::{ArtifactWriter, DryRunWriter, FileSystemWriter};
use std::path::PathBuf;
use tracing::{error, info};

/// Generate Rust enums from database lookup tables
#[derive(Parser, Debug)]
#[command(name = "sqlenumgen", version, about)]
struct Cli {
    /// Configuration file (TOML or JSON)
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Override generator.target.directory
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Override generator.target.package
    #[arg(long)]
    package: Option<String>,

    /// Render everything but write nothing
    #[arg(long)]
    dry_run: bool,

    /// Log debug output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let cli = Cli::parse();

    // Credentials for SQL Server may come from a .env file
    dotenvy::dotenv().ok();

    let level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("sql_enumgen={level},sqlenumgen={level}").into()),
        )
        .with_target(false)
        .init();

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = Config::load(&cli.config)?;
    if let Some(dir) = cli.output_dir {
        config.generator.target.directory = dir;
    }
    if let Some(package) = cli.package {
        config.generator.target.package = package;
    }

    let writer: &dyn ArtifactWriter = if cli.dry_run {
        &DryRunWriter
    } else {
        &FileSystemWriter
    };
    let artifacts = sql_enumgen::run_with_writer(&config, writer)?;

    info!(count = artifacts.len(), "generation finished");
    Ok(())
}
