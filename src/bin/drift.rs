//! Catalog Drift Detection CLI
//!
//! Compares the structural schema of target databases against a source.
//!
//! Usage:
//!   catalog-drift compare --config drift.toml
//!   catalog-drift compare-files staging.json prod.json --format json
//!   catalog-drift ping
//!   catalog-drift dump --profile production --output prod.json
//!   catalog-drift init-config drift.toml

use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use catalog_drift::{
    report, CatalogReader, ComparisonEngine, ComparisonResult, DriftConfig, MysqlReader,
    ReportFormat,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Exit code when drift is found and `--fail-on-drift` is set
const EXIT_DRIFT: i32 = 2;

#[derive(Parser)]
#[command(name = "catalog-drift")]
#[command(about = "Detect structural schema drift between a source database and its targets")]
struct Cli {
    /// Configuration file (defaults: drift.toml, .drift.toml, config/drift.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compare the configured source against every configured target
    Compare {
        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<ReportFormat>,

        /// Exit with status 2 when any drift is found
        #[arg(long)]
        fail_on_drift: bool,
    },

    /// Compare offline catalog dumps; the first file is the source
    CompareFiles {
        source: PathBuf,

        #[arg(required = true)]
        targets: Vec<PathBuf>,

        /// Output format (text, json)
        #[arg(short, long)]
        format: Option<ReportFormat>,

        /// Exit with status 2 when any drift is found
        #[arg(long)]
        fail_on_drift: bool,
    },

    /// Check that the source and every target are reachable
    Ping,

    /// Write the catalog of one configured database to a JSON dump
    Dump {
        /// Name of the profile to dump (source or target)
        #[arg(short, long)]
        profile: String,

        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write a starter configuration file
    InitConfig {
        #[arg(default_value = "drift.toml")]
        path: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<i32> {
    match cli.command {
        Commands::InitConfig { path } => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            DriftConfig::example()
                .save(&path)
                .with_context(|| format!("writing {}", path.display()))?;
            eprintln!("Wrote starter configuration to {}", path.display());
            Ok(0)
        }

        Commands::CompareFiles {
            source,
            targets,
            format,
            fail_on_drift,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let mut reader = CatalogReader::new();
            let request = reader
                .load_files(&source, &targets)
                .context("loading catalog dumps")?;

            let engine = ComparisonEngine::new(reader);
            let result = engine.compare_request(&request).await?;
            emit(&result, &config, format, fail_on_drift)
        }

        Commands::Compare {
            format,
            fail_on_drift,
        } => {
            let config = load_config(cli.config.as_deref())?;
            let engine = ComparisonEngine::new(MysqlReader::new(config.reader.clone()));
            let outcome = engine.compare_request(&config.request()).await;
            engine.reader().close().await;
            emit(&outcome?, &config, format, fail_on_drift)
        }

        Commands::Ping => {
            let config = load_config(cli.config.as_deref())?;
            let profiles = config.profiles();
            if profiles.is_empty() {
                bail!("no connections configured");
            }

            let engine = ComparisonEngine::new(MysqlReader::new(config.reader.clone()));
            let outcomes = engine.ping(&profiles).await;
            engine.reader().close().await;

            let mut failures = 0;
            for outcome in &outcomes {
                match &outcome.error {
                    None => println!("ok      {}", outcome.label),
                    Some(e) => {
                        failures += 1;
                        println!("FAILED  {}: {}", outcome.label, e);
                    }
                }
            }
            Ok(if failures == 0 { 0 } else { 1 })
        }

        Commands::Dump { profile, output } => {
            let config = load_config(cli.config.as_deref())?;
            let selected = config
                .profiles()
                .into_iter()
                .find(|p| p.label() == profile)
                .with_context(|| format!("no configured connection named '{}'", profile))?;

            let reader = MysqlReader::new(config.reader.clone());
            let dump = reader.dump(&selected).await;
            reader.close().await;
            let dump = dump?;
            dump.save(&output)
                .with_context(|| format!("writing {}", output.display()))?;
            eprintln!(
                "Wrote {} tables of {} to {}",
                dump.tables.len(),
                dump.database,
                output.display()
            );
            Ok(0)
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<DriftConfig> {
    DriftConfig::load_from(path).context("loading configuration")
}

fn emit(
    result: &ComparisonResult,
    config: &DriftConfig,
    format: Option<ReportFormat>,
    fail_on_drift: bool,
) -> anyhow::Result<i32> {
    let format = format.unwrap_or(config.output.format);
    println!("{}", report::render(result, format, config.output.pretty)?);

    if format == ReportFormat::Text {
        eprintln!("Fingerprint: {}", result.fingerprint()?.short());
    }

    if fail_on_drift && !result.is_clean() {
        Ok(EXIT_DRIFT)
    } else {
        Ok(0)
    }
}
