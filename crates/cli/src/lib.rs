pub mod commands;
pub mod export;
pub mod ingest;
pub mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bomcheck_core::config::{AppConfig, LoadOptions, LoggingConfig};
use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "bomcheck",
    about = "BOM explosion and reconciliation CLI",
    long_about = "Explode a Teamcenter BOM export into a flattened parts-requirement list \
                  and reconcile it against an externally sourced quantity list.",
    after_help = "Examples:\n  bomcheck explode bom.csv --out bestellijst.csv\n  \
                  bomcheck trace bom.csv --item 123456\n  \
                  bomcheck compare bom.csv d365.csv --json"
)]
pub struct Cli {
    #[arg(long, global = true, help = "Path to a bomcheck.toml config file")]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Explode a BOM export into the flattened parts list")]
    Explode {
        #[arg(help = "Teamcenter BOM export, `(#)`-delimited CSV")]
        bom: PathBuf,
        #[arg(long, help = "Write the parts list to this CSV file")]
        out: Option<PathBuf>,
        #[arg(long, help = "Write the length-item list to this CSV file")]
        lengths_out: Option<PathBuf>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Show the derivation paths behind one leaf item's total")]
    Trace {
        #[arg(help = "Teamcenter BOM export, `(#)`-delimited CSV")]
        bom: PathBuf,
        #[arg(long, help = "Leaf item identifier to trace")]
        item: String,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
    #[command(about = "Reconcile the computed parts list against a target quantity list")]
    Compare {
        #[arg(help = "Teamcenter BOM export, `(#)`-delimited CSV")]
        bom: PathBuf,
        #[arg(help = "Target quantity list, plain CSV")]
        target: PathBuf,
        #[arg(long, help = "Write the comparison report to this CSV file")]
        out: Option<PathBuf>,
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

/// Logging settings for the subscriber, honoring `--config` the same way
/// the commands do. A broken config falls back to defaults here; the
/// command itself reports the failure through its envelope.
fn logging_settings(config_path: Option<&Path>) -> LoggingConfig {
    AppConfig::load(LoadOptions {
        config_path: config_path.map(Path::to_path_buf),
        ..LoadOptions::default()
    })
    .map(|config| config.logging)
    .unwrap_or_else(|_| AppConfig::default().logging)
}

fn init_logging(settings: &LoggingConfig) {
    use bomcheck_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = settings.level.parse::<Level>().unwrap_or(Level::INFO);

    match settings.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let config = cli.config.as_deref();
    init_logging(&logging_settings(config));

    let result = match &cli.command {
        Command::Explode { bom, out, lengths_out, json } => {
            commands::explode::run(bom, out.as_deref(), lengths_out.as_deref(), *json, config)
        }
        Command::Trace { bom, item, json } => commands::trace::run(bom, item, *json, config),
        Command::Compare { bom, target, out, json } => {
            commands::compare::run(bom, target, out.as_deref(), *json, config)
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}
