use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use arclog_core::{AnalysisSession, load_config, parse_log_file};
use arclog_types::AnalysisConfig;

/// Analyze a combat log and print the report as JSON.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Path to the combat log file
    path: PathBuf,

    /// TOML config overriding the built-in encounter defaults
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Pretty-print the JSON report
    #[arg(long)]
    pretty: bool,
}

fn main() -> Result<(), String> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path).map_err(|e| e.to_string())?,
        None => AnalysisConfig::default(),
    };

    let events = parse_log_file(&cli.path, &config.profile).map_err(|e| e.to_string())?;
    tracing::debug!(events = events.len(), "log parsed");

    let mut session = AnalysisSession::new(config);
    for event in &events {
        session.process_event(event);
    }
    let report = session.finish();

    let json = if cli.pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .map_err(|e| e.to_string())?;
    println!("{json}");

    Ok(())
}
