pub mod algorithm;
pub mod commands;
pub mod engine;
pub mod models;
pub mod telemetry;

use std::path::PathBuf;

use clap::Parser;

pub use engine::TouchEngine;
pub use models::config::EngineConfig;
pub use models::events::{CursorUpdate, CursorUpdateKind, TouchPhase, TouchSample};

use commands::replay::{self, ReplayError};

/// Replays a recorded touch trace and prints the cursor updates as JSON.
#[derive(Debug, PartialEq, Parser)]
#[command(name = "touchflow-replay")]
#[command(about = "Replay a touch trace through the touchflow engine")]
struct CliArgs {
    /// Trace file (trace.json).
    trace: PathBuf,
    /// Engine config that overrides the trace's own config.
    #[arg(long)]
    config: Option<PathBuf>,
}

/// `--config` beats the trace's own config, which beats the user config file.
fn execute(args: &CliArgs) -> Result<String, ReplayError> {
    let mut trace = replay::load_trace(&args.trace)?;
    if let Some(path) = &args.config {
        trace.config = Some(EngineConfig::load(path)?);
    }

    let fallback = match EngineConfig::default_path().filter(|path| path.is_file()) {
        Some(path) if trace.config.is_none() => EngineConfig::load(&path)?,
        _ => EngineConfig::default(),
    };

    let report = replay::replay(&trace, fallback)?;
    Ok(serde_json::to_string_pretty(&report)?)
}

pub fn run() {
    env_logger::init();

    let args = CliArgs::parse();

    match execute(&args) {
        Ok(output) => println!("{output}"),
        Err(err) => {
            log::error!("replay failed: {err}");
            eprintln!("error: {err}");
            std::process::exit(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_and_config_are_parsed() {
        let parsed =
            CliArgs::try_parse_from(["touchflow-replay", "trace.json", "--config", "engine.json"])
                .expect("args");
        assert_eq!(
            parsed,
            CliArgs {
                trace: PathBuf::from("trace.json"),
                config: Some(PathBuf::from("engine.json")),
            }
        );
    }

    #[test]
    fn missing_trace_or_config_path_is_an_error() {
        assert!(CliArgs::try_parse_from(["touchflow-replay"]).is_err());
        assert!(CliArgs::try_parse_from(["touchflow-replay", "trace.json", "--config"]).is_err());
        assert!(CliArgs::try_parse_from(["touchflow-replay", "a.json", "b.json"]).is_err());
        assert!(CliArgs::try_parse_from(["touchflow-replay", "--verbose", "a.json"]).is_err());
    }
}
