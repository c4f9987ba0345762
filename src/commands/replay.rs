//! Replay of recorded touch traces (trace.json) through a fresh engine.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithm::dynamics::AttractorField;
use crate::algorithm::gesture::GestureTemplate;
use crate::engine::TouchEngine;
use crate::models::config::{ConfigError, EngineConfig};
use crate::models::events::{CursorUpdate, GestureKind, TouchSample};
use crate::models::geometry::PlanarVector;
use crate::telemetry::heat_map::HeatMapSnapshot;

pub const TRACE_SCHEMA_VERSION: u32 = 1;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to read trace {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse trace: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported trace schemaVersion: expected {expected}, got {actual}")]
    SchemaVersion { expected: u32, actual: u32 },
    #[error(transparent)]
    Config(#[from] ConfigError),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceAttractors {
    pub points: Vec<PlanarVector>,
    pub strength: f64,
    pub radius: f64,
    pub capture_radius: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceTemplate {
    pub name: String,
    pub points: Vec<PlanarVector>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TraceStep {
    Sample(TouchSample),
    /// Physics tick of `dt` seconds.
    Tick { dt: f64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchTrace {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(default)]
    pub config: Option<EngineConfig>,
    #[serde(default)]
    pub attractors: Option<TraceAttractors>,
    #[serde(default)]
    pub templates: Vec<TraceTemplate>,
    pub steps: Vec<TraceStep>,
}

fn default_schema_version() -> u32 {
    TRACE_SCHEMA_VERSION
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplayReport {
    pub generated_at_ms: u64,
    pub step_count: usize,
    pub updates: Vec<CursorUpdate>,
    pub final_cursor: PlanarVector,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heat_map: Option<HeatMapSnapshot>,
}

pub fn parse_trace(raw: &str) -> Result<TouchTrace, ReplayError> {
    let trace: TouchTrace = serde_json::from_str(raw)?;
    if trace.schema_version != TRACE_SCHEMA_VERSION {
        return Err(ReplayError::SchemaVersion {
            expected: TRACE_SCHEMA_VERSION,
            actual: trace.schema_version,
        });
    }
    Ok(trace)
}

pub fn load_trace(path: &Path) -> Result<TouchTrace, ReplayError> {
    let raw = std::fs::read_to_string(path).map_err(|source| ReplayError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let trace = parse_trace(&raw)?;
    log::info!(
        "load_trace: path={} steps={}",
        path.display(),
        trace.steps.len()
    );
    Ok(trace)
}

/// Runs every step through a new engine. The trace's own config wins over `fallback`.
pub fn replay(trace: &TouchTrace, fallback: EngineConfig) -> Result<ReplayReport, ReplayError> {
    let config = trace.config.clone().unwrap_or(fallback);
    let mut engine = TouchEngine::new(config)?;

    for template in &trace.templates {
        let label = GestureKind::Custom {
            name: template.name.clone(),
        };
        engine.register_template(GestureTemplate::new(label, template.points.clone()));
    }
    if let Some(attractors) = &trace.attractors {
        engine.set_attractor_field(Some(AttractorField::new(
            attractors.points.clone(),
            attractors.strength,
            attractors.radius,
            attractors.capture_radius,
        )));
    }

    let mut updates = Vec::new();
    for step in &trace.steps {
        let update = match step {
            TraceStep::Sample(sample) => engine.process_touch(*sample),
            TraceStep::Tick { dt } => engine.update_physics(*dt),
        };
        updates.extend(update);
    }

    log::info!(
        "replay: steps={} updates={}",
        trace.steps.len(),
        updates.len()
    );

    Ok(ReplayReport {
        generated_at_ms: chrono::Utc::now().timestamp_millis() as u64,
        step_count: trace.steps.len(),
        updates,
        final_cursor: engine.cursor_position(),
        heat_map: engine.heat_map().map(|heat_map| heat_map.snapshot()),
    })
}
