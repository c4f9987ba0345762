//! Engine configuration (engine.json).
//!
//! Every field has a default, so a partial JSON document is a valid config.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::geometry::RectBounds;

pub const DEFAULT_TOUCHPAD_WIDTH: f64 = 250.0;
pub const DEFAULT_TOUCHPAD_HEIGHT: f64 = 180.0;
pub const DEFAULT_TARGET_WIDTH: f64 = 372.0;
pub const DEFAULT_TARGET_HEIGHT: f64 = 824.0;

const CONFIG_DIR_NAME: &str = "touchflow";
const CONFIG_FILE_NAME: &str = "engine.json";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} bounds are empty or not finite")]
    InvalidBounds { name: &'static str },
    #[error("{field} must be within [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
    #[error("{field} must be positive, got {value}")]
    NonPositive { field: &'static str, value: f64 },
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Low-pass smoothing of raw touch samples.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterConfig {
    pub cutoff_hz: f64,
    pub sample_rate_hz: f64,
    /// Explicit smoothing factor; overrides the cutoff/sample-rate derivation when set.
    pub alpha: Option<f64>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            cutoff_hz: 10.0,
            sample_rate_hz: 60.0,
            alpha: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KalmanConfig {
    pub process_noise_position: f64,
    pub process_noise_velocity: f64,
    pub measurement_noise: f64,
    pub initial_uncertainty: f64,
}

impl Default for KalmanConfig {
    fn default() -> Self {
        Self {
            process_noise_position: 1.0,
            process_noise_velocity: 1.0,
            measurement_noise: 4.0,
            initial_uncertainty: 1_000.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GestureConfig {
    pub resample_points: usize,
    pub match_threshold: f64,
    pub tap_max_distance: f64,
    pub tap_max_samples: usize,
    pub swipe_min_distance: f64,
    /// Upper bound on `path_length / displacement` for a stroke to count as a swipe.
    pub swipe_max_straightness: f64,
    /// Strokes shorter than this never reach template matching. 0 disables the gate.
    pub min_template_path_length: f64,
    /// Strokes whose bounding box is thinner than this share of its longer side are treated
    /// as lines and never reach template matching. 0 disables the gate.
    pub min_template_aspect: f64,
    /// Run Bezier smoothing over a stroke before template matching.
    pub pre_smooth: bool,
    pub smoothing_samples: usize,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            resample_points: 64,
            match_threshold: 0.7,
            tap_max_distance: 10.0,
            tap_max_samples: 10,
            swipe_min_distance: 50.0,
            swipe_max_straightness: 1.5,
            min_template_path_length: 0.0,
            min_template_aspect: 0.0,
            pre_smooth: false,
            smoothing_samples: 8,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SpringConfig {
    pub stiffness: f64,
    pub damping_ratio: f64,
    pub mass: f64,
}

impl Default for SpringConfig {
    fn default() -> Self {
        Self {
            stiffness: 170.0,
            damping_ratio: 1.0,
            mass: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MomentumConfig {
    /// Fraction of velocity kept per tick.
    pub friction: f64,
    pub min_speed: f64,
    /// Converts the per-sample release velocity into per-second momentum.
    pub impulse_scale: f64,
}

impl Default for MomentumConfig {
    fn default() -> Self {
        Self {
            friction: 0.92,
            min_speed: 0.1,
            impulse_scale: 60.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AttractorConfig {
    pub force_scale: f64,
    /// Distance at which the spring stops pulling toward the nearest attractor.
    pub arrival_distance: f64,
}

impl Default for AttractorConfig {
    fn default() -> Self {
        Self {
            force_scale: 1.0,
            arrival_distance: 1.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TapConfig {
    pub double_tap_window_ms: u64,
    /// Measured in target-screen units.
    pub double_tap_max_distance: f64,
    pub long_press_ms: u64,
}

impl Default for TapConfig {
    fn default() -> Self {
        Self {
            double_tap_window_ms: 300,
            double_tap_max_distance: 20.0,
            long_press_ms: 500,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeatMapConfig {
    pub enabled: bool,
    pub columns: usize,
    pub rows: usize,
}

impl Default for HeatMapConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            columns: 25,
            rows: 18,
        }
    }
}

/// Root of engine.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EngineConfig {
    pub touchpad_bounds: RectBounds,
    pub target_bounds: RectBounds,
    pub filter: FilterConfig,
    pub kalman: KalmanConfig,
    pub gesture: GestureConfig,
    pub spring: SpringConfig,
    pub momentum: MomentumConfig,
    pub attractor: AttractorConfig,
    pub taps: TapConfig,
    pub heat_map: HeatMapConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            touchpad_bounds: RectBounds::from_size(DEFAULT_TOUCHPAD_WIDTH, DEFAULT_TOUCHPAD_HEIGHT),
            target_bounds: RectBounds::from_size(DEFAULT_TARGET_WIDTH, DEFAULT_TARGET_HEIGHT),
            filter: FilterConfig::default(),
            kalman: KalmanConfig::default(),
            gesture: GestureConfig::default(),
            spring: SpringConfig::default(),
            momentum: MomentumConfig::default(),
            attractor: AttractorConfig::default(),
            taps: TapConfig::default(),
            heat_map: HeatMapConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn with_bounds(touchpad_bounds: RectBounds, target_bounds: RectBounds) -> Self {
        Self {
            touchpad_bounds,
            target_bounds,
            ..Self::default()
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("engine config: path={}", path.display());
        Self::from_json_str(&raw)
    }

    /// `{config_dir}/touchflow/engine.json`, when the platform has a config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|base| base.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        check_bounds("touchpad", &self.touchpad_bounds)?;
        check_bounds("target", &self.target_bounds)?;

        if let Some(alpha) = self.filter.alpha {
            check_range("filter.alpha", alpha, 0.0, 1.0)?;
        }

        check_positive("kalman.measurementNoise", self.kalman.measurement_noise)?;
        check_positive("kalman.initialUncertainty", self.kalman.initial_uncertainty)?;
        check_range(
            "kalman.processNoisePosition",
            self.kalman.process_noise_position,
            0.0,
            f64::MAX,
        )?;
        check_range(
            "kalman.processNoiseVelocity",
            self.kalman.process_noise_velocity,
            0.0,
            f64::MAX,
        )?;

        if self.gesture.resample_points < 2 {
            return Err(ConfigError::OutOfRange {
                field: "gesture.resamplePoints",
                value: self.gesture.resample_points as f64,
                min: 2.0,
                max: f64::MAX,
            });
        }
        check_range("gesture.matchThreshold", self.gesture.match_threshold, 0.0, 1.0)?;
        check_range("gesture.tapMaxDistance", self.gesture.tap_max_distance, 0.0, f64::MAX)?;
        check_range("gesture.swipeMinDistance", self.gesture.swipe_min_distance, 0.0, f64::MAX)?;
        // Path length over chord length is never below 1.
        check_range(
            "gesture.swipeMaxStraightness",
            self.gesture.swipe_max_straightness,
            1.0,
            f64::MAX,
        )?;
        check_range(
            "gesture.minTemplatePathLength",
            self.gesture.min_template_path_length,
            0.0,
            f64::MAX,
        )?;
        check_range("gesture.minTemplateAspect", self.gesture.min_template_aspect, 0.0, 1.0)?;

        check_positive("spring.stiffness", self.spring.stiffness)?;
        check_positive("spring.dampingRatio", self.spring.damping_ratio)?;
        check_positive("spring.mass", self.spring.mass)?;

        check_range("momentum.friction", self.momentum.friction, 0.0, 1.0)?;
        check_range("momentum.minSpeed", self.momentum.min_speed, 0.0, f64::MAX)?;
        check_range("momentum.impulseScale", self.momentum.impulse_scale, 0.0, f64::MAX)?;

        check_range("attractor.forceScale", self.attractor.force_scale, 0.0, f64::MAX)?;
        check_range(
            "attractor.arrivalDistance",
            self.attractor.arrival_distance,
            0.0,
            f64::MAX,
        )?;

        if self.heat_map.enabled && (self.heat_map.columns == 0 || self.heat_map.rows == 0) {
            return Err(ConfigError::NonPositive {
                field: "heatMap.columns/rows",
                value: 0.0,
            });
        }

        Ok(())
    }
}

fn check_bounds(name: &'static str, bounds: &RectBounds) -> Result<(), ConfigError> {
    if !bounds.is_valid() || bounds.width() <= 0.0 || bounds.height() <= 0.0 {
        return Err(ConfigError::InvalidBounds { name });
    }
    Ok(())
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < min || value > max {
        return Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        });
    }
    Ok(())
}

fn check_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::NonPositive { field, value });
    }
    Ok(())
}
