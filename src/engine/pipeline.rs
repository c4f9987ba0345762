use crate::algorithm::dynamics::{
    self, AttractorField, DynamicalSystem, MomentumSystem, SpringDamper,
};
use crate::algorithm::gesture::{GestureMatch, GestureRecognizer, GestureTemplate};
use crate::algorithm::interaction::{
    InteractionInput, InteractionMachine, InteractionOutput, InteractionState,
};
use crate::algorithm::kalman::KalmanFilter2D;
use crate::algorithm::low_pass::LowPassFilter2D;
use crate::algorithm::transform::CoordinateTransform;
use crate::engine::taps::TapClassifier;
use crate::models::config::{ConfigError, EngineConfig};
use crate::models::events::{CursorUpdate, CursorUpdateKind, GestureKind, TouchPhase, TouchSample};
use crate::models::geometry::PlanarVector;
use crate::telemetry::heat_map::HeatMap;

/// Owns every stage of the touch-to-cursor pipeline for one interaction session.
///
/// Not synchronized: callers sharing an engine across threads must serialize access.
#[derive(Debug, Clone)]
pub struct TouchEngine {
    config: EngineConfig,
    transform: CoordinateTransform,
    low_pass: LowPassFilter2D,
    kalman: KalmanFilter2D,
    recognizer: GestureRecognizer,
    interaction: InteractionMachine,
    taps: TapClassifier,
    momentum: MomentumSystem,
    spring: SpringDamper,
    attractors: Option<AttractorField>,
    heat_map: Option<HeatMap>,
    touch_position: PlanarVector,
    cursor: PlanarVector,
    press_path: Vec<PlanarVector>,
    press_started_ts: Option<u64>,
    last_sample_ts: Option<u64>,
    clock_ms: u64,
    tick_remainder_ms: f64,
}

impl TouchEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        log::info!(
            "touch engine: touchpad={}x{} target={}x{}",
            config.touchpad_bounds.width(),
            config.touchpad_bounds.height(),
            config.target_bounds.width(),
            config.target_bounds.height()
        );
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let low_pass = match config.filter.alpha {
            Some(alpha) => LowPassFilter2D::new(alpha),
            None => LowPassFilter2D::from_cutoff(config.filter.cutoff_hz, config.filter.sample_rate_hz),
        };
        let heat_map = config.heat_map.enabled.then(|| {
            HeatMap::new(
                config.touchpad_bounds,
                config.heat_map.columns,
                config.heat_map.rows,
            )
        });
        let touch_position = config.touchpad_bounds.center();
        let cursor = config.target_bounds.center();
        let mut kalman = KalmanFilter2D::new(&config.kalman);
        kalman.reset(touch_position);
        let mut spring = SpringDamper::from_config(&config.spring);
        spring.position = cursor;
        spring.target = cursor;

        Self {
            transform: CoordinateTransform::new(config.touchpad_bounds, config.target_bounds),
            low_pass,
            kalman,
            recognizer: GestureRecognizer::with_builtin_templates(config.gesture.clone()),
            interaction: InteractionMachine::new(),
            taps: TapClassifier::new(config.taps.clone()),
            momentum: MomentumSystem::from_config(&config.momentum),
            spring,
            attractors: None,
            heat_map,
            touch_position,
            cursor,
            press_path: Vec::new(),
            press_started_ts: None,
            last_sample_ts: None,
            clock_ms: 0,
            tick_remainder_ms: 0.0,
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn transform(&self) -> &CoordinateTransform {
        &self.transform
    }

    /// Virtual cursor in target-screen space.
    pub fn cursor_position(&self) -> PlanarVector {
        self.cursor
    }

    /// Last filtered touch position in touchpad space.
    pub fn touch_position(&self) -> PlanarVector {
        self.touch_position
    }

    pub fn interaction_state(&self) -> InteractionState {
        self.interaction.state()
    }

    pub fn kalman(&self) -> &KalmanFilter2D {
        &self.kalman
    }

    pub fn momentum(&self) -> &MomentumSystem {
        &self.momentum
    }

    pub fn recognizer(&self) -> &GestureRecognizer {
        &self.recognizer
    }

    pub fn heat_map(&self) -> Option<&HeatMap> {
        self.heat_map.as_ref()
    }

    pub fn attractor_field(&self) -> Option<&AttractorField> {
        self.attractors.as_ref()
    }

    pub fn register_template(&mut self, template: GestureTemplate) -> bool {
        self.recognizer.register_template(template)
    }

    /// Replaces the whole field; `None` removes attraction.
    pub fn set_attractor_field(&mut self, field: Option<AttractorField>) {
        log::debug!(
            "touch engine: attractor field with {} points",
            field.as_ref().map_or(0, |f| f.attractors().len())
        );
        self.attractors = field;
        self.spring.reset();
    }

    pub fn process_touch(&mut self, sample: TouchSample) -> Option<CursorUpdate> {
        let raw = sample.position();
        if !raw.is_finite() {
            log::warn!("touch engine: dropping non-finite sample at ts={}", sample.ts);
            return None;
        }

        self.clock_ms = self.clock_ms.max(sample.ts);
        if let Some(heat_map) = self.heat_map.as_mut() {
            heat_map.record(raw);
        }

        let idle = matches!(self.interaction.state(), InteractionState::Idle);
        match sample.phase {
            TouchPhase::Began => {
                if !idle {
                    log::warn!("touch engine: press began before the previous one ended");
                }
                self.begin_press(sample.ts);
            }
            TouchPhase::Moved | TouchPhase::Ended if idle => {
                log::trace!("touch engine: ignoring {:?} without a press", sample.phase);
                return None;
            }
            TouchPhase::Moved | TouchPhase::Ended => {}
        }

        let filtered = self.low_pass.filter(raw);
        if sample.phase == TouchPhase::Began {
            self.kalman.reset(filtered);
        } else {
            let elapsed = self.samples_elapsed(sample.ts);
            self.kalman.predict(elapsed);
        }
        self.kalman.update(filtered);
        self.last_sample_ts = Some(sample.ts);
        self.touch_position = filtered;
        self.press_path.push(filtered);

        let input = match sample.phase {
            TouchPhase::Began => InteractionInput::PressStarted(filtered),
            TouchPhase::Moved => InteractionInput::PressMoved(filtered),
            TouchPhase::Ended => InteractionInput::PressEnded(filtered),
        };

        match self.interaction.handle(input)? {
            InteractionOutput::StartHold => Some(self.update(CursorUpdateKind::HoldStarted)),
            InteractionOutput::MoveCursor(delta) => {
                self.move_cursor(delta);
                Some(self.update(CursorUpdateKind::Moved))
            }
            output @ (InteractionOutput::PerformClick(_) | InteractionOutput::Reset) => {
                Some(self.finish_press(sample.ts, output))
            }
        }
    }

    /// Advances momentum or spring attraction by `dt` seconds, with or without a press in flight.
    /// Returns a `Moved` update only when the cursor actually moved.
    pub fn update_physics(&mut self, dt: f64) -> Option<CursorUpdate> {
        if !dt.is_finite() || dt <= 0.0 {
            return None;
        }
        self.advance_clock(dt);

        let before = self.cursor;
        let bounds = self.config.target_bounds;
        if self.momentum.is_moving() {
            self.cursor = dynamics::drive(&mut self.momentum, self.cursor, dt, &bounds);
        } else if let Some(nearest) = self
            .attractors
            .as_ref()
            .and_then(|field| field.nearest(self.cursor))
            .filter(|nearest| nearest.distance(self.cursor) > self.config.attractor.arrival_distance)
        {
            self.spring.target = nearest;
            self.cursor = dynamics::drive(&mut self.spring, self.cursor, dt, &bounds);
        } else if self.spring.is_active() {
            self.spring.position = self.cursor;
            self.spring.reset();
        }

        (self.cursor != before).then(|| self.update(CursorUpdateKind::Moved))
    }

    /// Centers both cursors and returns every filter and simulator to its initial condition.
    /// Any press in flight is discarded.
    pub fn reset_to_center(&mut self) {
        self.cursor = self.config.target_bounds.center();
        self.touch_position = self.config.touchpad_bounds.center();
        self.low_pass.reset();
        self.kalman.reset(self.touch_position);
        self.momentum.reset();
        self.spring.position = self.cursor;
        self.spring.reset();
        self.interaction.reset();
        self.taps.reset();
        self.press_path.clear();
        self.press_started_ts = None;
        self.last_sample_ts = None;
        log::debug!("touch engine: reset to center");
    }

    fn begin_press(&mut self, ts: u64) {
        self.interaction.reset();
        self.low_pass.reset();
        self.momentum.reset();
        self.spring.position = self.cursor;
        self.spring.reset();
        self.press_path.clear();
        self.press_started_ts = Some(ts);
        self.last_sample_ts = None;
    }

    fn finish_press(&mut self, ts: u64, output: InteractionOutput) -> CursorUpdate {
        let path = std::mem::take(&mut self.press_path);
        let held_ms = self
            .press_started_ts
            .take()
            .map_or(0, |started| ts.saturating_sub(started));
        let stationary = is_stationary(&path, self.config.gesture.tap_max_distance);
        let recognized = self.recognizer.recognize(&path);
        if let Some(GestureMatch { kind, score }) = &recognized {
            log::debug!("touch engine: recognized {kind:?} score={score:.3}");
        }

        let kind = match recognized.map(|matched| matched.kind) {
            Some(GestureKind::Tap) => self.taps.classify(ts, held_ms, self.cursor),
            Some(GestureKind::Swipe { direction }) => CursorUpdateKind::Swiped { direction },
            Some(kind) => CursorUpdateKind::Gesture { kind },
            // Too many samples for the tap fast path, but the finger never left the spot.
            None if stationary || matches!(output, InteractionOutput::PerformClick(_)) => {
                self.taps.classify(ts, held_ms, self.cursor)
            }
            None => {
                self.release_momentum();
                CursorUpdateKind::Reset
            }
        };

        self.low_pass.reset();
        self.kalman.reset(self.touch_position);
        self.last_sample_ts = None;
        self.update(kind)
    }

    fn release_momentum(&mut self) {
        let impulse = self.transform.map_delta(self.kalman.velocity())
            * self.config.momentum.impulse_scale;
        log::debug!(
            "touch engine: release impulse=({:.2}, {:.2})",
            impulse.x,
            impulse.y
        );
        self.momentum.apply_impulse(impulse);
    }

    fn move_cursor(&mut self, delta: PlanarVector) {
        let mapped = self.transform.map_delta(delta);
        let pull = self
            .attractors
            .as_ref()
            .map_or(PlanarVector::ZERO, |field| {
                field.force(self.cursor) * self.config.attractor.force_scale
            });
        self.cursor = self.config.target_bounds.clamp(self.cursor + mapped + pull);
    }

    /// Time since the previous sample, in nominal sample periods.
    fn samples_elapsed(&self, ts: u64) -> f64 {
        let Some(previous) = self.last_sample_ts else {
            return 0.0;
        };
        let seconds = ts.saturating_sub(previous) as f64 / 1_000.0;
        let rate = self.config.filter.sample_rate_hz;
        if rate.is_finite() && rate > 0.0 {
            seconds * rate
        } else {
            1.0
        }
    }

    fn advance_clock(&mut self, dt: f64) {
        self.tick_remainder_ms += dt * 1_000.0;
        let whole = self.tick_remainder_ms.floor();
        self.tick_remainder_ms -= whole;
        self.clock_ms = self.clock_ms.saturating_add(whole as u64);
    }

    fn update(&self, kind: CursorUpdateKind) -> CursorUpdate {
        CursorUpdate::new(kind, self.cursor, self.clock_ms)
    }
}

fn is_stationary(path: &[PlanarVector], max_distance: f64) -> bool {
    path.first()
        .is_some_and(|first| path.iter().all(|point| point.distance(*first) < max_distance))
}

impl Default for TouchEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}
