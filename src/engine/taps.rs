use crate::models::config::TapConfig;
use crate::models::events::CursorUpdateKind;
use crate::models::geometry::PlanarVector;

#[derive(Debug, Clone, Copy, PartialEq)]
struct TapRecord {
    ts: u64,
    position: PlanarVector,
}

/// Splits released taps into clicks, double clicks and long presses by timing.
#[derive(Debug, Clone)]
pub struct TapClassifier {
    config: TapConfig,
    last_tap: Option<TapRecord>,
}

impl TapClassifier {
    pub fn new(config: TapConfig) -> Self {
        Self {
            config,
            last_tap: None,
        }
    }

    /// `position` is the cursor in target space at release.
    pub fn classify(&mut self, ts: u64, held_ms: u64, position: PlanarVector) -> CursorUpdateKind {
        if held_ms >= self.config.long_press_ms {
            self.last_tap = None;
            return CursorUpdateKind::LongPressed;
        }

        let is_second_tap = self.last_tap.is_some_and(|previous| {
            ts.saturating_sub(previous.ts) <= self.config.double_tap_window_ms
                && previous.position.distance(position) <= self.config.double_tap_max_distance
        });
        if is_second_tap {
            self.last_tap = None;
            return CursorUpdateKind::DoubleClicked;
        }

        self.last_tap = Some(TapRecord { ts, position });
        CursorUpdateKind::Clicked
    }

    pub fn reset(&mut self) {
        self.last_tap = None;
    }
}
