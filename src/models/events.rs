//! Input samples consumed by the engine and the cursor updates it emits.

use serde::{Deserialize, Serialize};

use super::geometry::PlanarVector;

/// Phase of one touch sample within a press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TouchPhase {
    Began,
    Moved,
    Ended,
}

/// One raw sample from the host's touch or pointer layer, in touchpad space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TouchSample {
    /// Milliseconds on the host's clock.
    pub ts: u64,
    pub x: f64,
    pub y: f64,
    pub phase: TouchPhase,
}

impl TouchSample {
    pub fn new(ts: u64, position: PlanarVector, phase: TouchPhase) -> Self {
        Self {
            ts,
            x: position.x,
            y: position.y,
            phase,
        }
    }

    pub fn position(&self) -> PlanarVector {
        PlanarVector::new(self.x, self.y)
    }
}

/// Direction of a swipe. `Up` is increasing y in the input coordinate space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDirection {
    Right,
    Up,
    Left,
    Down,
}

/// Label of a recognized stroke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum GestureKind {
    Tap,
    Swipe { direction: SwipeDirection },
    Circle,
    Check,
    Caret,
    Zigzag,
    /// Template registered by the host under its own name.
    Custom { name: String },
}

/// What happened to the virtual cursor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum CursorUpdateKind {
    Moved,
    Clicked,
    DoubleClicked,
    LongPressed,
    HoldStarted,
    Swiped { direction: SwipeDirection },
    /// A template stroke matched.
    Gesture { kind: GestureKind },
    Reset,
}

/// The only record the engine produces. Position is in target-screen space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CursorUpdate {
    pub kind: CursorUpdateKind,
    pub x: f64,
    pub y: f64,
    pub ts: u64,
}

impl CursorUpdate {
    pub fn new(kind: CursorUpdateKind, position: PlanarVector, ts: u64) -> Self {
        Self {
            kind,
            x: position.x,
            y: position.y,
            ts,
        }
    }

    pub fn position(&self) -> PlanarVector {
        PlanarVector::new(self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_update_serializes_with_tagged_kind() {
        let update = CursorUpdate::new(
            CursorUpdateKind::Swiped {
                direction: SwipeDirection::Left,
            },
            PlanarVector::new(1.5, 2.0),
            42,
        );
        let json = serde_json::to_value(&update).expect("serialize update");
        assert_eq!(json["kind"]["type"], "swiped");
        assert_eq!(json["kind"]["direction"], "left");
        assert_eq!(json["ts"], 42);
    }

    #[test]
    fn touch_sample_parses_camel_case_phase() {
        let sample: TouchSample =
            serde_json::from_str(r#"{"ts":5,"x":1.0,"y":2.0,"phase":"began"}"#).expect("parse");
        assert_eq!(sample.phase, TouchPhase::Began);
        assert_eq!(sample.position(), PlanarVector::new(1.0, 2.0));
    }
}
