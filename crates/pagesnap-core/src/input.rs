//! Unified pointer input for mouse, touch and pen.

use crate::timers::Instant;
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};

/// Stage of a pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerPhase {
    Down,
    Move,
    Up,
    /// The platform took the pointer away (pointercancel, window blur).
    Cancel,
}

/// Device that produced a pointer sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointerSource {
    #[default]
    Mouse,
    Touch,
    Pen,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

/// One active touch contact.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub position: Point,
}

/// A pointer sample in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub phase: PointerPhase,
    pub position: Point,
    pub source: PointerSource,
    pub time: Instant,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    pub fn new(phase: PointerPhase, position: Point, source: PointerSource, time: Instant) -> Self {
        Self {
            phase,
            position,
            source,
            time,
            modifiers: Modifiers::default(),
        }
    }

    /// Mouse sample with no modifiers held.
    pub fn mouse(phase: PointerPhase, position: Point, time: Instant) -> Self {
        Self::new(phase, position, PointerSource::Mouse, time)
    }

    /// Build a sample from a touch event.
    ///
    /// Uses the first active touch. On touchend/touchcancel the lifted finger
    /// is no longer active, so the first changed touch is used instead.
    /// Returns `None` when neither list has a contact.
    pub fn from_touches(
        phase: PointerPhase,
        touches: &[TouchPoint],
        changed: &[TouchPoint],
        time: Instant,
    ) -> Option<Self> {
        let touch = match phase {
            PointerPhase::Up | PointerPhase::Cancel => changed.first().or_else(|| touches.first()),
            PointerPhase::Down | PointerPhase::Move => touches.first().or_else(|| changed.first()),
        }?;
        Some(Self::new(phase, touch.position, PointerSource::Touch, time))
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Offset of this sample from `origin`.
    pub fn delta_from(&self, origin: Point) -> Vec2 {
        self.position - origin
    }
}

/// Whether a pointer offset counts as real movement: either axis beyond `threshold`.
pub fn exceeds_threshold(delta: Vec2, threshold: f64) -> bool {
    delta.x.abs() > threshold || delta.y.abs() > threshold
}
