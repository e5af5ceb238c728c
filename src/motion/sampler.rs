use std::sync::mpsc::Sender;
use std::time::Duration;

use glam::Vec2;

use super::direction::{classify, Direction};

/// Synchronous "where is the cursor right now" query.
///
/// `None` means the position could not be read this tick.
pub trait PointerSource {
    fn read_position(&mut self) -> Option<Vec2>;
}

impl<F: FnMut() -> Option<Vec2>> PointerSource for F {
    fn read_position(&mut self) -> Option<Vec2> {
        self()
    }
}

/// One cursor reading and the tick time it was taken at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    pub pos: Vec2,
    pub at: Duration,
}

/// Turns periodic cursor readings into direction signals.
///
/// Only ever writes its own previous-sample slot; signals go out over
/// the channel and never touch animation state directly.
pub struct MotionSampler {
    threshold: f32,
    prev: Option<MotionSample>,
    signals: Sender<Direction>,
}

impl MotionSampler {
    pub fn new(threshold: f32, signals: Sender<Direction>) -> Self {
        debug_assert!(threshold.is_finite() && threshold > 0.0);
        Self {
            threshold,
            prev: None,
            signals,
        }
    }

    /// Record a baseline reading without classifying it.
    pub fn prime(&mut self, pointer: &mut dyn PointerSource, now: Duration) {
        if let Some(pos) = pointer.read_position() {
            self.prev = Some(MotionSample { pos, at: now });
        }
    }

    /// Run one sampling tick. Returns the classification for this tick.
    pub fn sample(&mut self, pointer: &mut dyn PointerSource, now: Duration) -> Direction {
        // A failed read counts as standing still at the last known spot.
        let pos = match (pointer.read_position(), self.prev) {
            (Some(pos), _) => pos,
            (None, Some(prev)) => prev.pos,
            (None, None) => return Direction::Idle,
        };
        let current = MotionSample { pos, at: now };

        // First tick has nothing to compare against: zero delta.
        let delta = self.prev.map_or(Vec2::ZERO, |prev| current.pos - prev.pos);
        let direction = classify(delta, self.threshold);
        log::trace!("sample at {:?}: delta {delta} -> {}", current.at, direction.label());

        if !direction.is_idle() {
            // Receiver gone means the follower is shutting down.
            let _ = self.signals.send(direction);
        }

        self.prev = Some(current);
        direction
    }

    #[cfg(test)]
    pub fn previous(&self) -> Option<MotionSample> {
        self.prev
    }
}
