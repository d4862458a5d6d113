//! Relative pointer motion.
//!
//! The input source reports absolute pointer positions inside the capture
//! window; the peripheral only understands relative deltas of at most one
//! signed byte per axis. [`PointerTracker`] turns positions into deltas and
//! [`MotionSteps`] splits a delta that does not fit into a byte into several
//! `Move` commands.

use crate::protocol::messages::Command;

/// Largest per-axis delta sent in one `Move` command.
pub const MAX_STEP: i32 = i8::MAX as i32;

/// Remembers the last absolute pointer position.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PointerTracker {
    last: Option<(i32, i32)>,
}

impl PointerTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a position without producing motion, e.g. when the pointer
    /// enters the capture window.
    pub fn reset_to(&mut self, x: i32, y: i32) {
        self.last = Some((x, y));
    }

    /// Records a new position and returns the delta from the previous one.
    ///
    /// The first position after construction yields `(0, 0)`.
    pub fn motion_to(&mut self, x: i32, y: i32) -> (i32, i32) {
        let delta = match self.last {
            Some((lx, ly)) => (x.saturating_sub(lx), y.saturating_sub(ly)),
            None => (0, 0),
        };
        self.last = Some((x, y));
        delta
    }

    /// The last recorded position, if any.
    pub fn position(&self) -> Option<(i32, i32)> {
        self.last
    }
}

/// Iterator over `Move` commands that together cover a delta.
///
/// Each step moves at most [`MAX_STEP`] on either axis. A zero delta yields
/// no steps.
#[derive(Debug, Clone)]
pub struct MotionSteps {
    dx: i32,
    dy: i32,
}

/// Splits `(dx, dy)` into byte-sized `Move` commands.
pub fn motion_steps(dx: i32, dy: i32) -> MotionSteps {
    MotionSteps { dx, dy }
}

impl Iterator for MotionSteps {
    type Item = Command;

    fn next(&mut self) -> Option<Command> {
        if self.dx == 0 && self.dy == 0 {
            return None;
        }
        let sx = self.dx.clamp(-MAX_STEP, MAX_STEP);
        let sy = self.dy.clamp(-MAX_STEP, MAX_STEP);
        self.dx -= sx;
        self.dy -= sy;
        // Both values were clamped into i8 range above.
        Some(Command::Move {
            dx: sx as i8,
            dy: sy as i8,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_motion_produces_no_delta() {
        let mut tracker = PointerTracker::new();
        assert_eq!(tracker.motion_to(100, 50), (0, 0));
        assert_eq!(tracker.position(), Some((100, 50)));
    }

    #[test]
    fn test_motion_is_relative_to_previous_position() {
        // Arrange
        let mut tracker = PointerTracker::new();
        tracker.reset_to(10, 10);

        // Act
        let first = tracker.motion_to(15, 7);
        let second = tracker.motion_to(5, 7);

        // Assert
        assert_eq!(first, (5, -3));
        assert_eq!(second, (-10, 0));
    }

    #[test]
    fn test_reset_to_discards_pending_motion() {
        let mut tracker = PointerTracker::new();
        tracker.reset_to(0, 0);
        tracker.reset_to(500, 500);
        assert_eq!(tracker.motion_to(501, 499), (1, -1));
    }

    #[test]
    fn test_small_delta_is_single_step() {
        let steps: Vec<_> = motion_steps(3, -4).collect();
        assert_eq!(steps, vec![Command::Move { dx: 3, dy: -4 }]);
    }

    #[test]
    fn test_zero_delta_has_no_steps() {
        assert_eq!(motion_steps(0, 0).count(), 0);
    }

    #[test]
    fn test_large_delta_is_split_and_sums_to_total() {
        // Arrange / Act
        let steps: Vec<_> = motion_steps(300, -130).collect();

        // Assert
        assert_eq!(steps.len(), 3);
        let (mut sum_x, mut sum_y) = (0i32, 0i32);
        for step in &steps {
            let Command::Move { dx, dy } = *step else {
                panic!("unexpected command {step:?}");
            };
            sum_x += i32::from(dx);
            sum_y += i32::from(dy);
        }
        assert_eq!((sum_x, sum_y), (300, -130));
        assert_eq!(steps[0], Command::Move { dx: 127, dy: -127 });
    }
}
