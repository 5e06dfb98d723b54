//! Small shared helpers for the elapsed-time ramps every overlay builds on.
//! The overlay-specific breakpoint tables stay at their call sites; these
//! cover only the shapes repeated verbatim across overlays.

/// Linear 0..1 ramp of `x` across `[from, to]`, clamped outside.
///
/// Degenerate `from == to` behaves like the two-breakpoint table: at or
/// before the edge yields 0, after it 1.
pub fn ramp(x: f64, from: f64, to: f64) -> f64 {
    if x <= from {
        0.0
    } else if x >= to {
        1.0
    } else {
        (x - from) / (to - from)
    }
}

/// Per-item reveal progress for staggered lists (ranking rows, poll bars,
/// budget lines): item starts `delay` frames after the overlay and ramps
/// over `ramp_frames`.
pub fn stagger_progress(elapsed: f64, delay: f64, ramp_frames: f64) -> f64 {
    ramp(elapsed - delay, 0.0, ramp_frames)
}

/// Animated count-up display value: the target scaled by progress, rounded
/// to the nearest integer. Progress 1 returns the exact target.
pub fn count_up(value: f64, progress: f64) -> i64 {
    (value * progress).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ramp_clamps_and_interpolates() {
        assert_eq!(ramp(-3.0, 0.0, 10.0), 0.0);
        assert_eq!(ramp(0.0, 0.0, 10.0), 0.0);
        assert_eq!(ramp(5.0, 0.0, 10.0), 0.5);
        assert_eq!(ramp(10.0, 0.0, 10.0), 1.0);
        assert_eq!(ramp(99.0, 0.0, 10.0), 1.0);
    }

    #[test]
    fn ramp_zero_width_is_a_step() {
        assert_eq!(ramp(3.9, 4.0, 4.0), 0.0);
        assert_eq!(ramp(4.0, 4.0, 4.0), 0.0);
        assert_eq!(ramp(4.1, 4.0, 4.0), 1.0);
    }

    #[test]
    fn stagger_shifts_by_delay() {
        // Third ranking row: delay 2 * 15, ramp over 20 frames.
        assert_eq!(stagger_progress(30.0, 30.0, 20.0), 0.0);
        assert_eq!(stagger_progress(40.0, 30.0, 20.0), 0.5);
        assert_eq!(stagger_progress(55.0, 30.0, 20.0), 1.0);
    }

    #[test]
    fn count_up_hits_exact_target() {
        assert_eq!(count_up(230_000.0, 0.0), 0);
        assert_eq!(count_up(230_000.0, 0.5), 115_000);
        assert_eq!(count_up(230_000.0, 1.0), 230_000);
    }
}
