//! Closed-form jump arc.

/// Height above the jump floor `elapsed` ms after take-off.
///
/// Downward parabola through `(0, 0)`, `(d/2, h)` and `(d, 0)`; negative past
/// `d`. World y is `jump_floor - height(..)`.
///
/// Same curve as `h - ((elapsed - d/2) * sqrt(h) / (d/2))^2`, factored so the
/// take-off and landing samples come out exactly 0.
#[inline]
pub fn height(elapsed: f32, h: f32, d: f32) -> f32 {
    let half = d / 2.0;
    let t = (elapsed - half) / half;
    h * (1.0 - t * t)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() <= 1e-3 * b.abs().max(1.0)
    }

    #[test]
    fn zero_at_both_ends_and_peak_in_the_middle() {
        for (h, d) in [(1.0, 1.0), (224.0, 913.0), (50.0, 120.5), (3.5, 2000.0)] {
            assert!(close(height(0.0, h, d), 0.0), "h={h} d={d}");
            assert!(close(height(d, h, d), 0.0), "h={h} d={d}");
            assert!(close(height(d / 2.0, h, d), h), "h={h} d={d}");
        }
    }

    #[test]
    fn level_defaults_peak() {
        assert!((height(456.5, 224.0, 913.0) - 224.0).abs() < 1e-3);
    }

    #[test]
    fn take_off_sample_is_exactly_floor() {
        for (h, d) in [(112.0, 913.0), (224.0, 913.0), (3.5, 17.0)] {
            assert_eq!(height(0.0, h, d), 0.0);
        }
    }

    #[test]
    fn symmetric_and_below_floor_after_landing_time() {
        let (h, d) = (224.0, 913.0);
        assert!(close(height(100.0, h, d), height(d - 100.0, h, d)));
        assert!(height(d + 50.0, h, d) < 0.0);
    }
}
