//! Closed-form easing curves.

/// Decelerating curve `1 - (1 - x)^3`, `x` is clamped to `[0, 1]`.
pub fn ease_out_cubic(x: f32) -> f32 {
    let inv = 1.0 - x.clamp(0.0, 1.0);
    1.0 - inv * inv * inv
}

pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ease_out_cubic_hits_endpoints_exactly() {
        assert_eq!(ease_out_cubic(0.0), 0.0);
        assert_eq!(ease_out_cubic(1.0), 1.0);
    }

    #[test]
    fn ease_out_cubic_clamps_out_of_range_input() {
        assert_eq!(ease_out_cubic(-3.0), 0.0);
        assert_eq!(ease_out_cubic(7.5), 1.0);
    }

    #[test]
    fn ease_out_cubic_is_monotonic_and_front_loaded() {
        let mut last = 0.0;
        for i in 1..=100 {
            let x = i as f32 / 100.0;
            let y = ease_out_cubic(x);
            assert!(y >= last);
            // decelerating curves run ahead of linear progress
            assert!(y >= x - 1e-6);
            last = y;
        }
        assert!((ease_out_cubic(0.3) - 0.657).abs() < 1e-3);
    }

    #[test]
    fn lerp_endpoints() {
        assert_eq!(lerp(0.1, 0.9, 0.0), 0.1);
        assert!((lerp(0.1, 0.9, 1.0) - 0.9).abs() < 1e-6);
        assert!((lerp(0.0, 10.0, 0.5) - 5.0).abs() < 1e-6);
    }
}
