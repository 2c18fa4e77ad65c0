//! Level and fall speed from cumulative score.

pub const POINTS_PER_LEVEL: u32 = 500;
pub const MAX_LEVEL: u32 = 10;
/// Seconds per row at level 1.
pub const BASE_FALL_SECS: f32 = 1.0;
/// Seconds per row at `MAX_LEVEL`.
pub const MIN_FALL_SECS: f32 = 0.15;

/// `clamp(score / 500 + 1, 1, 10)`.
pub fn level_for_score(score: u32) -> u32 {
    (score / POINTS_PER_LEVEL + 1).clamp(1, MAX_LEVEL)
}

/// Seconds between automatic one-row drops. Speeds up along a 1.5 power curve
/// so early levels stay gentle.
pub fn fall_speed(level: u32) -> f32 {
    if level >= MAX_LEVEL {
        return MIN_FALL_SECS;
    }
    let t = (level.max(1) - 1) as f32 / (MAX_LEVEL - 1) as f32;
    BASE_FALL_SECS - t.powf(1.5) * (BASE_FALL_SECS - MIN_FALL_SECS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(level_for_score(0), 1);
        assert_eq!(level_for_score(499), 1);
        assert_eq!(level_for_score(500), 2);
        assert_eq!(level_for_score(4_499), 9);
        assert_eq!(level_for_score(4_500), 10);
        assert_eq!(level_for_score(u32::MAX), 10);
    }

    #[test]
    fn test_fall_speed_endpoints() {
        assert!((fall_speed(1) - 1.0).abs() < 1e-6);
        assert!((fall_speed(10) - 0.15).abs() < 1e-6);
        assert!((fall_speed(25) - 0.15).abs() < 1e-6);
        // level 0 is treated as level 1
        assert!((fall_speed(0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_fall_speed_strictly_decreases() {
        for level in 1..MAX_LEVEL {
            assert!(fall_speed(level + 1) < fall_speed(level), "level {level}");
        }
    }

    #[test]
    fn test_fall_speed_curve_is_accelerating() {
        // (4/9)^1.5 ≈ 0.2963 → 1.0 - 0.2963 * 0.85
        assert!((fall_speed(5) - 0.748_14).abs() < 1e-3);
    }
}
