//! Speed curve and zone classification
//!
//! Speed rises linearly with the tick count and clamps at a ceiling. Zones
//! are named speed brackets; crossing into one for the first time is a
//! milestone the lifecycle turns into a notification.

use crate::consts::{BASE_SPEED, MAX_SPEED, SPEED_INC};

/// A named speed bracket
#[derive(Debug, Clone, Copy)]
pub struct Zone {
    /// Minimum speed to qualify
    pub min_speed: f32,
    /// Label shown when the zone is entered (empty for the starting bracket)
    pub name: &'static str,
    /// Theme color
    pub color: (u8, u8, u8),
}

/// Ordered low to high; `zone_for_speed` picks the highest qualifying entry
pub const ZONES: [Zone; 5] = [
    Zone { min_speed: 0.0, name: "", color: (108, 92, 231) },
    Zone { min_speed: 5.0, name: "FAST", color: (0, 184, 148) },
    Zone { min_speed: 7.0, name: "BLAZING", color: (225, 112, 85) },
    Zone { min_speed: 9.0, name: "INSANE", color: (214, 48, 49) },
    Zone { min_speed: 11.0, name: "IMPOSSIBLE", color: (232, 67, 147) },
];

/// Scroll speed after `frame` ticks, clamped at the ceiling
#[inline]
pub fn speed_at(frame: u64) -> f32 {
    (BASE_SPEED + frame as f32 * SPEED_INC).min(MAX_SPEED)
}

/// Highest zone whose threshold the given speed has reached
pub fn zone_for_speed(speed: f32) -> usize {
    for i in (0..ZONES.len()).rev() {
        if speed >= ZONES[i].min_speed {
            return i;
        }
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_speed_starts_at_base() {
        assert_eq!(speed_at(0), BASE_SPEED);
    }

    #[test]
    fn test_speed_clamps_at_max() {
        // Well past the point the curve saturates
        assert_eq!(speed_at(100_000), MAX_SPEED);
        assert_eq!(speed_at(u64::MAX), MAX_SPEED);
    }

    #[test]
    fn test_zone_picks_highest_qualifying() {
        assert_eq!(zone_for_speed(BASE_SPEED), 0);
        assert_eq!(zone_for_speed(5.0), 1);
        assert_eq!(zone_for_speed(6.9), 1);
        assert_eq!(zone_for_speed(7.0), 2);
        assert_eq!(zone_for_speed(9.5), 3);
        assert_eq!(zone_for_speed(MAX_SPEED), 4);
    }

    #[test]
    fn test_zone_thresholds_ascend() {
        for pair in ZONES.windows(2) {
            assert!(pair[0].min_speed < pair[1].min_speed);
        }
    }

    proptest! {
        #[test]
        fn prop_speed_bounded(frame in 0u64..u64::MAX) {
            let s = speed_at(frame);
            prop_assert!(s >= BASE_SPEED);
            prop_assert!(s <= MAX_SPEED);
        }

        #[test]
        fn prop_speed_non_decreasing(frame in 0u64..10_000_000, step in 1u64..100_000) {
            prop_assert!(speed_at(frame) <= speed_at(frame + step));
        }

        #[test]
        fn prop_zone_non_decreasing_in_speed(a in 0.0f32..20.0, b in 0.0f32..20.0) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(zone_for_speed(lo) <= zone_for_speed(hi));
        }
    }
}
