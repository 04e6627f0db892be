//! Collision predicates for the runner
//!
//! Three checks run each playing tick, each with its own geometry: orb
//! pickup uses a center distance, the near miss a trailing-edge band, and
//! the lethal check an inset axis-aligned overlap. The inset means grazing
//! an obstacle's edge reads as a near miss rather than a death.

use super::state::{Obstacle, Orb, Player};
use crate::consts::{HIT_INSET, NEAR_MISS_BAND, NEAR_MISS_GAP, ORB_RADIUS, PLAYER_SIZE};

/// Lethal test: the player's hit box, inset `HIT_INSET` per side, against
/// the obstacle rectangle.
pub fn lethal_overlap(player: &Player, obs: &Obstacle) -> bool {
    let px = player.x + HIT_INSET;
    let py = player.y + HIT_INSET;
    let ps = PLAYER_SIZE - HIT_INSET * 2.0;
    px < obs.x + obs.w && px + ps > obs.x && py < obs.y + obs.h && py + ps > obs.y
}

/// Near-miss test: the obstacle's trailing edge has just cleared the player
/// center (within `NEAR_MISS_BAND` units behind it) and the perpendicular
/// gap on the obstacle's open side is small but strictly positive. Returns
/// the gap when the pass qualifies.
pub fn near_miss_gap(player: &Player, obs: &Obstacle) -> Option<f32> {
    let c = player.center();
    let trailing = obs.x + obs.w;
    if trailing >= c.x || trailing <= c.x - NEAR_MISS_BAND {
        return None;
    }
    let gap = if obs.ceiling {
        c.y - (obs.y + obs.h)
    } else {
        obs.y - c.y
    };
    (gap > 0.0 && gap < NEAR_MISS_GAP + PLAYER_SIZE / 2.0).then_some(gap)
}

/// Orb pickup test: player center against the orb circle
pub fn orb_within_pickup(player: &Player, orb: &Orb) -> bool {
    player.center().distance(orb.pos) < PLAYER_SIZE / 2.0 + ORB_RADIUS
}
