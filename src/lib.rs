//! Flip Runner - a gravity-flip arcade runner for the terminal
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, collisions, scoring, lifecycle)
//! - `render`: Terminal half-block renderer
//! - `persistence`: Best-score save file

pub mod persistence;
pub mod render;
pub mod sim;

pub use sim::{GameEvent, GameState, TickInput, tick};

/// Game configuration constants
pub mod consts {
    /// Logical simulation rate (ticks per second)
    pub const TICK_RATE: f32 = 60.0;
    /// Fixed simulation timestep
    pub const SIM_DT: f32 = 1.0 / TICK_RATE;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 4;

    /// Track dimensions (simulation units)
    pub const ARENA_W: f32 = 840.0;
    pub const ARENA_H: f32 = 420.0;
    /// Thickness of the floor and ceiling strips
    pub const GROUND_H: f32 = 5.0;

    /// Player square edge length
    pub const PLAYER_SIZE: f32 = 24.0;
    /// Fixed horizontal position of the player's left edge
    pub const PLAYER_X: f32 = 110.0;
    /// Margin shaved off each side of the player for the lethal check
    pub const HIT_INSET: f32 = 4.0;
    /// Seconds a gravity flip takes from rest to rest
    pub const FLIP_DURATION_SECS: f32 = 0.16;

    /// Scroll speed curve, in units per tick
    pub const BASE_SPEED: f32 = 3.8;
    pub const SPEED_INC: f32 = 0.00045;
    pub const MAX_SPEED: f32 = 13.0;

    /// Minimum horizontal gap between obstacle spawns
    pub const MIN_OBS_GAP: f32 = 140.0;
    /// Oscillating-height obstacle bounds
    pub const OBS_MIN_H: f32 = 20.0;
    pub const OBS_MAX_H: f32 = 90.0;
    /// Speed above which moving obstacles become eligible
    pub const MOVING_OBS_MIN_SPEED: f32 = 6.0;

    /// Orb pickup radius
    pub const ORB_RADIUS: f32 = 7.0;
    /// Live orbs allowed at once
    pub const MAX_ORBS: usize = 4;
    /// Per-tick orb spawn probability
    pub const ORB_SPAWN_CHANCE: f64 = 0.012;

    /// Ticks the combo survives without a pickup (3 seconds)
    pub const COMBO_WINDOW_TICKS: u32 = 180;
    /// Trailing-edge window behind the player for a near miss
    pub const NEAR_MISS_BAND: f32 = 36.0;
    /// Base perpendicular clearance for a near miss
    pub const NEAR_MISS_GAP: f32 = 18.0;

    /// Ticks after death before the action input restarts the run
    pub const RESTART_DELAY_TICKS: u32 = 36;

    /// Cosmetic caps
    pub const MAX_PARTICLES: usize = 200;
    pub const TRAIL_LEN: usize = 16;
}

/// Ease-out cubic: fast start, decelerating finish
#[inline]
pub fn ease_out_cubic(t: f32) -> f32 {
    1.0 - (1.0 - t).powi(3)
}
