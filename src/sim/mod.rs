//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering or platform dependencies
//!
//! Side effects leave the module as `GameEvent` lists returned by `tick`;
//! presentation reads state between ticks and never mutates it.

pub mod collision;
pub mod difficulty;
pub mod events;
pub mod state;
pub mod tick;

pub use collision::{lethal_overlap, near_miss_gap, orb_within_pickup};
pub use difficulty::{ZONES, Zone, speed_at, zone_for_speed};
pub use events::GameEvent;
pub use state::{
    GameState, Obstacle, Orb, Oscillation, Particle, Player, RunPhase, RunStats, ceiling_y,
    floor_y,
};
pub use tick::{TickInput, tick};
