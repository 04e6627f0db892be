//! Per-tick gameplay event descriptors
//!
//! The simulation never touches the screen, audio, or haptics. It records
//! what happened during a tick and hands the list to the caller; the
//! presentation layer decides what (if anything) to do with each entry.
//! Dropping events has no effect on the simulation.

use super::state::RunStats;

/// A discrete gameplay event produced during a single tick
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    /// A gravity flip was accepted
    Flipped { on_ceiling: bool },
    /// An orb was consumed; `points` already includes the combo multiplier
    OrbCollected { combo: u32, points: u64 },
    /// Squeezed past an obstacle without touching it
    NearMiss { bonus: u64 },
    /// Speed crossed into a new zone for the first time this run
    ZoneEntered { zone: usize },
    /// The run ended
    Died {
        score: u64,
        stats: RunStats,
        new_best: bool,
    },
}
