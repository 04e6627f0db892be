//! Game state and entity types
//!
//! Everything a run owns lives in `GameState`. A restart replaces the whole
//! aggregate atomically; there is no partial-reset path.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::consts::*;
use crate::ease_out_cubic;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    /// Title screen, waiting for the first action
    Idle,
    /// Active gameplay
    Playing,
    /// Run ended; the action input restarts after a short delay
    Dead,
}

/// Rest position of the player's top edge on the floor
#[inline]
pub const fn floor_y() -> f32 {
    ARENA_H - GROUND_H - PLAYER_SIZE
}

/// Rest position of the player's top edge on the ceiling
#[inline]
pub const fn ceiling_y() -> f32 {
    GROUND_H
}

/// The player square
#[derive(Debug, Clone)]
pub struct Player {
    /// Left edge; never moves horizontally
    pub x: f32,
    /// Top edge
    pub y: f32,
    /// Rest position the current flip is heading for
    pub target_y: f32,
    pub on_ceiling: bool,
    /// 1.0 = settled on a surface, anything below = mid-flip
    pub flip_progress: f32,
    /// Cosmetic lean toward the current surface
    pub rotation: f32,
    /// Cosmetic squash applied on flip, recovers toward 1
    pub squash: f32,
    pub glow_pulse: f32,
    /// Recent centers, newest first
    pub trail: Vec<Vec2>,
}

impl Player {
    pub fn new() -> Self {
        Self {
            x: PLAYER_X,
            y: floor_y(),
            target_y: floor_y(),
            on_ceiling: false,
            flip_progress: 1.0,
            rotation: 0.0,
            squash: 1.0,
            glow_pulse: 0.0,
            trail: Vec::with_capacity(TRAIL_LEN),
        }
    }

    /// Center of the player square
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + PLAYER_SIZE / 2.0, self.y + PLAYER_SIZE / 2.0)
    }

    /// True once the last flip has fully settled
    #[inline]
    pub fn settled(&self) -> bool {
        self.flip_progress >= 1.0
    }

    /// Begin a flip toward the opposite surface. Callers must check
    /// `settled` first; re-entrant flips are rejected upstream.
    pub fn begin_flip(&mut self) {
        self.on_ceiling = !self.on_ceiling;
        self.target_y = if self.on_ceiling { ceiling_y() } else { floor_y() };
        self.flip_progress = 0.0;
        self.squash = 0.7;
    }

    /// Advance the flip interpolation by one tick. The eased position always
    /// starts from the opposite rest position, so a completed flip lands
    /// exactly on `target_y`.
    pub fn advance_flip(&mut self) {
        if self.settled() {
            return;
        }
        let step = 1.0 / (FLIP_DURATION_SECS * TICK_RATE);
        self.flip_progress = (self.flip_progress + step).min(1.0);
        let start = if self.on_ceiling { floor_y() } else { ceiling_y() };
        self.y = start + (self.target_y - start) * ease_out_cubic(self.flip_progress);
    }

    /// Record the current center into the trail ring
    pub fn record_trail(&mut self) {
        self.trail.insert(0, self.center());
        if self.trail.len() > TRAIL_LEN {
            self.trail.pop();
        }
    }
}

impl Default for Player {
    fn default() -> Self {
        Self::new()
    }
}

/// Sinusoidal height drift for moving obstacles
#[derive(Debug, Clone, Copy)]
pub struct Oscillation {
    pub phase: f32,
    pub amplitude: f32,
}

/// A wall segment attached to the floor or ceiling
#[derive(Debug, Clone)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    /// Hangs from the ceiling instead of standing on the floor
    pub ceiling: bool,
    /// Set once the near-miss bonus has been awarded
    pub near_miss_scored: bool,
    pub oscillation: Option<Oscillation>,
}

impl Obstacle {
    /// Advance one tick: scroll left and, for movers, drift the height.
    /// Floor variants track the drift with their top edge so they stay
    /// planted on the ground.
    pub fn advance(&mut self, speed: f32) {
        self.x -= speed;
        if let Some(osc) = &mut self.oscillation {
            osc.phase += 0.04;
            let drift = osc.phase.sin() * osc.amplitude;
            if self.ceiling {
                self.h = (self.h + drift * 0.3).clamp(OBS_MIN_H, OBS_MAX_H);
            } else {
                self.h = (self.h + drift * 0.05).clamp(OBS_MIN_H, OBS_MAX_H);
                self.y = ARENA_H - GROUND_H - self.h;
            }
        }
    }

    /// Fully scrolled off the left edge
    #[inline]
    pub fn offscreen(&self) -> bool {
        self.x + self.w < -40.0
    }
}

/// A bonus orb
#[derive(Debug, Clone)]
pub struct Orb {
    pub pos: Vec2,
    /// Cosmetic pulse phase
    pub pulse: f32,
}

impl Orb {
    pub fn advance(&mut self, speed: f32) {
        self.pos.x -= speed;
        self.pulse += 0.06;
    }

    #[inline]
    pub fn offscreen(&self) -> bool {
        self.pos.x < -20.0
    }
}

/// A cosmetic particle; never affects gameplay
#[derive(Debug, Clone)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, decreases by `decay` each tick
    pub life: f32,
    pub decay: f32,
    pub size: f32,
    pub color: (u8, u8, u8),
}

/// Lifetime counters for a single run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunStats {
    pub flips: u32,
    pub orbs: u32,
    pub near_misses: u32,
}

/// Complete simulation state for one session
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the current run was started from
    pub seed: u64,
    pub rng: Pcg32,
    pub phase: RunPhase,
    pub score: u64,
    pub combo: u32,
    /// Ticks left before the combo lapses
    pub combo_timer: u32,
    /// Current scroll speed, units per tick
    pub speed: f32,
    pub distance_px: f32,
    pub frame_count: u64,
    pub zone_index: usize,
    /// Ticks spent dead; gates the restart input
    pub dead_ticks: u32,
    pub stats: RunStats,
    /// Best score across sessions; updated in place when a run beats it
    pub best_score: u64,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub orbs: Vec<Orb>,
    /// Visual only
    pub particles: Vec<Particle>,
}

impl GameState {
    /// Create a session in the idle phase. `best_score` comes from
    /// persistence; the simulation only compares against it.
    pub fn new(seed: u64, best_score: u64) -> Self {
        Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            phase: RunPhase::Idle,
            score: 0,
            combo: 0,
            combo_timer: 0,
            speed: BASE_SPEED,
            distance_px: 0.0,
            frame_count: 0,
            zone_index: 0,
            dead_ticks: 0,
            stats: RunStats::default(),
            best_score,
            player: Player::new(),
            obstacles: Vec::new(),
            orbs: Vec::new(),
            particles: Vec::new(),
        }
    }

    /// Reset everything the run owns and enter `Playing`. The next run's
    /// seed is drawn from the current stream, so a whole session replays
    /// from its initial seed.
    pub fn start_run(&mut self) {
        self.seed = self.rng.random();
        self.rng = Pcg32::seed_from_u64(self.seed);
        self.phase = RunPhase::Playing;
        self.score = 0;
        self.combo = 0;
        self.combo_timer = 0;
        self.speed = BASE_SPEED;
        self.distance_px = 0.0;
        self.frame_count = 0;
        self.zone_index = 0;
        self.dead_ticks = 0;
        self.stats = RunStats::default();
        self.player = Player::new();
        self.obstacles.clear();
        self.orbs.clear();
        self.particles.clear();
        log::info!("run started (seed {})", self.seed);
    }
}
