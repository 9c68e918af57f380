//! Spawn scheduler: decides when pieces enter and where.
//!
//! Four policies share one interface, [`Scheduler::tick`], which turns elapsed
//! time and the active-set size into a list of [`Directive`]s for the engine.
//! The deterministic fill policy is an explicit two-phase state machine
//! ([`FillPhase`]) rather than a set of flags.

use crate::config::{EngineConfig, Placement, SpawnMode};
use crate::shape::ShapeKind;
use log::debug;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// A fully resolved spawn: shape, start cell and this piece's fall rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRequest {
    pub kind: ShapeKind,
    pub x: i32,
    pub y: i32,
    pub fall_rate: f64,
}

/// What the engine should do this step, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Directive {
    Spawn(SpawnRequest),
    WipeArena,
}

/// One entry of the deterministic fill sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillEntry {
    pub kind: ShapeKind,
    pub x: i32,
    pub y: i32,
}

/// Entries covering the arena left to right, top to bottom: a domino per two
/// columns, a mono for an odd last column. Every entry starts at `start_row`.
pub fn fill_sequence(width: u16, height: u16, start_row: i32) -> Vec<FillEntry> {
    let width = i32::from(width);
    let mut seq = Vec::with_capacity(height as usize * (width as usize).div_ceil(2));
    for _row in 0..height {
        let mut x = 0;
        while x < width {
            let kind = if width - x >= 2 {
                ShapeKind::Domino
            } else {
                ShapeKind::Mono
            };
            seq.push(FillEntry {
                kind,
                x,
                y: start_row,
            });
            x += i32::from(kind.width());
        }
    }
    seq
}

/// Top-level phase of the fill cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FillPhase {
    /// Spawning sequence entries; `cursor` is the next entry.
    Filling { cursor: usize },
    /// Arena complete; wipe when `remaining` seconds run out.
    Pausing { remaining: f64 },
}

/// Side effect of one fill transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillEvent {
    Spawn(FillEntry),
    Paused,
    Restarted,
}

impl FillPhase {
    /// Transition function. `len` is the sequence length; `active` the number of
    /// falling pieces; `pause` the pause duration in seconds.
    pub fn next(self, dt: f64, active: usize, len: usize, pause: f64) -> (Self, Option<FillEvent>) {
        match self {
            Self::Filling { cursor } if active > 0 => (Self::Filling { cursor }, None),
            Self::Filling { cursor } if cursor >= len => {
                (Self::Pausing { remaining: pause }, Some(FillEvent::Paused))
            }
            // entry lookup is done by the caller, which owns the sequence
            Self::Filling { cursor } => (Self::Filling { cursor: cursor + 1 }, None),
            Self::Pausing { remaining } if remaining - dt <= 0.0 => {
                (Self::Filling { cursor: 0 }, Some(FillEvent::Restarted))
            }
            Self::Pausing { remaining } => (Self::Pausing { remaining: remaining - dt }, None),
        }
    }
}

/// Fill/pause cycle over a precomputed sequence.
#[derive(Debug, Clone)]
pub struct FillCycle {
    sequence: Vec<FillEntry>,
    phase: FillPhase,
    pause_secs: f64,
    width: u16,
    height: u16,
    start_row: i32,
}

impl FillCycle {
    pub fn new(width: u16, height: u16, start_row: i32, pause_ms: u64) -> Self {
        Self {
            sequence: fill_sequence(width, height, start_row),
            phase: FillPhase::Filling { cursor: 0 },
            pause_secs: pause_ms as f64 / 1000.0,
            width,
            height,
            start_row,
        }
    }

    pub fn phase(&self) -> FillPhase {
        self.phase
    }

    pub fn sequence(&self) -> &[FillEntry] {
        &self.sequence
    }

    /// Apply one transition and report its effect.
    pub fn advance(&mut self, dt: f64, active: usize) -> Option<FillEvent> {
        let before = self.phase;
        let (phase, event) = before.next(dt, active, self.sequence.len(), self.pause_secs);
        self.phase = phase;
        match (before, event) {
            (FillPhase::Filling { cursor }, None) if phase != before => {
                Some(FillEvent::Spawn(self.sequence[cursor]))
            }
            (_, Some(FillEvent::Paused)) => {
                debug!("fill sequence exhausted, pausing for {:.2}s", self.pause_secs);
                event
            }
            (_, Some(FillEvent::Restarted)) => {
                self.regenerate();
                debug!("pause over, restarting fill cycle");
                event
            }
            _ => event,
        }
    }

    /// Back to the first entry with a fresh sequence.
    pub fn restart(&mut self) {
        self.regenerate();
        self.phase = FillPhase::Filling { cursor: 0 };
    }

    fn regenerate(&mut self) {
        self.sequence = fill_sequence(self.width, self.height, self.start_row);
    }
}

#[derive(Debug, Clone)]
enum Policy {
    Manual,
    Interval { interval: f64, elapsed: f64 },
    Immediate,
    Fill(FillCycle),
}

/// Spawn scheduler. Owns the RNG used for shape choice, placement and fall rates.
#[derive(Debug, Clone)]
pub struct Scheduler {
    policy: Policy,
    rng: ChaCha8Rng,
    shapes: Vec<ShapeKind>,
    placement: Placement,
    spawn_row: i32,
    fall_rate: f64,
    spread: f64,
    width: u16,
    cap: usize,
}

impl Scheduler {
    pub fn new(width: u16, height: u16, config: &EngineConfig) -> Self {
        let policy = match config.spawn_mode {
            SpawnMode::Manual => Policy::Manual,
            SpawnMode::Interval { interval_ms } => {
                let interval = interval_ms as f64 / 1000.0;
                // first piece enters on the first tick
                Policy::Interval {
                    interval,
                    elapsed: interval,
                }
            }
            SpawnMode::Immediate => Policy::Immediate,
            SpawnMode::DeterministicFill { pause_ms } => {
                Policy::Fill(FillCycle::new(width, height, config.spawn_row, pause_ms))
            }
        };
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            policy,
            rng,
            shapes: config.shapes.clone(),
            placement: config.placement,
            spawn_row: config.spawn_row,
            fall_rate: config.fall_rate,
            spread: config.fall_rate_spread,
            width,
            cap: config.active_cap(),
        }
    }

    /// Current fill phase, if the fill policy is in use.
    pub fn phase(&self) -> Option<FillPhase> {
        match &self.policy {
            Policy::Fill(cycle) => Some(cycle.phase()),
            _ => None,
        }
    }

    /// Fill phase and sequence length, if the fill policy is in use.
    pub fn fill_progress(&self) -> Option<(FillPhase, usize)> {
        match &self.policy {
            Policy::Fill(cycle) => Some((cycle.phase(), cycle.sequence().len())),
            _ => None,
        }
    }

    pub fn is_fill(&self) -> bool {
        matches!(self.policy, Policy::Fill(_))
    }

    /// Decide this step's spawns given `dt` seconds and `active` falling pieces.
    pub fn tick(&mut self, dt: f64, active: usize) -> Vec<Directive> {
        let mut out = Vec::new();
        match &mut self.policy {
            Policy::Manual => {}
            Policy::Interval { interval, elapsed } => {
                *elapsed += dt;
                // at most one spawn per tick; missed intervals are dropped
                if *interval > 0.0 && *elapsed >= *interval {
                    *elapsed %= *interval;
                    if active < self.cap {
                        out.push(Directive::Spawn(self.random_request()));
                    }
                }
            }
            Policy::Immediate => {
                if active < self.cap {
                    out.push(Directive::Spawn(self.random_request()));
                }
            }
            Policy::Fill(cycle) => match cycle.advance(dt, active) {
                Some(FillEvent::Spawn(entry)) => {
                    let fall_rate = self.sample_fall_rate();
                    out.push(Directive::Spawn(SpawnRequest {
                        kind: entry.kind,
                        x: entry.x,
                        y: entry.y,
                        fall_rate,
                    }));
                }
                Some(FillEvent::Restarted) => out.push(Directive::WipeArena),
                Some(FillEvent::Paused) | None => {}
            },
        }
        out
    }

    /// Resolve a host-chosen spawn (fall rate still comes from the config).
    pub fn request(&mut self, kind: ShapeKind, x: i32, y: i32) -> SpawnRequest {
        SpawnRequest {
            kind,
            x,
            y,
            fall_rate: self.sample_fall_rate(),
        }
    }

    /// Called after an overflow wipe.
    pub fn on_overflow(&mut self) {
        if let Policy::Fill(cycle) = &mut self.policy {
            cycle.restart();
        }
    }

    /// Restart timers and the fill cycle; the RNG stream continues.
    pub fn reset(&mut self) {
        match &mut self.policy {
            Policy::Interval { interval, elapsed } => *elapsed = *interval,
            Policy::Fill(cycle) => cycle.restart(),
            Policy::Manual | Policy::Immediate => {}
        }
    }

    fn random_request(&mut self) -> SpawnRequest {
        let kind = self
            .shapes
            .choose(&mut self.rng)
            .copied()
            .unwrap_or(ShapeKind::Mono);
        let max_x = self.width.saturating_sub(kind.width()) as i32;
        let x = match self.placement {
            Placement::Random => self.rng.gen_range(0..=max_x),
            Placement::Centered => max_x / 2,
        };
        SpawnRequest {
            kind,
            x,
            y: self.spawn_row,
            fall_rate: self.sample_fall_rate(),
        }
    }

    fn sample_fall_rate(&mut self) -> f64 {
        if self.spread > 0.0 {
            self.fall_rate * self.rng.gen_range((1.0 - self.spread)..=(1.0 + self.spread))
        } else {
            self.fall_rate
        }
    }
}
