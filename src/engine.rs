//! Simulation context: arena, active pieces, scheduler and the step function.

use crate::arena::{Arena, ArenaSnapshot};
use crate::collision::{collides, merge};
use crate::config::{ConfigError, EngineConfig, Motion};
use crate::piece::{Piece, PieceSnapshot};
use crate::scheduler::{Directive, FillPhase, Scheduler, SpawnRequest};
use crate::shape::ShapeKind;
use log::{debug, info, trace};

/// Counters for hosts that want to display progress.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SimStats {
    pub pieces_spawned: u64,
    pub pieces_merged: u64,
    pub rows_cleared: u64,
    /// Arena wipes caused by spawn-time overflow.
    pub overflows: u64,
    /// Completed fill/pause cycles.
    pub cycles: u64,
    pub elapsed_secs: f64,
}

/// Result of admitting a new piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnOutcome {
    /// The piece fit and is now falling.
    Spawned,
    /// The piece collided at spawn; the arena was wiped and the piece admitted.
    Overflowed,
    /// The piece collided even against an empty arena and was discarded.
    Rejected,
    /// Fill mode only: the piece collided, the arena was wiped, the fill
    /// cycle restarted at its first entry and the piece was discarded.
    FillRestarted,
}

/// Owned simulation context. Hosts construct one and call [`Simulation::step`]
/// once per frame.
#[derive(Debug, Clone)]
pub struct Simulation {
    config: EngineConfig,
    arena: Arena,
    active: Vec<Piece>,
    scheduler: Scheduler,
    stats: SimStats,
}

impl Simulation {
    pub fn new(width: u16, height: u16, config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate(width, height)?;
        info!(
            "simulation {}x{} spawn={:?} motion={:?} fall_rate={}",
            width, height, config.spawn_mode, config.motion, config.fall_rate
        );
        Ok(Self {
            arena: Arena::new(width, height),
            active: Vec::new(),
            scheduler: Scheduler::new(width, height, &config),
            stats: SimStats::default(),
            config,
        })
    }

    pub fn width(&self) -> usize {
        self.arena.width()
    }

    pub fn height(&self) -> usize {
        self.arena.height()
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn stats(&self) -> SimStats {
        self.stats
    }

    /// Fill/pause phase when running the deterministic fill policy.
    pub fn phase(&self) -> Option<FillPhase> {
        self.scheduler.phase()
    }

    /// Fill phase together with the length of the fill sequence.
    pub fn fill_progress(&self) -> Option<(FillPhase, usize)> {
        self.scheduler.fill_progress()
    }

    pub fn arena(&self) -> &Arena {
        &self.arena
    }

    pub fn arena_snapshot(&self) -> ArenaSnapshot {
        self.arena.snapshot()
    }

    pub fn active_pieces(&self) -> Vec<PieceSnapshot> {
        self.active.iter().map(Piece::snapshot).collect()
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Empty arena and active set, restart the scheduler. Counters are kept.
    pub fn reset(&mut self) {
        self.arena.clear();
        self.active.clear();
        self.scheduler.reset();
        debug!("simulation reset by host");
    }

    /// Admit a piece chosen by the host, applying the overflow policy.
    /// In fill mode an overflowing piece is dropped with the restarted cycle.
    pub fn spawn_piece(&mut self, kind: ShapeKind, x: i32, y: i32) -> SpawnOutcome {
        let request = self.scheduler.request(kind, x, y);
        self.admit(request)
    }

    /// Advance the simulation by `delta_secs` of time.
    pub fn step(&mut self, delta_secs: f64) {
        let dt = if delta_secs.is_finite() && delta_secs > 0.0 {
            delta_secs
        } else {
            0.0
        };
        self.stats.elapsed_secs += dt;

        for directive in self.scheduler.tick(dt, self.active.len()) {
            match directive {
                Directive::Spawn(request) => {
                    self.admit(request);
                }
                Directive::WipeArena => {
                    self.arena.clear();
                    self.active.clear();
                    self.stats.cycles += 1;
                }
            }
        }

        let sweep = self.config.line_sweep && !self.scheduler.is_fill();
        let pieces = std::mem::take(&mut self.active);
        let mut retained = Vec::with_capacity(pieces.len());
        for mut piece in pieces {
            let landed = match self.config.motion {
                Motion::Continuous => advance_continuous(&self.arena, &mut piece, dt),
                Motion::Stepped => advance_stepped(&self.arena, &mut piece, dt),
            };
            if !landed {
                retained.push(piece);
                continue;
            }
            let written = merge(&mut self.arena, &piece);
            self.stats.pieces_merged += 1;
            trace!(
                "merged {} at {:?} ({} cells)",
                piece.kind.name(),
                piece.grid_origin(),
                written
            );
            if sweep {
                let cleared = self.arena.sweep_full_rows();
                if cleared > 0 {
                    trace!("swept {} rows", cleared);
                    self.stats.rows_cleared += u64::from(cleared);
                }
            }
        }
        self.active = retained;
    }

    fn admit(&mut self, request: SpawnRequest) -> SpawnOutcome {
        let piece = Piece::new(request.kind, request.x, request.y, request.fall_rate);
        self.stats.pieces_spawned += 1;
        if !collides(&self.arena, &piece) {
            self.active.push(piece);
            return SpawnOutcome::Spawned;
        }

        debug!(
            "overflow: {} at ({}, {}) collides on spawn, wiping arena",
            request.kind.name(),
            request.x,
            request.y
        );
        self.arena.clear();
        self.active.clear();
        self.scheduler.on_overflow();
        self.stats.overflows += 1;
        if self.scheduler.is_fill() {
            // the cycle starts over from its first entry
            return SpawnOutcome::FillRestarted;
        }
        if collides(&self.arena, &piece) {
            return SpawnOutcome::Rejected;
        }
        self.active.push(piece);
        SpawnOutcome::Overflowed
    }
}

/// Move by `fall_rate * dt` in sub-moves of at most one cell so no row is
/// skipped. Returns true if the piece landed (position rolled back).
fn advance_continuous(arena: &Arena, piece: &mut Piece, dt: f64) -> bool {
    let mut remaining = piece.fall_rate * dt;
    while remaining > 0.0 {
        let delta = remaining.min(1.0);
        let prev = piece.y;
        piece.y += delta;
        if collides(arena, piece) {
            piece.y = prev;
            return true;
        }
        remaining -= delta;
    }
    false
}

/// Accumulate distance and move one whole cell at a time.
/// Returns true if the next cell down is blocked.
fn advance_stepped(arena: &Arena, piece: &mut Piece, dt: f64) -> bool {
    piece.pending += piece.fall_rate * dt;
    while piece.pending >= 1.0 {
        piece.pending -= 1.0;
        piece.y += 1.0;
        if collides(arena, piece) {
            piece.y -= 1.0;
            return true;
        }
    }
    false
}
