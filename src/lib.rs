//! Blockfall — discrete-grid falling-block simulation engine.
//!
//! A [`Simulation`] owns a fixed-size [`Arena`], zero or more falling
//! [`Piece`]s and a spawn [`Scheduler`]. Hosts call [`Simulation::step`] with
//! the elapsed time and read [`Simulation::arena_snapshot`] and
//! [`Simulation::active_pieces`] to render. The engine performs no I/O.
//!
//! ```
//! use blockfall::{EngineConfig, Simulation, SpawnMode};
//!
//! let config = EngineConfig {
//!     spawn_mode: SpawnMode::Interval { interval_ms: 500 },
//!     seed: Some(42),
//!     ..EngineConfig::default()
//! };
//! let mut sim = Simulation::new(12, 22, config).unwrap();
//! for _ in 0..600 {
//!     sim.step(1.0 / 60.0);
//! }
//! assert!(sim.stats().pieces_spawned > 0);
//! ```

pub mod arena;
pub mod collision;
pub mod config;
pub mod engine;
pub mod piece;
pub mod scheduler;
pub mod shape;

pub use arena::{Arena, ArenaSnapshot, Cell};
pub use collision::{collides, merge};
pub use config::{ConfigError, EngineConfig, Motion, Placement, SpawnMode};
pub use engine::{SimStats, Simulation, SpawnOutcome};
pub use piece::{Piece, PieceSnapshot};
pub use scheduler::{FillEntry, FillPhase, Scheduler, fill_sequence};
pub use shape::{COLOR_TAGS, ColorTag, ShapeKind};
