//! Engine configuration and validation.

use crate::shape::ShapeKind;
use thiserror::Error;

/// How pieces enter the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnMode {
    /// No automatic spawning; the host calls `Simulation::spawn_piece`.
    Manual,
    /// One piece every `interval_ms` of simulated time (subject to the cap).
    Interval { interval_ms: u64 },
    /// Spawn as soon as the active set is below the cap (default cap 1).
    Immediate,
    /// Fill the arena from a fixed sequence, pause, wipe, repeat.
    DeterministicFill { pause_ms: u64 },
}

/// How fall distance is applied to piece positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Motion {
    /// Position moves by `fall_rate * dt` every step.
    Continuous,
    /// Distance accumulates; the piece moves only in whole cells.
    #[default]
    Stepped,
}

/// Horizontal spawn column rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Placement {
    #[default]
    Random,
    Centered,
}

/// Options that affect simulation behaviour (spawn policy, fall speed, placement, etc.).
#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    /// Cells per second.
    pub fall_rate: f64,
    /// Per-piece fall rate varies uniformly within `fall_rate * (1 ± spread)`; 0 disables.
    pub fall_rate_spread: f64,
    pub spawn_mode: SpawnMode,
    pub max_active_pieces: Option<usize>,
    pub motion: Motion,
    pub placement: Placement,
    /// Start row for spawned pieces; 0 or negative (above the arena).
    pub spawn_row: i32,
    /// Shapes drawn for random spawns.
    pub shapes: Vec<ShapeKind>,
    /// Remove full rows after each merge (never applied in fill mode).
    pub line_sweep: bool,
    /// RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fall_rate: 4.0,
            fall_rate_spread: 0.0,
            spawn_mode: SpawnMode::Immediate,
            max_active_pieces: None,
            motion: Motion::Stepped,
            placement: Placement::Random,
            spawn_row: 0,
            shapes: ShapeKind::TETROMINOES.to_vec(),
            line_sweep: true,
            seed: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("arena dimensions must be positive, got {width}x{height}")]
    ZeroDimension { width: u16, height: u16 },
    #[error("shape catalog is empty")]
    EmptyCatalog,
    #[error("fall rate must be a positive finite number, got {0}")]
    InvalidFallRate(f64),
    #[error("fall rate spread must be within [0, 1), got {0}")]
    InvalidSpread(f64),
    #[error("spawn interval must be at least 1 ms")]
    ZeroInterval,
    #[error("max active pieces must be at least 1")]
    ZeroCap,
    #[error("spawn row must be 0 or negative, got {0}")]
    SpawnRowBelowTop(i32),
    #[error("shape {shape} ({w}x{h}) does not fit a {width}x{height} arena")]
    ShapeTooLarge {
        shape: &'static str,
        w: u16,
        h: u16,
        width: u16,
        height: u16,
    },
}

impl EngineConfig {
    /// Check the configuration against an arena size.
    pub fn validate(&self, width: u16, height: u16) -> Result<(), ConfigError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::ZeroDimension { width, height });
        }
        if self.shapes.is_empty() {
            return Err(ConfigError::EmptyCatalog);
        }
        if !self.fall_rate.is_finite() || self.fall_rate <= 0.0 {
            return Err(ConfigError::InvalidFallRate(self.fall_rate));
        }
        if !(0.0..1.0).contains(&self.fall_rate_spread) {
            return Err(ConfigError::InvalidSpread(self.fall_rate_spread));
        }
        if matches!(self.spawn_mode, SpawnMode::Interval { interval_ms: 0 }) {
            return Err(ConfigError::ZeroInterval);
        }
        if self.max_active_pieces == Some(0) {
            return Err(ConfigError::ZeroCap);
        }
        if self.spawn_row > 0 {
            return Err(ConfigError::SpawnRowBelowTop(self.spawn_row));
        }
        // fill mode only ever uses the filler pieces
        let fill = matches!(self.spawn_mode, SpawnMode::DeterministicFill { .. });
        let shapes: &[ShapeKind] = if fill { &[ShapeKind::Mono] } else { &self.shapes };
        for kind in shapes {
            let (w, h) = (kind.width(), kind.height());
            if w > width || h > height {
                return Err(ConfigError::ShapeTooLarge {
                    shape: kind.name(),
                    w,
                    h,
                    width,
                    height,
                });
            }
        }
        Ok(())
    }

    /// Effective concurrency cap for the active set.
    pub fn active_cap(&self) -> usize {
        match (self.spawn_mode, self.max_active_pieces) {
            (_, Some(cap)) => cap,
            (SpawnMode::Immediate | SpawnMode::DeterministicFill { .. }, None) => 1,
            (SpawnMode::Manual | SpawnMode::Interval { .. }, None) => usize::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert_eq!(EngineConfig::default().validate(10, 20), Ok(()));
    }

    #[test]
    fn test_rejects_zero_dimensions() {
        let c = EngineConfig::default();
        assert!(matches!(c.validate(0, 20), Err(ConfigError::ZeroDimension { .. })));
        assert!(matches!(c.validate(10, 0), Err(ConfigError::ZeroDimension { .. })));
    }

    #[test]
    fn test_rejects_bad_fields() {
        let base = EngineConfig::default();
        let cases = [
            (EngineConfig { shapes: vec![], ..base.clone() }, ConfigError::EmptyCatalog),
            (EngineConfig { fall_rate: 0.0, ..base.clone() }, ConfigError::InvalidFallRate(0.0)),
            (EngineConfig { fall_rate_spread: 1.0, ..base.clone() }, ConfigError::InvalidSpread(1.0)),
            (
                EngineConfig { spawn_mode: SpawnMode::Interval { interval_ms: 0 }, ..base.clone() },
                ConfigError::ZeroInterval,
            ),
            (EngineConfig { max_active_pieces: Some(0), ..base.clone() }, ConfigError::ZeroCap),
            (EngineConfig { spawn_row: 2, ..base.clone() }, ConfigError::SpawnRowBelowTop(2)),
        ];
        for (config, expected) in cases {
            assert_eq!(config.validate(10, 20), Err(expected));
        }
        let nan = EngineConfig { fall_rate: f64::NAN, ..base };
        assert!(matches!(nan.validate(10, 20), Err(ConfigError::InvalidFallRate(_))));
    }

    #[test]
    fn test_rejects_shape_wider_than_arena() {
        let c = EngineConfig::default();
        let err = c.validate(3, 20).unwrap_err();
        assert!(matches!(err, ConfigError::ShapeTooLarge { shape: "I", .. }));
        // filler pieces fit anything
        let fill = EngineConfig {
            spawn_mode: SpawnMode::DeterministicFill { pause_ms: 0 },
            ..EngineConfig::default()
        };
        assert_eq!(fill.validate(1, 1), Ok(()));
    }

    #[test]
    fn test_active_cap_defaults() {
        let mut c = EngineConfig::default();
        assert_eq!(c.active_cap(), 1);
        c.spawn_mode = SpawnMode::Interval { interval_ms: 100 };
        assert_eq!(c.active_cap(), usize::MAX);
        c.max_active_pieces = Some(3);
        assert_eq!(c.active_cap(), 3);
    }
}
