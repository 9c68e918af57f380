//! Blockfall — falling-block ambient animation in the terminal.

mod app;
mod input;
mod theme;
mod ui;

use anyhow::{Context, Result};
use app::App;
use blockfall::{EngineConfig, Motion, Placement, ShapeKind, SpawnMode};
use clap::{Parser, ValueEnum};
use std::path::Path;

fn main() -> Result<()> {
    let args = Args::parse();
    if let Some(path) = args.log_file.as_deref() {
        init_logging(path)?;
    }
    let theme = theme::Theme::load(args.theme.as_deref(), args.palette).unwrap_or_else(|e| {
        log::warn!("theme not loaded, using defaults: {e}");
        theme::Theme::default()
    });
    let config = args.engine_config();
    let mut app = App::new(args, config, theme)?;
    app.run()?;
    Ok(())
}

/// Log to a file; stderr would tear the alternate screen.
fn init_logging(path: &Path) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("cannot create log file {}", path.display()))?;
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

/// Falling-block ambient animation in the terminal.
#[derive(Debug, Parser)]
#[command(
    name = "blockfall",
    version,
    about = "Falling-block grid animation in the terminal. Pieces drop, stack, clear rows and wipe the arena when it overflows.",
    long_about = "Blockfall runs a falling-block grid simulation as a terminal animation.\n\n\
        Pieces spawn on their own (no steering), fall at a fixed rate, settle on the floor or \
        on other cells and full rows are swept. When a new piece has no room the arena is wiped. \
        In fill mode the arena is filled completely, held for a pause, then wiped.\n\n\
        KEYS:\n  p / Space   Pause     r           Reset     + / -       Faster / slower\n  q / Esc     Quit"
)]
pub struct Args {
    /// Spawn policy: interval (timer), immediate (one in, one out), fill (fill then pause), manual (nothing spawns).
    #[arg(short, long, default_value = "immediate")]
    pub mode: ModeArg,

    /// Arena width in columns.
    #[arg(long, default_value = "12", value_name = "COLS")]
    pub width: u16,

    /// Arena height in rows.
    #[arg(long, default_value = "22", value_name = "ROWS")]
    pub height: u16,

    /// Fall speed in cells per second.
    #[arg(short, long, default_value = "4.0", value_name = "RATE")]
    pub fall_rate: f64,

    /// Per-piece fall speed variation as a fraction (0 = all pieces equal).
    #[arg(long, default_value = "0.0", value_name = "FRACTION")]
    pub spread: f64,

    /// In mode 'interval': time between spawns.
    #[arg(long, default_value = "600", value_name = "MS")]
    pub spawn_interval_ms: u64,

    /// Cap on simultaneously falling pieces.
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u16).range(1..=64))]
    pub max_active: Option<u16>,

    /// In mode 'fill': how long the full arena is shown before it is wiped.
    #[arg(long, default_value = "1500", value_name = "MS")]
    pub pause_ms: u64,

    /// Motion: stepped (whole cells) or continuous (smooth).
    #[arg(long, default_value = "stepped")]
    pub motion: MotionArg,

    /// Spawn in the centre column instead of a random one.
    #[arg(long)]
    pub centered: bool,

    /// Start row for new pieces; negative rows are above the arena.
    #[arg(long, default_value = "0", value_name = "ROW", allow_hyphen_values = true)]
    pub spawn_row: i32,

    /// Keep full rows instead of sweeping them.
    #[arg(long)]
    pub no_line_sweep: bool,

    /// Only spawn these shapes (comma separated: i,o,t,s,z,j,l,mono,domino).
    #[arg(long, value_delimiter = ',', value_name = "SHAPES")]
    pub shapes: Vec<ShapeArg>,

    /// RNG seed for a reproducible animation.
    #[arg(long, value_name = "SEED")]
    pub seed: Option<u64>,

    /// Target render frames per second.
    #[arg(long, default_value = "60.0", value_name = "RATE")]
    pub frame_rate: f64,

    /// Path to theme file (btop-style theme[key]=\"value\"). Uses built-in colours if not set.
    #[arg(short, long, value_name = "FILE")]
    pub theme: Option<std::path::PathBuf>,

    /// Colour palette: normal (theme), high-contrast, or colorblind.
    #[arg(long, default_value = "normal")]
    pub palette: Palette,

    /// Disable the flash when the arena is wiped.
    #[arg(long)]
    pub no_animation: bool,

    /// Write debug logs to this file (RUST_LOG overrides the level).
    #[arg(long, value_name = "FILE")]
    pub log_file: Option<std::path::PathBuf>,
}

impl Args {
    /// Map CLI options onto the engine configuration.
    pub fn engine_config(&self) -> EngineConfig {
        let spawn_mode = match self.mode {
            ModeArg::Interval => SpawnMode::Interval {
                interval_ms: self.spawn_interval_ms,
            },
            ModeArg::Immediate => SpawnMode::Immediate,
            ModeArg::Fill => SpawnMode::DeterministicFill {
                pause_ms: self.pause_ms,
            },
            ModeArg::Manual => SpawnMode::Manual,
        };
        let defaults = EngineConfig::default();
        EngineConfig {
            fall_rate: self.fall_rate,
            fall_rate_spread: self.spread,
            spawn_mode,
            max_active_pieces: self.max_active.map(usize::from),
            motion: match self.motion {
                MotionArg::Stepped => Motion::Stepped,
                MotionArg::Continuous => Motion::Continuous,
            },
            placement: if self.centered {
                Placement::Centered
            } else {
                Placement::Random
            },
            spawn_row: self.spawn_row,
            shapes: if self.shapes.is_empty() {
                defaults.shapes
            } else {
                self.shapes.iter().map(|s| s.kind()).collect()
            },
            line_sweep: !self.no_line_sweep,
            seed: self.seed,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ModeArg {
    Interval,
    #[default]
    Immediate,
    Fill,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MotionArg {
    #[default]
    Stepped,
    Continuous,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ShapeArg {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
    Mono,
    Domino,
}

impl ShapeArg {
    fn kind(self) -> ShapeKind {
        match self {
            Self::I => ShapeKind::I,
            Self::O => ShapeKind::O,
            Self::T => ShapeKind::T,
            Self::S => ShapeKind::S,
            Self::Z => ShapeKind::Z,
            Self::J => ShapeKind::J,
            Self::L => ShapeKind::L,
            Self::Mono => ShapeKind::Mono,
            Self::Domino => ShapeKind::Domino,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Palette {
    #[default]
    Normal,

    #[value(alias = "highcontrast", alias = "contrast")]
    HighContrast,

    #[value(alias = "colourblind")]
    Colorblind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_args_build_valid_config() {
        let args = Args::parse_from(["blockfall"]);
        let config = args.engine_config();
        assert_eq!(config.spawn_mode, SpawnMode::Immediate);
        assert_eq!(config.validate(args.width, args.height), Ok(()));
    }

    #[test]
    fn test_fill_mode_args() {
        let args = Args::parse_from([
            "blockfall", "--mode", "fill", "--pause-ms", "250", "--shapes", "o,domino",
            "--spawn-row", "-2",
        ]);
        let config = args.engine_config();
        assert_eq!(config.spawn_mode, SpawnMode::DeterministicFill { pause_ms: 250 });
        assert_eq!(config.shapes, vec![ShapeKind::O, ShapeKind::Domino]);
        assert_eq!(config.spawn_row, -2);
    }

    #[test]
    fn test_max_active_range() {
        assert!(Args::try_parse_from(["blockfall", "--max-active", "0"]).is_err());
        let args = Args::parse_from(["blockfall", "--max-active", "5"]);
        assert_eq!(args.engine_config().max_active_pieces, Some(5));
    }
}
