//! App: terminal init, main loop, stepping and key handling.

use crate::Args;
use crate::input::{Action, key_to_action};
use crate::theme::Theme;
use crate::ui::{self, HostStatus};
use anyhow::{Context, Result};
use blockfall::{EngineConfig, Simulation};
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::DefaultTerminal;
use std::time::{Duration, Instant};
use tachyonfx::Effect;

const MIN_TIME_SCALE: f64 = 0.25;
const MAX_TIME_SCALE: f64 = 8.0;
/// Longest frame delta fed to the engine; a stalled terminal must not teleport pieces.
const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

pub struct App {
    args: Args,
    config: EngineConfig,
    theme: Theme,
    sim: Simulation,
    paused: bool,
    time_scale: f64,
    started: Instant,
    last_frame: Instant,
    /// Overflows + cycles seen so far; a rise starts the flash.
    wipes_seen: u64,
    /// TachyonFX flash for arena wipes (created when a wipe is seen).
    wipe_effect: Option<Effect>,
    /// Last time we processed the wipe effect (for delta).
    wipe_effect_process_time: Option<Instant>,
}

impl App {
    pub fn new(args: Args, config: EngineConfig, theme: Theme) -> Result<Self> {
        let sim = Simulation::new(args.width, args.height, config.clone())
            .context("invalid simulation settings")?;
        let now = Instant::now();
        Ok(Self {
            args,
            config,
            theme,
            sim,
            paused: false,
            time_scale: 1.0,
            started: now,
            last_frame: now,
            wipes_seen: 0,
            wipe_effect: None,
            wipe_effect_process_time: None,
        })
    }

    fn wipe_count(&self) -> u64 {
        let stats = self.sim.stats();
        stats.overflows + stats.cycles
    }

    fn reset(&mut self) {
        self.sim.reset();
        self.wipes_seen = self.wipe_count();
        self.wipe_effect = None;
        self.wipe_effect_process_time = None;
        self.started = Instant::now();
    }

    /// Returns false when the app should exit.
    fn apply_action(&mut self, action: Action) -> bool {
        match action {
            Action::Quit => return false,
            Action::Pause => self.paused = !self.paused,
            Action::Reset => self.reset(),
            Action::Faster => self.time_scale = (self.time_scale * 2.0).min(MAX_TIME_SCALE),
            Action::Slower => self.time_scale = (self.time_scale / 2.0).max(MIN_TIME_SCALE),
            Action::None => {}
        }
        true
    }

    /// Advance the engine by the frame's wall time, scaled.
    fn advance(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_frame).min(MAX_FRAME_DELTA);
        self.last_frame = now;
        if self.paused {
            return;
        }
        self.sim.step(dt.as_secs_f64() * self.time_scale);

        let wipes = self.wipe_count();
        if wipes > self.wipes_seen {
            log::debug!("arena wiped ({wipes} total)");
            if !self.args.no_animation {
                self.wipe_effect = Some(ui::wipe_flash(&self.theme));
                self.wipe_effect_process_time = None;
            }
        }
        self.wipes_seen = wipes;
    }

    pub fn run(&mut self) -> Result<()> {
        use crossterm::{
            execute,
            terminal::{
                EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode, size,
            },
        };

        enable_raw_mode()?;
        let mut stdout = std::io::stdout();
        execute!(stdout, EnterAlternateScreen)?;
        let mut terminal =
            ratatui::DefaultTerminal::new(ratatui::backend::CrosstermBackend::new(stdout))?;

        // Shrink the arena to the terminal; respect --width/--height when they fit
        let (term_cols, term_rows) = size()?;
        let (fit_w, fit_h) = ui::max_arena_cells_for_terminal(term_cols, term_rows);
        let width = self.args.width.min(fit_w);
        let height = self.args.height.min(fit_h);
        let result = self.resize_arena(width, height).and_then(|()| self.run_loop(&mut terminal));

        // Restore
        execute!(std::io::stdout(), LeaveAlternateScreen)?;
        disable_raw_mode()?;

        result
    }

    fn resize_arena(&mut self, width: u16, height: u16) -> Result<()> {
        if width as usize == self.sim.width() && height as usize == self.sim.height() {
            return Ok(());
        }
        log::info!(
            "terminal too small for {}x{}, using {width}x{height}",
            self.args.width,
            self.args.height
        );
        self.sim = Simulation::new(width, height, self.config.clone())
            .context("arena does not fit the terminal")?;
        Ok(())
    }

    fn run_loop(&mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        let frame_duration = Duration::from_secs_f64(1.0 / self.args.frame_rate.clamp(1.0, 240.0));
        self.last_frame = Instant::now();
        loop {
            let now = Instant::now();
            self.advance(now);

            let status = HostStatus {
                paused: self.paused,
                time_scale: self.time_scale,
                running_secs: now.saturating_duration_since(self.started).as_secs(),
            };
            terminal.draw(|f| {
                let area = f.area();
                ui::draw(
                    f,
                    &self.sim,
                    &self.theme,
                    status,
                    area,
                    &mut self.wipe_effect,
                    &mut self.wipe_effect_process_time,
                    now,
                );
            })?;

            let timeout = frame_duration.saturating_sub(now.elapsed());
            if event::poll(timeout)? {
                while event::poll(Duration::ZERO)? {
                    if let Event::Key(key) = event::read()? {
                        // Ignore repeats and releases.
                        if key.kind != KeyEventKind::Press {
                            continue;
                        }
                        if !self.apply_action(key_to_action(key)) {
                            return Ok(());
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn app(extra: &[&str]) -> App {
        let mut argv = vec!["blockfall"];
        argv.extend_from_slice(extra);
        let args = Args::parse_from(argv);
        let config = args.engine_config();
        App::new(args, config, Theme::default()).unwrap()
    }

    #[test]
    fn test_speed_is_clamped() {
        let mut app = app(&[]);
        for _ in 0..10 {
            app.apply_action(Action::Faster);
        }
        assert_eq!(app.time_scale, MAX_TIME_SCALE);
        for _ in 0..10 {
            app.apply_action(Action::Slower);
        }
        assert_eq!(app.time_scale, MIN_TIME_SCALE);
    }

    #[test]
    fn test_pause_freezes_the_engine() {
        let mut app = app(&["--seed", "1"]);
        assert!(app.apply_action(Action::Pause));
        let t0 = app.last_frame;
        app.advance(t0 + Duration::from_millis(100));
        assert_eq!(app.sim.stats().elapsed_secs, 0.0);
        assert_eq!(app.sim.active_count(), 0);
    }

    #[test]
    fn test_quit_and_reset() {
        let mut app = app(&["--seed", "1"]);
        let t0 = app.last_frame;
        app.advance(t0 + Duration::from_millis(50));
        assert_eq!(app.sim.active_count(), 1);
        assert!(app.apply_action(Action::Reset));
        assert_eq!(app.sim.active_count(), 0);
        assert!(!app.apply_action(Action::Quit));
    }

    #[test]
    fn test_wipe_starts_flash() {
        let mut app = app(&["--mode", "fill", "--width", "2", "--height", "1", "--pause-ms", "10"]);
        let mut t = app.last_frame;
        for _ in 0..40 {
            t += Duration::from_millis(100);
            app.advance(t);
        }
        assert!(app.sim.stats().cycles >= 1);
        assert!(app.wipe_effect.is_some() || app.wipes_seen >= 1);
        assert_eq!(app.wipes_seen, app.wipe_count());
    }

    #[test]
    fn test_resize_rebuilds_simulation() {
        let mut app = app(&["--width", "10", "--height", "20"]);
        app.resize_arena(6, 8).unwrap();
        assert_eq!((app.sim.width(), app.sim.height()), (6, 8));
    }
}
