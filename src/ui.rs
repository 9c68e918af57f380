//! Layout and drawing: arena, falling pieces, sidebar, pause overlay, wipe flash.

use crate::theme::Theme;
use blockfall::{Cell, FillPhase, Simulation, SpawnMode};
use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Gauge, Paragraph, Widget};
use std::time::Instant;
use tachyonfx::{Duration as TfxDuration, Effect, EffectRenderer, Interpolation, fx};

/// Each arena cell is drawn two terminal columns wide so cells look square.
const CELL_WIDTH: u16 = 2;
const CELL_HEIGHT: u16 = 1;
const SIDEBAR_WIDTH: u16 = 26;

/// Duration of the arena-wipe flash (TachyonFX) in ms.
const WIPE_FLASH_MS: u32 = 350;

/// Arena size in terminal cells including the border.
fn arena_pixel_size(width: u16, height: u16) -> (u16, u16) {
    (width * CELL_WIDTH + 2, height * CELL_HEIGHT + 2)
}

/// Largest arena (columns, rows) whose board + border + sidebar fit the terminal.
pub fn max_arena_cells_for_terminal(term_cols: u16, term_rows: u16) -> (u16, u16) {
    let max_w = term_cols.saturating_sub(2).saturating_sub(SIDEBAR_WIDTH) / CELL_WIDTH;
    let max_h = term_rows.saturating_sub(2) / CELL_HEIGHT;
    (max_w.max(1), max_h.max(1))
}

/// Host state the sidebar shows besides the simulation itself.
#[derive(Debug, Clone, Copy)]
pub struct HostStatus {
    pub paused: bool,
    pub time_scale: f64,
    pub running_secs: u64,
}

/// Board rect (inside the border) for the given area; matches `draw` layout.
fn board_rect(area: Rect, sim: &Simulation) -> Rect {
    let (pw, ph) = arena_pixel_size(sim.width() as u16, sim.height() as u16);
    let total_w = pw + SIDEBAR_WIDTH;
    let x = area.x + area.width.saturating_sub(total_w) / 2;
    let y = area.y + area.height.saturating_sub(ph) / 2;
    Rect {
        x: x + 1,
        y: y + 1,
        width: pw.saturating_sub(2).min(area.width.saturating_sub(2)),
        height: ph.saturating_sub(2).min(area.height.saturating_sub(2)),
    }
}

/// Draw the arena, pieces and sidebar, then the pause overlay and wipe flash.
/// `wipe_effect` is processed with the time since `wipe_process_time`.
pub fn draw(
    frame: &mut Frame,
    sim: &Simulation,
    theme: &Theme,
    status: HostStatus,
    area: Rect,
    wipe_effect: &mut Option<Effect>,
    wipe_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let (pw, ph) = arena_pixel_size(sim.width() as u16, sim.height() as u16);
    let total_w = pw + SIDEBAR_WIDTH;

    let horiz = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(total_w),
            Constraint::Fill(1),
        ])
        .split(area);
    let vert = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(ph),
            Constraint::Fill(1),
        ])
        .split(horiz[1]);
    let inner = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(pw), Constraint::Length(SIDEBAR_WIDTH)])
        .split(vert[1]);

    draw_arena(frame, sim, theme, inner[0]);
    draw_sidebar(frame, sim, theme, status, inner[1]);
    if status.paused {
        draw_pause_overlay(frame, theme, area);
    }
    apply_wipe_effect(frame, sim, area, wipe_effect, wipe_process_time, now);
}

fn draw_arena(frame: &mut Frame, sim: &Simulation, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg))
        .title(Span::styled(" Blockfall ", theme.title));
    let board = block.inner(area);
    block.render(area, frame.buffer_mut());

    let snapshot = sim.arena_snapshot();
    let buf = frame.buffer_mut();
    let mut paint = |x: i32, y: i32, color: Color, symbol: &str| {
        if x < 0 || y < 0 {
            return;
        }
        let rx = board.x + x as u16 * CELL_WIDTH;
        let ry = board.y + y as u16 * CELL_HEIGHT;
        if rx + CELL_WIDTH <= board.x + board.width && ry < board.y + board.height {
            buf.set_string(rx, ry, symbol, Style::default().fg(color).bg(theme.bg));
        }
    };

    for (y, row) in snapshot.rows().enumerate() {
        for (x, cell) in row.iter().enumerate() {
            match cell {
                Cell::Occupied(tag) => paint(x as i32, y as i32, theme.piece_color(*tag), "██"),
                Cell::Empty => paint(x as i32, y as i32, theme.div_line, " ·"),
            }
        }
    }
    // same floor snapping as the engine; rows above the arena are skipped
    for piece in sim.active_pieces() {
        let color = theme.piece_color(piece.color);
        for (x, y) in piece.grid_cells() {
            paint(x, y, color, "▓▓");
        }
    }
}

fn mode_label(mode: SpawnMode) -> String {
    match mode {
        SpawnMode::Manual => "manual".to_string(),
        SpawnMode::Interval { interval_ms } => format!("interval {interval_ms}ms"),
        SpawnMode::Immediate => "immediate".to_string(),
        SpawnMode::DeterministicFill { pause_ms } => format!("fill, pause {pause_ms}ms"),
    }
}

fn draw_sidebar(frame: &mut Frame, sim: &Simulation, theme: &Theme, status: HostStatus, area: Rect) {
    let title_style = Style::default().fg(theme.title);
    let fg_style = Style::default().fg(theme.main_fg);
    let border_style = Style::default().fg(theme.div_line).bg(theme.bg);
    let stats = sim.stats();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Status
            Constraint::Length(1),
            Constraint::Length(8), // Counters
            Constraint::Length(1),
            Constraint::Length(4), // Fill progress
            Constraint::Length(1),
            Constraint::Length(4), // Colours
        ])
        .split(area);

    let row = |label: &'static str, value: String| {
        Line::from(vec![
            Span::styled(label, title_style),
            Span::styled(value, fg_style),
        ])
    };

    let status_lines = vec![
        row("Mode: ", mode_label(sim.config().spawn_mode)),
        row("Falling: ", sim.active_count().to_string()),
        row("Speed: ", format!("x{:.2}", status.time_scale)),
        row(
            "Time: ",
            format!("{:02}:{:02}", status.running_secs / 60, status.running_secs % 60),
        ),
    ];
    render_section(frame, chunks[0], border_style, Text::from(status_lines));

    let counter_lines = vec![
        row("Spawned: ", stats.pieces_spawned.to_string()),
        row("Settled: ", stats.pieces_merged.to_string()),
        row("Rows swept: ", stats.rows_cleared.to_string()),
        row("Overflows: ", stats.overflows.to_string()),
        row("Cycles: ", stats.cycles.to_string()),
        row(
            "Filled: ",
            format!(
                "{}/{}",
                sim.arena().occupied_count(),
                sim.width() * sim.height()
            ),
        ),
    ];
    render_section(frame, chunks[2], border_style, Text::from(counter_lines));

    if let Some((phase, len)) = sim.fill_progress() {
        draw_fill_gauge(frame, theme, chunks[4], phase, len);
    }
    draw_colour_strip(frame, theme, chunks[6]);
}

fn render_section(frame: &mut Frame, area: Rect, border_style: Style, text: Text<'_>) {
    let block = Block::default().borders(Borders::ALL).border_style(border_style);
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    Paragraph::new(text).render(inner, frame.buffer_mut());
}

fn draw_fill_gauge(frame: &mut Frame, theme: &Theme, area: Rect, phase: FillPhase, len: usize) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Length(1)])
        .split(inner);

    let (label, ratio, color) = match phase {
        FillPhase::Filling { cursor } => {
            let ratio = if len > 0 { cursor as f64 / len as f64 } else { 1.0 };
            (format!("Filling {cursor}/{len}"), ratio, Color::Green)
        }
        FillPhase::Pausing { remaining } => {
            (format!("Pausing {remaining:.1}s"), 1.0, Color::Yellow)
        }
    };
    Paragraph::new(Line::from(Span::styled(label, Style::default().fg(theme.title))))
        .render(rows[0], frame.buffer_mut());
    Gauge::default()
        .ratio(ratio.clamp(0.0, 1.0))
        .gauge_style(Style::default().fg(color))
        .render(rows[1], frame.buffer_mut());
}

fn draw_colour_strip(frame: &mut Frame, theme: &Theme, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.div_line).bg(theme.bg));
    let inner = block.inner(area);
    block.render(area, frame.buffer_mut());
    let spans: Vec<Span> = theme
        .pieces
        .iter()
        .map(|&c| Span::styled("██ ", Style::default().fg(c)))
        .collect();
    Paragraph::new(vec![
        Line::from(Span::styled("Colours", Style::default().fg(theme.title))),
        Line::from(spans),
    ])
    .render(inner, frame.buffer_mut());
}

fn draw_pause_overlay(frame: &mut Frame, theme: &Theme, area: Rect) {
    let popup_w = 28u16;
    let popup_h = 5u16;
    let popup = Rect {
        x: area.x + area.width.saturating_sub(popup_w) / 2,
        y: area.y + area.height.saturating_sub(popup_h) / 2,
        width: popup_w.min(area.width),
        height: popup_h.min(area.height),
    };
    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            " Paused ",
            Style::default().fg(Color::Black).bg(Color::Yellow),
        )),
        Line::from(""),
        Line::from(Span::styled(
            " p: resume    q: quit ",
            Style::default().fg(theme.main_fg),
        )),
    ];
    let p = Paragraph::new(lines).alignment(Alignment::Center).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(theme.div_line).bg(theme.bg)),
    );
    p.render(popup, frame.buffer_mut());
}

/// Process the running wipe flash over the board; drop it once done.
fn apply_wipe_effect(
    frame: &mut Frame,
    sim: &Simulation,
    area: Rect,
    wipe_effect: &mut Option<Effect>,
    wipe_process_time: &mut Option<Instant>,
    now: Instant,
) {
    let Some(effect) = wipe_effect else {
        *wipe_process_time = None;
        return;
    };
    let delta = wipe_process_time
        .map(|t| now.saturating_duration_since(t))
        .unwrap_or(std::time::Duration::ZERO);
    let delta_ms = delta.as_millis().min(u32::MAX as u128) as u32;
    *wipe_process_time = Some(now);
    let board = board_rect(area, sim);
    frame.render_effect(effect, board, TfxDuration::from_millis(delta_ms));
    if effect.done() {
        *wipe_effect = None;
        *wipe_process_time = None;
    }
}

/// Flash that fades from `theme.flash` back to the board.
pub fn wipe_flash(theme: &Theme) -> Effect {
    fx::fade_from(theme.flash, theme.flash, (WIPE_FLASH_MS, Interpolation::QuadOut))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_arena_fits_terminal() {
        let (w, h) = max_arena_cells_for_terminal(80, 24);
        let (pw, ph) = arena_pixel_size(w, h);
        assert!(pw + SIDEBAR_WIDTH <= 80);
        assert!(ph <= 24);
    }

    #[test]
    fn test_tiny_terminal_still_gives_one_cell() {
        assert_eq!(max_arena_cells_for_terminal(0, 0), (1, 1));
    }
}
