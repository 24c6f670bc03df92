use std::time::Instant;

use ratatui::prelude::*;
use ratatui::widgets::{Block, BorderType, Borders, Paragraph};

use crate::audio::PlaybackState;
use crate::pad::{Cell, CellGrid, CellId};
use crate::session::Session;
use crate::status::{StatusLevel, STATUS_TTL};
use crate::ui::Theme;

/// Grid cursor
pub struct GridState {
    pub row: usize,
    pub col: usize,
}

impl GridState {
    pub fn new() -> Self {
        Self { row: 0, col: 0 }
    }

    /// Move with wrap-around inside a `width x height` grid
    pub fn move_cursor(&mut self, dx: i32, dy: i32, grid: &CellGrid) {
        let w = grid.width() as i32;
        let h = grid.height() as i32;
        self.col = (self.col as i32 + dx).rem_euclid(w) as usize;
        self.row = (self.row as i32 + dy).rem_euclid(h) as usize;
    }

    pub fn cell(&self, grid: &CellGrid) -> CellId {
        grid.id_at(self.row, self.col).unwrap_or(0)
    }
}

impl Default for GridState {
    fn default() -> Self {
        Self::new()
    }
}

/// Render the pad grid
pub fn render_pads(
    frame: &mut Frame,
    area: Rect,
    session: &Session,
    playback: &PlaybackState,
    grid_state: &GridState,
    theme: &Theme,
) {
    let grid = session.grid();
    let title = if session.assignment().is_assigning() {
        Span::styled(" Pads - click a cell to assign ", Style::default().fg(theme.capture).bold())
    } else if playback.previewing {
        Span::styled(" Pads - previewing ", Style::default().fg(theme.pad_playing))
    } else {
        Span::styled(" Pads ", Style::default().fg(theme.label))
    };
    let block = Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![Constraint::Ratio(1, grid.height() as u32); grid.height()])
        .split(inner);

    let cursor = grid_state.cell(grid);
    let waiting = session.hotkeys().waiting();

    for (row, row_area) in rows.iter().enumerate() {
        let cols = Layout::default()
            .direction(Direction::Horizontal)
            .constraints(vec![Constraint::Ratio(1, grid.width() as u32); grid.width()])
            .split(*row_area);

        for (col, pad_area) in cols.iter().enumerate() {
            let Some(cell) = grid.id_at(row, col).and_then(|id| grid.cell(id)) else {
                continue;
            };
            let look = PadLook {
                cursor: cell.id() == cursor,
                waiting: waiting == Some(cell.id()),
                playing: playback.is_playing(cell.id()),
            };
            render_pad(frame, *pad_area, cell, look, theme);
        }
    }
}

#[derive(Clone, Copy)]
struct PadLook {
    cursor: bool,
    waiting: bool,
    playing: bool,
}

fn render_pad(frame: &mut Frame, area: Rect, cell: &Cell, look: PadLook, theme: &Theme) {
    let fill = if look.playing {
        theme.pad_playing
    } else if cell.sound().is_some() {
        theme.pad_loaded
    } else {
        theme.pad_empty
    };

    let border_style = if look.waiting {
        Style::default().fg(theme.capture).bold()
    } else if look.cursor {
        Style::default().fg(theme.cursor).bold()
    } else {
        Style::default().fg(fill)
    };
    let border_type = if look.cursor || look.waiting {
        BorderType::Double
    } else {
        BorderType::Rounded
    };

    let key = match (look.waiting, cell.hotkey()) {
        (true, _) => "?".to_string(),
        (false, Some(k)) => k.to_string(),
        (false, None) => String::new(),
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(border_type)
        .border_style(border_style)
        .title(Span::styled(format!("{:02}", cell.id()), Style::default().fg(theme.dimmed)))
        .title_bottom(Line::from(Span::styled(key, Style::default().fg(theme.highlight))).right_aligned());

    let name = cell.sound().map(|s| s.name().to_string()).unwrap_or_else(|| "-".to_string());
    let name_style = if look.playing {
        Style::default().fg(theme.bg).bg(fill).bold()
    } else {
        Style::default().fg(fill)
    };

    let body = Paragraph::new(vec![
        Line::from(Span::styled(name, name_style)),
        Line::from(Span::styled(cell.mode().label(), Style::default().fg(theme.label))),
    ])
    .alignment(Alignment::Center)
    .block(block);

    frame.render_widget(body, area);
}

/// Render the transport bar: tempo, recording state, pending sound
pub fn render_transport(frame: &mut Frame, area: Rect, session: &Session, theme: &Theme) {
    let sep = || Span::styled(" | ", Style::default().fg(theme.border));

    let record = match session.record_label() {
        Some(label) if session.recording().is_recording() => {
            Span::styled(format!(" {} ", label), Style::default().fg(theme.bg).bg(theme.meter_clip).bold())
        }
        Some(count) => Span::styled(format!("  {}  ", count), Style::default().fg(theme.cursor).bold()),
        None => Span::styled(" IDLE ", Style::default().fg(theme.dimmed)),
    };

    let beats = match session.recording().record_beats() {
        0 => "Rec: manual".to_string(),
        n => format!("Rec: {} beats", n),
    };

    let pending = match session.assignment().pending() {
        Some(sound) => Span::styled(
            format!("Pending: {} ({:.1}s)", sound.name(), sound.duration().as_secs_f32()),
            Style::default().fg(theme.highlight),
        ),
        None => Span::styled("Pending: -", Style::default().fg(theme.dimmed)),
    };

    let mut spans = vec![
        record,
        sep(),
        Span::styled(
            format!(
                "BPM: {:.0} ({:.0} ms)",
                session.clock().bpm(),
                session.clock().beat_duration_ms()
            ),
            Style::default().fg(theme.fg),
        ),
        sep(),
        Span::styled(beats, Style::default().fg(theme.fg)),
        sep(),
        pending,
    ];
    if session.assignment().is_assigning() {
        spans.push(sep());
        spans.push(Span::styled("ASSIGN", Style::default().fg(theme.capture).bold()));
    }

    let transport = Paragraph::new(Line::from(spans))
        .style(Style::default().bg(theme.bg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.border))
                .style(Style::default().bg(theme.bg)),
        );

    frame.render_widget(transport, area);
}

/// Newest status message for a few seconds, key hints otherwise
pub fn render_footer(frame: &mut Frame, area: Rect, session: &Session, now: Instant, theme: &Theme) {
    let line = match session.status().recent(STATUS_TTL, now) {
        Some(entry) => {
            let color = match entry.level {
                StatusLevel::Info => theme.fg,
                StatusLevel::Warn => theme.cursor,
                StatusLevel::Error => theme.meter_clip,
            };
            Line::from(Span::styled(format!(" {}", entry.text), Style::default().fg(color)))
        }
        None => {
            let hints = [
                ("Enter", "Play/Assign"),
                ("Tab", "Mode"),
                ("^K", "Key"),
                ("^R", "Rec"),
                ("^A", "Assign"),
                ("^P", "Preview"),
                ("^O", "Load"),
                ("^S", "Stop"),
                ("^Q", "Quit"),
            ];
            let mut spans = Vec::new();
            for (key, action) in hints {
                spans.push(Span::styled(format!(" {}", key), Style::default().fg(theme.highlight)));
                spans.push(Span::styled(format!(" {} ", action), Style::default().fg(theme.dimmed)));
            }
            Line::from(spans)
        }
    };

    frame.render_widget(Paragraph::new(line).style(Style::default().bg(theme.bg)), area);
}
