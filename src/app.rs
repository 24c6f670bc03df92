use std::io::{self, Stdout};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use parking_lot::RwLock;
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph};
use ratatui::Terminal;

use crate::audio::{AudioEngine, MeterReader, MicInput, MicRecorder, PlaybackState};
use crate::command::CommandBus;
use crate::config::Settings;
use crate::library;
use crate::session::Session;
use crate::ui::{
    render_browser, render_footer, render_meter, render_pads, render_transport, BrowserState,
    GridState, Theme,
};

/// Application state
pub struct App {
    theme: Theme,
    session: Session,
    /// Output stream; kept alive for the whole session
    _audio: AudioEngine,
    /// Voice activity published by the audio thread
    playback: Arc<RwLock<PlaybackState>>,
    /// Input stream; None when the microphone could not be opened
    _mic: Option<MicInput>,
    meter: Option<MeterReader>,
    grid_state: GridState,
    /// Open sound browser modal
    browser: Option<BrowserState>,
    should_quit: bool,
}

impl App {
    pub fn new(settings: &Settings, theme: Theme) -> Result<Self> {
        let command_bus = CommandBus::new();

        // A missing microphone only disables metering and recording
        let (mic, recorder, stream_error) = match MicInput::open(settings.meter) {
            Ok(mut mic) => {
                let recorder = match mic.take_capture() {
                    Some(link) => MicRecorder::new(link),
                    None => MicRecorder::unavailable(),
                };
                (Some(mic), recorder, None)
            }
            Err(e) => (None, MicRecorder::unavailable(), Some(e)),
        };
        let meter = mic.as_ref().map(MicInput::meter);

        let mut session = Session::new(
            settings,
            Box::new(command_bus.sender()),
            Box::new(recorder),
        );
        if let Some(e) = stream_error {
            session.report_stream_failure(&e);
        }

        // One voice slot per cell of the (clamped) grid
        let audio = AudioEngine::new(session.grid().len(), command_bus.receiver())
            .context("Failed to open audio output")?;
        let playback = audio.state.clone();

        Ok(Self {
            theme,
            session,
            _audio: audio,
            playback,
            _mic: mic,
            meter,
            grid_state: GridState::new(),
            browser: None,
            should_quit: false,
        })
    }

    /// Run the main application loop
    pub fn run(&mut self) -> Result<()> {
        let mut terminal = Self::setup_terminal()?;

        let result = self.main_loop(&mut terminal);

        Self::restore_terminal(&mut terminal)?;

        result
    }

    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        stdout.execute(EnterAlternateScreen)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(terminal)
    }

    fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        disable_raw_mode()?;
        terminal.backend_mut().execute(LeaveAlternateScreen)?;
        terminal.show_cursor()?;
        Ok(())
    }

    fn main_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        loop {
            // Beat timers and capture draining run once per frame
            let now = Instant::now();
            self.session.tick(now);
            if let Some(browser) = self.browser.as_mut() {
                browser.sync_preview(self.playback.read().previewing, now);
            }

            terminal.draw(|frame| self.render(frame, now))?;

            // ~60fps
            if event::poll(Duration::from_millis(16))? {
                if let Event::Key(key) = event::read()? {
                    if key.kind == KeyEventKind::Press {
                        self.handle_key(key);
                    }
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    fn cursor_cell(&self) -> usize {
        self.grid_state.cell(self.session.grid())
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        if ctrl && matches!(key.code, KeyCode::Char('q') | KeyCode::Char('c')) {
            self.should_quit = true;
            return;
        }

        if self.browser.is_some() {
            self.handle_browser_key(key.code);
            return;
        }

        if let Some(waiting) = self.session.hotkeys().waiting() {
            match key.code {
                KeyCode::Esc => {
                    self.session.cancel_hotkey_capture();
                    return;
                }
                KeyCode::Delete | KeyCode::Backspace => {
                    self.session.clear_hotkey(waiting);
                    self.session.cancel_hotkey_capture();
                    return;
                }
                _ => {}
            }
        }

        if ctrl {
            self.handle_ctrl_key(key.code);
        } else {
            self.handle_grid_key(key);
        }
    }

    fn handle_ctrl_key(&mut self, code: KeyCode) {
        match code {
            KeyCode::Char('k') => {
                let cell = self.cursor_cell();
                self.session.begin_hotkey_capture(cell);
            }
            KeyCode::Char('r') => self.session.toggle_recording(Instant::now()),
            KeyCode::Char('a') => {
                self.session.begin_assign();
            }
            KeyCode::Char('p') => {
                self.session.preview_pending();
            }
            KeyCode::Char('o') => self.open_browser(),
            KeyCode::Char('s') => self.session.stop_all(),
            _ => {}
        }
    }

    fn handle_grid_key(&mut self, key: KeyEvent) {
        let shift = key.modifiers.contains(KeyModifiers::SHIFT);
        let bpm_step = if shift { 10.0 } else { 1.0 };

        match key.code {
            KeyCode::Up => self.grid_state.move_cursor(0, -1, self.session.grid()),
            KeyCode::Down => self.grid_state.move_cursor(0, 1, self.session.grid()),
            KeyCode::Left => self.grid_state.move_cursor(-1, 0, self.session.grid()),
            KeyCode::Right => self.grid_state.move_cursor(1, 0, self.session.grid()),
            KeyCode::Enter => {
                let cell = self.cursor_cell();
                self.session.click_cell(cell);
            }
            KeyCode::Tab => {
                let cell = self.cursor_cell();
                self.session.cycle_mode(cell);
            }
            KeyCode::Esc => {
                self.session.cancel_assign();
            }
            KeyCode::PageUp => {
                self.session.nudge_bpm(bpm_step);
            }
            KeyCode::PageDown => {
                self.session.nudge_bpm(-bpm_step);
            }
            KeyCode::Home => {
                self.session.nudge_record_beats(1);
            }
            KeyCode::End => {
                self.session.nudge_record_beats(-1);
            }
            KeyCode::Char(c) => {
                self.session.press_key(c);
            }
            _ => {}
        }
    }

    fn open_browser(&mut self) {
        let dirs = library::search_dirs();
        let entries = library::scan_sounds(&dirs);
        log::debug!("browser: {} sounds in {} dirs", entries.len(), dirs.len());
        self.browser = Some(BrowserState::new(entries));
    }

    fn handle_browser_key(&mut self, code: KeyCode) {
        let Some(browser) = self.browser.as_mut() else {
            return;
        };

        match code {
            KeyCode::Up | KeyCode::Char('k') => browser.move_up(),
            KeyCode::Down | KeyCode::Char('j') => browser.move_down(),
            KeyCode::PageUp => browser.move_by(-10),
            KeyCode::PageDown => browser.move_by(10),
            KeyCode::Char(' ') => {
                if let Some(path) = browser.selected_entry().map(|e| e.path.clone()) {
                    // Errors are already in the status log
                    if self.session.preview_file(&path).is_ok() {
                        browser.mark_preview(Instant::now());
                    }
                }
            }
            KeyCode::Enter => {
                if let Some(path) = browser.selected_entry().map(|e| e.path.clone()) {
                    if self.session.load_file(&path).is_ok() {
                        self.browser = None;
                    }
                }
            }
            KeyCode::Esc => self.browser = None,
            _ => {}
        }
    }

    fn render(&mut self, frame: &mut Frame, now: Instant) {
        let area = frame.area();

        let bg_block = Block::default().style(Style::default().bg(self.theme.bg));
        frame.render_widget(bg_block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Length(3), // Transport
                Constraint::Min(6),    // Pads
                Constraint::Length(3), // Input meter
                Constraint::Length(1), // Status / hints
            ])
            .split(area);

        self.render_header(frame, chunks[0]);
        render_transport(frame, chunks[1], &self.session, &self.theme);

        let playback = self.playback.read().clone();
        render_pads(
            frame,
            chunks[2],
            &self.session,
            &playback,
            &self.grid_state,
            &self.theme,
        );

        let reading = self.meter.as_ref().map(|m| m.read(now));
        render_meter(frame, chunks[3], reading, &self.theme);

        render_footer(frame, chunks[4], &self.session, now, &self.theme);

        if let Some(browser) = self.browser.as_mut() {
            render_browser(frame, chunks[2], browser, &self.theme);
        }
    }

    fn render_header(&self, frame: &mut Frame, area: Rect) {
        let title = format!(" TAPTRAP v{} ", env!("CARGO_PKG_VERSION"));
        let header = Paragraph::new(title)
            .style(
                Style::default()
                    .fg(self.theme.highlight)
                    .bg(self.theme.bg)
                    .bold(),
            )
            .alignment(Alignment::Center)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(self.theme.border))
                    .style(Style::default().bg(self.theme.bg)),
            );
        frame.render_widget(header, area);
    }
}
