use std::time::{Duration, Instant};

use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Clear, Paragraph};

use crate::library::SoundEntry;
use crate::ui::Theme;

/// Line in the browser list
#[derive(Debug, Clone, PartialEq)]
enum BrowserItem {
    Folder(String),
    File(usize), // index into entries
}

/// Time a sent preview gets to show up as playing
const PREVIEW_GRACE: Duration = Duration::from_millis(250);

/// File whose preview was handed to the output
#[derive(Debug, Clone, Copy)]
struct PreviewMark {
    index: usize,
    since: Instant,
    heard: bool,
}

/// State for the sound browser modal
pub struct BrowserState {
    entries: Vec<SoundEntry>,
    items: Vec<BrowserItem>,
    cursor: usize,
    scroll: usize,
    preview: Option<PreviewMark>,
}

impl BrowserState {
    pub fn new(entries: Vec<SoundEntry>) -> Self {
        let mut items = Vec::with_capacity(entries.len());
        let mut current_dir: Option<&str> = None;
        for (i, entry) in entries.iter().enumerate() {
            if current_dir != Some(entry.dir.as_str()) {
                current_dir = Some(entry.dir.as_str());
                items.push(BrowserItem::Folder(entry.dir.clone()));
            }
            items.push(BrowserItem::File(i));
        }

        Self {
            entries,
            items,
            cursor: 0,
            scroll: 0,
            preview: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn cursor_line(&self) -> usize {
        self.items
            .iter()
            .position(|item| *item == BrowserItem::File(self.cursor))
            .unwrap_or(0)
    }

    /// Move the cursor `delta` files, skipping folder headers. Stops at the ends.
    pub fn move_by(&mut self, delta: i32) {
        let line = self.cursor_line();
        let files = |item: &BrowserItem| match item {
            BrowserItem::File(i) => Some(*i),
            BrowserItem::Folder(_) => None,
        };

        let target = if delta < 0 {
            self.items[..line]
                .iter()
                .rev()
                .filter_map(files)
                .take(delta.unsigned_abs() as usize)
                .last()
        } else {
            self.items
                .get(line + 1..)
                .unwrap_or_default()
                .iter()
                .filter_map(files)
                .take(delta as usize)
                .last()
        };

        if let Some(i) = target {
            self.cursor = i;
        }
    }

    pub fn move_up(&mut self) {
        self.move_by(-1);
    }

    pub fn move_down(&mut self) {
        self.move_by(1);
    }

    pub fn selected_entry(&self) -> Option<&SoundEntry> {
        self.entries.get(self.cursor)
    }

    /// Tag the selected file as previewing
    pub fn mark_preview(&mut self, now: Instant) {
        self.preview = Some(PreviewMark {
            index: self.cursor,
            since: now,
            heard: false,
        });
    }

    /// Follow the output's preview voice; the tag goes once playback has ended
    pub fn sync_preview(&mut self, playing: bool, now: Instant) {
        let Some(mark) = self.preview.as_mut() else {
            return;
        };
        if playing {
            mark.heard = true;
        } else if mark.heard || now.saturating_duration_since(mark.since) >= PREVIEW_GRACE {
            self.preview = None;
        }
    }

    fn previewing(&self) -> Option<usize> {
        self.preview.map(|m| m.index)
    }

    /// Keep the cursor line inside a window of `height` lines
    fn scroll_for(&mut self, height: usize) -> usize {
        let line = self.cursor_line();
        if line < self.scroll {
            self.scroll = line;
        } else if height > 0 && line >= self.scroll + height {
            self.scroll = line + 1 - height;
        }
        self.scroll
    }
}

/// Render the sound browser as a modal overlay
pub fn render_browser(frame: &mut Frame, area: Rect, browser: &mut BrowserState, theme: &Theme) {
    let modal_area = centered_rect(70, 80, area);
    frame.render_widget(Clear, modal_area);

    let block = Block::default()
        .title(Span::styled(" Load Sound ", Style::default().fg(theme.highlight)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.highlight))
        .style(Style::default().bg(theme.bg));

    let inner = block.inner(modal_area);
    frame.render_widget(block, modal_area);

    if browser.is_empty() {
        let empty = Paragraph::new(
            "  No sound files found.\n\n  Add .wav files to ./samples or ~/.taptrap/samples/",
        )
        .style(Style::default().fg(theme.dimmed).bg(theme.bg));
        frame.render_widget(empty, inner);
        return;
    }

    // Leave 2 lines for the footer hint
    let content_height = inner.height.saturating_sub(2) as usize;
    let scroll = browser.scroll_for(content_height);

    let lines: Vec<Line> = browser
        .items
        .iter()
        .skip(scroll)
        .take(content_height)
        .map(|item| match item {
            BrowserItem::Folder(name) => Line::from(Span::styled(
                format!("  {}/", name),
                Style::default().fg(theme.label).bold(),
            )),
            BrowserItem::File(i) => {
                let entry = &browser.entries[*i];
                let selected = *i == browser.cursor;
                let style = if selected {
                    Style::default().fg(theme.highlight).bold()
                } else {
                    Style::default().fg(theme.fg)
                };
                let mut spans = vec![
                    Span::styled(if selected { "  > " } else { "    " }, style),
                    Span::styled(format!("{}.{}", entry.name, entry.format), style),
                ];
                if browser.previewing() == Some(*i) {
                    spans.push(Span::styled(" [preview]", Style::default().fg(theme.pad_playing)));
                }
                Line::from(spans)
            }
        })
        .collect();

    frame.render_widget(
        Paragraph::new(lines).style(Style::default().bg(theme.bg)),
        Rect::new(inner.x, inner.y, inner.width, inner.height.saturating_sub(2)),
    );

    let key = Style::default().fg(theme.pad_loaded);
    let text = Style::default().fg(theme.fg);
    let footer = Paragraph::new(Line::from(vec![
        Span::styled("  [Space]", key),
        Span::styled(" Preview  ", text),
        Span::styled("[Enter]", key),
        Span::styled(" Load  ", text),
        Span::styled("[Esc]", key),
        Span::styled(" Close", text),
    ]))
    .style(Style::default().bg(theme.bg));

    let footer_area = Rect::new(
        inner.x,
        inner.y + inner.height.saturating_sub(1),
        inner.width,
        1,
    );
    frame.render_widget(footer, footer_area);
}

/// Create a centered rect within a given area
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let [_, middle, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(area);

    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(middle);

    center
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn entry(dir: &str, name: &str) -> SoundEntry {
        SoundEntry {
            path: PathBuf::from(format!("/tmp/{}/{}.wav", dir, name)),
            relative: format!("{}/{}.wav", dir, name),
            name: name.to_string(),
            dir: dir.to_string(),
            format: "wav".to_string(),
        }
    }

    fn browser() -> BrowserState {
        BrowserState::new(vec![
            entry("drums", "kick"),
            entry("drums", "snare"),
            entry("vox", "hey"),
        ])
    }

    #[test]
    fn test_folder_headers_are_skipped() {
        let mut b = browser();
        assert_eq!(b.items.len(), 5);

        b.move_down();
        b.move_down();
        assert_eq!(b.selected_entry().unwrap().name, "hey");

        b.move_up();
        assert_eq!(b.selected_entry().unwrap().name, "snare");
    }

    #[test]
    fn test_cursor_stops_at_the_ends() {
        let mut b = browser();
        b.move_up();
        assert_eq!(b.cursor, 0);

        b.move_by(10);
        assert_eq!(b.cursor, 2);
        b.move_down();
        assert_eq!(b.cursor, 2);

        b.move_by(-2);
        assert_eq!(b.cursor, 0);
    }

    #[test]
    fn test_empty_browser() {
        let mut b = BrowserState::new(Vec::new());
        b.move_down();
        assert!(b.is_empty());
        assert!(b.selected_entry().is_none());
    }

    #[test]
    fn test_scroll_follows_cursor() {
        let mut b = browser();
        b.move_by(2); // "hey" is on line 4
        assert_eq!(b.scroll_for(3), 2);
        b.move_by(-2);
        assert_eq!(b.scroll_for(3), 1);
    }

    #[test]
    fn test_preview_tag_clears_when_playback_ends() {
        let mut b = browser();
        let t0 = Instant::now();
        b.move_down();
        b.mark_preview(t0);
        assert_eq!(b.previewing(), Some(1));

        // Output has not picked it up yet
        b.sync_preview(false, t0 + Duration::from_millis(16));
        assert_eq!(b.previewing(), Some(1));

        b.sync_preview(true, t0 + Duration::from_millis(32));
        b.sync_preview(false, t0 + Duration::from_millis(48));
        assert_eq!(b.previewing(), None);
    }

    #[test]
    fn test_unheard_preview_tag_expires() {
        let mut b = browser();
        let t0 = Instant::now();
        b.mark_preview(t0);

        b.sync_preview(false, t0 + PREVIEW_GRACE);
        assert_eq!(b.previewing(), None);
    }
}
