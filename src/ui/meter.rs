use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Gauge, Paragraph};

use crate::audio::MeterReading;
use crate::ui::Theme;

/// Input level bar. `None` means no microphone stream this session.
pub fn render_meter(frame: &mut Frame, area: Rect, reading: Option<MeterReading>, theme: &Theme) {
    let block = Block::default()
        .title(Span::styled(" Input ", Style::default().fg(theme.label)))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(theme.border))
        .style(Style::default().bg(theme.bg));

    let Some(reading) = reading else {
        let body = Paragraph::new(Span::styled("NO INPUT", Style::default().fg(theme.dimmed)))
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(body, area);
        return;
    };

    let color = if reading.clipping {
        theme.meter_clip
    } else {
        theme.meter_level
    };
    let label = if reading.clipping {
        "CLIP".to_string()
    } else {
        format!("{:>3.0}%", reading.volume * 100.0)
    };

    // Gauge panics outside 0..=1
    let ratio = if reading.volume.is_finite() {
        reading.volume.clamp(0.0, 1.0) as f64
    } else {
        0.0
    };

    let gauge = Gauge::default()
        .block(block)
        .gauge_style(Style::default().fg(color).bg(theme.bg))
        .ratio(ratio)
        .label(Span::styled(label, Style::default().fg(theme.fg)));

    frame.render_widget(gauge, area);
}
