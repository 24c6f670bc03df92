use ratatui::style::Color;

/// Colors for the pad grid, meter and chrome
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: &'static str,
    pub bg: Color,
    pub fg: Color,
    pub pad_empty: Color,
    pub pad_loaded: Color,
    pub pad_playing: Color,
    pub cursor: Color,
    /// Cell waiting for a hotkey, and the assign-mode banner
    pub capture: Color,
    pub label: Color,
    pub meter_level: Color,
    pub meter_clip: Color,
    pub border: Color,
    pub highlight: Color,
    pub dimmed: Color,
}

impl Theme {
    /// Default theme - uses terminal's ANSI colors
    pub fn default_theme() -> Self {
        Self {
            name: "default",
            bg: Color::Reset,
            fg: Color::Reset,
            pad_empty: Color::DarkGray,
            pad_loaded: Color::Cyan,
            pad_playing: Color::Green,
            cursor: Color::Yellow,
            capture: Color::Magenta,
            label: Color::Cyan,
            meter_level: Color::Green,
            meter_clip: Color::Red,
            border: Color::White,
            highlight: Color::Magenta,
            dimmed: Color::DarkGray,
        }
    }

    /// Green CRT phosphor
    pub fn phosphor_green() -> Self {
        Self {
            name: "phosphor-green",
            bg: Color::Black,
            fg: Color::Rgb(0, 255, 0),
            pad_empty: Color::Rgb(0, 70, 0),
            pad_loaded: Color::Rgb(0, 190, 0),
            pad_playing: Color::Rgb(170, 255, 170),
            cursor: Color::Rgb(220, 255, 220),
            capture: Color::Rgb(120, 255, 120),
            label: Color::Rgb(0, 200, 0),
            meter_level: Color::Rgb(0, 220, 0),
            meter_clip: Color::Rgb(255, 60, 40),
            border: Color::Rgb(0, 160, 0),
            highlight: Color::Rgb(150, 255, 150),
            dimmed: Color::Rgb(0, 60, 0),
        }
    }

    /// Warm amber monochrome CRT
    pub fn amber_crt() -> Self {
        Self {
            name: "amber-crt",
            bg: Color::Black,
            fg: Color::Rgb(255, 176, 0),
            pad_empty: Color::Rgb(75, 50, 0),
            pad_loaded: Color::Rgb(200, 140, 0),
            pad_playing: Color::Rgb(255, 225, 160),
            cursor: Color::Rgb(255, 240, 200),
            capture: Color::Rgb(255, 200, 90),
            label: Color::Rgb(210, 145, 0),
            meter_level: Color::Rgb(120, 200, 0),
            meter_clip: Color::Rgb(255, 50, 0),
            border: Color::Rgb(170, 120, 0),
            highlight: Color::Rgb(255, 220, 150),
            dimmed: Color::Rgb(60, 40, 0),
        }
    }

    /// Cool blue terminal tones
    pub fn blue_terminal() -> Self {
        Self {
            name: "blue-terminal",
            bg: Color::Black,
            fg: Color::Rgb(100, 180, 255),
            pad_empty: Color::Rgb(30, 55, 90),
            pad_loaded: Color::Rgb(80, 150, 220),
            pad_playing: Color::Rgb(190, 230, 255),
            cursor: Color::Rgb(230, 240, 255),
            capture: Color::Rgb(150, 120, 255),
            label: Color::Rgb(90, 160, 230),
            meter_level: Color::Rgb(60, 200, 140),
            meter_clip: Color::Rgb(255, 70, 70),
            border: Color::Rgb(70, 130, 200),
            highlight: Color::Rgb(180, 220, 255),
            dimmed: Color::Rgb(25, 50, 80),
        }
    }

    /// Black and white, with pure red/green for the meter
    pub fn high_contrast() -> Self {
        Self {
            name: "high-contrast",
            bg: Color::Black,
            fg: Color::White,
            pad_empty: Color::Rgb(70, 70, 70),
            pad_loaded: Color::Rgb(200, 200, 200),
            pad_playing: Color::White,
            cursor: Color::White,
            capture: Color::White,
            label: Color::White,
            meter_level: Color::Rgb(0, 255, 0),
            meter_clip: Color::Rgb(255, 0, 0),
            border: Color::White,
            highlight: Color::White,
            dimmed: Color::Rgb(90, 90, 90),
        }
    }

    /// Get theme by name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default_theme()),
            "phosphor-green" => Some(Self::phosphor_green()),
            "amber-crt" => Some(Self::amber_crt()),
            "blue-terminal" => Some(Self::blue_terminal()),
            "high-contrast" => Some(Self::high_contrast()),
            _ => None,
        }
    }

    pub fn available_themes() -> &'static [&'static str] {
        &[
            "default",
            "phosphor-green",
            "amber-crt",
            "blue-terminal",
            "high-contrast",
        ]
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::default_theme()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_listed_theme_resolves() {
        for name in Theme::available_themes() {
            let theme = Theme::from_name(name).unwrap();
            assert_eq!(theme.name, *name);
        }
        assert!(Theme::from_name("solarized").is_none());
    }
}
