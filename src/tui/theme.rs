use ratatui::style::Color;

/// Color theme for the TUI
#[derive(Debug, Clone)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub dim: Color,
    pub highlight: Color,
    pub accent: Color,
    pub tag: Color,
    pub warning: Color,
    pub selection_bg: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme {
            background: Color::Reset,
            text: Color::Gray,
            text_bright: Color::White,
            dim: Color::DarkGray,
            highlight: Color::Cyan,
            accent: Color::Rgb(0x1D, 0xA1, 0xF2),
            tag: Color::Rgb(0x44, 0xDD, 0x88),
            warning: Color::Yellow,
            selection_bg: Color::Rgb(0x2A, 0x2A, 0x3A),
        }
    }
}
