use ratatui::style::{Color, Modifier, Style};

pub struct Theme;

impl Theme {
    // Dracula palette
    pub const BG: Color = Color::Rgb(40, 42, 54);
    pub const FG: Color = Color::Rgb(248, 248, 242);
    pub const COMMENT: Color = Color::Rgb(98, 114, 164);
    pub const CYAN: Color = Color::Rgb(139, 233, 253);
    pub const GREEN: Color = Color::Rgb(80, 250, 123);
    pub const ORANGE: Color = Color::Rgb(255, 184, 108);
    pub const PINK: Color = Color::Rgb(255, 121, 198);
    pub const RED: Color = Color::Rgb(255, 85, 85);
    pub const YELLOW: Color = Color::Rgb(241, 250, 140);

    pub fn dir() -> Style { Style::default().fg(Self::CYAN) }
    pub fn file() -> Style { Style::default().fg(Self::FG) }
    pub fn marked() -> Style { Style::default().fg(Self::YELLOW).add_modifier(Modifier::BOLD) }
    pub fn muted() -> Style { Style::default().fg(Self::COMMENT) }
    pub fn heading() -> Style { Style::default().fg(Self::CYAN).add_modifier(Modifier::BOLD) }

    pub fn border(focused: bool) -> Style {
        if focused {
            Style::default().fg(Self::PINK).bg(Self::BG).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Self::COMMENT).bg(Self::BG)
        }
    }

    /// Status log line colour by its level prefix.
    pub fn log_line(line: &str) -> Style {
        if line.starts_with("Error:") {
            Style::default().fg(Self::RED)
        } else if line.starts_with("Warning:") {
            Style::default().fg(Self::ORANGE)
        } else {
            Style::default().fg(Self::COMMENT)
        }
    }
}
