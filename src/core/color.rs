//! Named terminal colors used by patterns and color overrides

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// ANSI reset sequence emitted for `{reset}`
pub const RESET: &str = "\x1b[0m";

/// Closed set of color names accepted in patterns and config overrides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Color {
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    Gray,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    BgBlack,
    BgRed,
    BgGreen,
    BgYellow,
    BgBlue,
    BgMagenta,
    BgCyan,
    BgWhite,
    BgGray,
    Bold,
    Dim,
    Italic,
    Underline,
}

impl Color {
    pub const ALL: [Color; 29] = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
        Color::Gray,
        Color::BrightRed,
        Color::BrightGreen,
        Color::BrightYellow,
        Color::BrightBlue,
        Color::BrightMagenta,
        Color::BrightCyan,
        Color::BrightWhite,
        Color::BgBlack,
        Color::BgRed,
        Color::BgGreen,
        Color::BgYellow,
        Color::BgBlue,
        Color::BgMagenta,
        Color::BgCyan,
        Color::BgWhite,
        Color::BgGray,
        Color::Bold,
        Color::Dim,
        Color::Italic,
        Color::Underline,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::Red => "red",
            Color::Green => "green",
            Color::Yellow => "yellow",
            Color::Blue => "blue",
            Color::Magenta => "magenta",
            Color::Cyan => "cyan",
            Color::White => "white",
            Color::Gray => "gray",
            Color::BrightRed => "brightRed",
            Color::BrightGreen => "brightGreen",
            Color::BrightYellow => "brightYellow",
            Color::BrightBlue => "brightBlue",
            Color::BrightMagenta => "brightMagenta",
            Color::BrightCyan => "brightCyan",
            Color::BrightWhite => "brightWhite",
            Color::BgBlack => "bgBlack",
            Color::BgRed => "bgRed",
            Color::BgGreen => "bgGreen",
            Color::BgYellow => "bgYellow",
            Color::BgBlue => "bgBlue",
            Color::BgMagenta => "bgMagenta",
            Color::BgCyan => "bgCyan",
            Color::BgWhite => "bgWhite",
            Color::BgGray => "bgGray",
            Color::Bold => "bold",
            Color::Dim => "dim",
            Color::Italic => "italic",
            Color::Underline => "underline",
        }
    }

    /// Look up a color by name, case-insensitively. `grey` is accepted for `gray`.
    pub fn from_name(name: &str) -> Option<Color> {
        if name.eq_ignore_ascii_case("grey") {
            return Some(Color::Gray);
        }
        Color::ALL
            .into_iter()
            .find(|color| color.name().eq_ignore_ascii_case(name))
    }

    /// The `colored` color this entry maps onto, if it is a color rather than a style
    pub fn terminal_color(&self) -> Option<colored::Color> {
        use colored::Color as C;
        let color = match self {
            Color::Black | Color::BgBlack => C::Black,
            Color::Red | Color::BgRed => C::Red,
            Color::Green | Color::BgGreen => C::Green,
            Color::Yellow | Color::BgYellow => C::Yellow,
            Color::Blue | Color::BgBlue => C::Blue,
            Color::Magenta | Color::BgMagenta => C::Magenta,
            Color::Cyan | Color::BgCyan => C::Cyan,
            Color::White | Color::BgWhite => C::White,
            Color::Gray | Color::BgGray => C::BrightBlack,
            Color::BrightRed => C::BrightRed,
            Color::BrightGreen => C::BrightGreen,
            Color::BrightYellow => C::BrightYellow,
            Color::BrightBlue => C::BrightBlue,
            Color::BrightMagenta => C::BrightMagenta,
            Color::BrightCyan => C::BrightCyan,
            Color::BrightWhite => C::BrightWhite,
            Color::Bold | Color::Dim | Color::Italic | Color::Underline => return None,
        };
        Some(color)
    }

    fn is_background(&self) -> bool {
        matches!(
            self,
            Color::BgBlack
                | Color::BgRed
                | Color::BgGreen
                | Color::BgYellow
                | Color::BgBlue
                | Color::BgMagenta
                | Color::BgCyan
                | Color::BgWhite
                | Color::BgGray
        )
    }

    /// Raw ANSI escape sequence for this color
    pub fn escape(&self) -> String {
        let code = match (self.terminal_color(), self.is_background()) {
            (Some(color), true) => color.to_bg_str().into_owned(),
            (Some(color), false) => color.to_fg_str().into_owned(),
            (None, _) => match self {
                Color::Bold => "1",
                Color::Dim => "2",
                Color::Italic => "3",
                _ => "4",
            }
            .to_string(),
        };
        format!("\x1b[{}m", code)
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Color {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Color::from_name(s).ok_or_else(|| format!("Invalid color: '{}'", s))
    }
}
