//! Colored terminal output

use owo_colors::{OwoColorize, colors::css};

/// Detects whether colored output should be enabled
fn supports_color() -> bool {
    supports_color::on(supports_color::Stream::Stdout).is_some()
}

/// Extension trait for colorizing banners
pub trait Colorize {
    /// Color as success (green)
    fn success(&self) -> String;
    /// Color as warning (amber)
    fn warning(&self) -> String;
}

impl Colorize for str {
    fn success(&self) -> String {
        if supports_color() {
            self.fg::<css::Green>().to_string()
        } else {
            self.to_string()
        }
    }

    fn warning(&self) -> String {
        if supports_color() {
            self.fg::<css::Orange>().to_string()
        } else {
            self.to_string()
        }
    }
}

impl Colorize for String {
    fn success(&self) -> String {
        self.as_str().success()
    }

    fn warning(&self) -> String {
        self.as_str().warning()
    }
}
