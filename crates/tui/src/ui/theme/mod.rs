//! Theme styling for the TUI.
//!
//! Two palettes are shipped: Nord for truecolor terminals and an indexed
//! approximation for everything else. Prefer the helpers over hard-coded
//! colors.

use std::env;

use tracing::debug;

pub mod ansi256;
pub mod helpers;
pub mod nord;
pub mod roles;

pub use ansi256::Ansi256Theme;
pub use nord::NordTheme;
pub use roles::{Theme, ThemeRoles};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColorCapability {
    Truecolor,
    Ansi256,
}

/// Selects a theme from the terminal's color capability.
pub fn load() -> Box<dyn Theme> {
    match detect_color_capability() {
        ColorCapability::Truecolor => Box::new(NordTheme::new()),
        ColorCapability::Ansi256 => {
            debug!("ANSI-only terminal detected; using the indexed palette");
            Box::new(Ansi256Theme::new())
        }
    }
}

fn detect_color_capability() -> ColorCapability {
    if let Some(mode) = env::var("CHATFORM_COLOR_MODE").ok().and_then(|value| parse_color_mode(value.trim())) {
        return mode;
    }

    let color_term = env::var("COLORTERM").unwrap_or_default().to_ascii_lowercase();
    if color_term.contains("truecolor") || color_term.contains("24bit") {
        return ColorCapability::Truecolor;
    }

    let term = env::var("TERM").unwrap_or_default().to_ascii_lowercase();
    if term.contains("truecolor") {
        return ColorCapability::Truecolor;
    }

    ColorCapability::Ansi256
}

fn parse_color_mode(value: &str) -> Option<ColorCapability> {
    match value.to_ascii_lowercase().as_str() {
        "truecolor" | "24bit" => Some(ColorCapability::Truecolor),
        "ansi256" | "256" | "8bit" => Some(ColorCapability::Ansi256),
        _ => None,
    }
}
