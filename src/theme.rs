//! Styles for rendered nodes
//!
//! One central table so every draw routine pulls from the same palette.

use crate::forest::UsageHint;
use ratatui::style::{Color, Modifier, Style};

#[derive(Debug, Clone)]
pub struct Theme {
    pub card_border: Style,
    pub divider: Style,
    /// Marker style for unresolved bindings and empty cards.
    pub fallback: Style,
    pub icon: Style,
    pub image_frame: Style,
    pub image_url: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            card_border: Style::default().fg(Color::DarkGray),
            divider: Style::default().fg(Color::DarkGray),
            fallback: Style::default().fg(Color::DarkGray).add_modifier(Modifier::DIM),
            icon: Style::default().fg(Color::Cyan),
            image_frame: Style::default().fg(Color::Blue),
            image_url: Style::default().fg(Color::DarkGray),
        }
    }
}

impl Theme {
    /// Text style for a usage hint. Hints choose presentation only, never
    /// structure.
    pub fn text_style(&self, hint: UsageHint) -> Style {
        match hint {
            UsageHint::H1 => Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::UNDERLINED),
            UsageHint::H2 => Style::default().add_modifier(Modifier::BOLD),
            UsageHint::H3 => Style::default()
                .add_modifier(Modifier::BOLD)
                .add_modifier(Modifier::ITALIC),
            UsageHint::Body => Style::default(),
            UsageHint::Caption => Style::default()
                .add_modifier(Modifier::ITALIC)
                .add_modifier(Modifier::DIM),
            UsageHint::Label => Style::default().add_modifier(Modifier::DIM),
            UsageHint::Monospace => Style::default().fg(Color::Gray),
        }
    }
}
