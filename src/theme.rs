//! Theme system for the TUI.
//!
//! Every visual role maps to one `Style`, built from the palette indices in
//! the `[colors]` config table. Index `-1` keeps the terminal's own color.

use crate::config::ColorsConfig;
use ratatui::style::{Color, Modifier, Style};

/// Convert a configured palette index into a ratatui color.
pub fn palette_color(index: i16) -> Color {
    match u8::try_from(index) {
        Ok(i) => Color::Indexed(i),
        Err(_) => {
            if index != -1 {
                tracing::warn!(index, "Palette index out of range, using terminal default");
            }
            Color::Reset
        }
    }
}

/// A complete color palette mapping every UI role to a `Style`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorPalette {
    // -- Panes --
    pub panel_active: Style,
    pub panel_idle: Style,
    pub pane_title: Style,

    // -- List items --
    pub item_text: Style,
    pub item_selected: Style,
    pub item_read: Style,
    pub empty_message: Style,

    // -- Status rows --
    pub status_update: Style,
    pub status_post: Style,
    pub counter: Style,
    pub instructions: Style,
    pub prompt: Style,

    // -- Preview --
    pub preview_text: Style,
}

impl ColorPalette {
    pub fn from_config(colors: &ColorsConfig) -> Self {
        let bg = palette_color(colors.background);
        let base = Style::default().bg(bg);
        let fg = |index: i16| base.fg(palette_color(index));

        Self {
            panel_active: fg(colors.active_panel),
            panel_idle: fg(colors.idle_panel),
            pane_title: fg(colors.active_panel).add_modifier(Modifier::BOLD),

            item_text: fg(colors.item_text),
            item_selected: fg(colors.item_highlight).add_modifier(Modifier::BOLD),
            item_read: fg(colors.read_item),
            empty_message: fg(colors.idle_panel).add_modifier(Modifier::ITALIC),

            status_update: fg(colors.active_panel),
            status_post: fg(colors.status_line),
            counter: fg(colors.counter).add_modifier(Modifier::BOLD),
            instructions: fg(colors.instructions_line),
            prompt: fg(colors.active_panel).add_modifier(Modifier::BOLD),

            preview_text: fg(colors.item_text),
        }
    }

    /// Border style for a pane, depending on whether it has focus.
    pub fn border(&self, focused: bool) -> Style {
        if focused {
            self.panel_active
        } else {
            self.panel_idle
        }
    }
}

impl Default for ColorPalette {
    fn default() -> Self {
        Self::from_config(&ColorsConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_palette_color_mapping() {
        assert_eq!(palette_color(-1), Color::Reset);
        assert_eq!(palette_color(0), Color::Indexed(0));
        assert_eq!(palette_color(255), Color::Indexed(255));
        assert_eq!(palette_color(300), Color::Reset);
        assert_eq!(palette_color(-7), Color::Reset);
    }

    #[test]
    fn test_default_palette_roles() {
        let palette = ColorPalette::default();
        assert_eq!(palette.panel_active.fg, Some(Color::Indexed(6)));
        assert_eq!(palette.panel_idle.fg, Some(Color::Indexed(8)));
        assert_eq!(palette.counter.fg, Some(Color::Indexed(3)));
        assert_eq!(palette.item_read.fg, Some(Color::Indexed(8)));
        assert_eq!(palette.item_text.bg, Some(Color::Reset));
    }

    #[test]
    fn test_background_applies_to_every_role() {
        let colors = ColorsConfig {
            background: 4,
            ..ColorsConfig::default()
        };
        let palette = ColorPalette::from_config(&colors);
        for style in [
            palette.panel_active,
            palette.item_selected,
            palette.status_post,
            palette.instructions,
        ] {
            assert_eq!(style.bg, Some(Color::Indexed(4)));
        }
    }

    #[test]
    fn test_border_follows_focus() {
        let palette = ColorPalette::default();
        assert_eq!(palette.border(true), palette.panel_active);
        assert_eq!(palette.border(false), palette.panel_idle);
    }
}
