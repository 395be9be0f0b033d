//! Pane geometry and frame rendering.
//!
//! The screen is split into a top row holding the categories and posts
//! panes side by side, the preview pane under them across the full width,
//! and two text rows at the bottom: the status line and the info line.

use crate::app::App;
use crate::theme::ColorPalette;
use ratatui::{
    layout::{Alignment, Rect},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::{categories, posts, preview, status};

/// Minimum terminal dimensions required for normal operation.
pub(super) const MIN_WIDTH: u16 = 40;
pub(super) const MIN_HEIGHT: u16 = 10;

/// Rows the list panes always keep, borders included.
const MIN_LIST_HEIGHT: u16 = 3;
/// Columns the posts pane always keeps.
const MIN_POSTS_WIDTH: u16 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct PaneLayout {
    pub categories: Rect,
    pub posts: Rect,
    pub preview: Rect,
    pub status: Rect,
    pub info: Rect,
}

impl PaneLayout {
    /// Split `area` into panes. `None` when the terminal is too small.
    ///
    /// A non-zero `view_height` fixes the preview height; otherwise it is
    /// `view_height_percent` of the rows above the two text lines.
    pub fn compute(
        area: Rect,
        category_width: u16,
        view_height: u16,
        view_height_percent: u16,
    ) -> Option<Self> {
        if area.width < MIN_WIDTH || area.height < MIN_HEIGHT {
            return None;
        }

        let body = area.height - 2;
        let wanted = if view_height > 0 {
            view_height
        } else {
            let share = u32::from(body) * u32::from(view_height_percent.min(100)) / 100;
            u16::try_from(share).unwrap_or(body)
        };
        let preview_height = wanted.min(body - MIN_LIST_HEIGHT);
        let top_height = body - preview_height;

        let category_width = category_width.clamp(1, area.width - MIN_POSTS_WIDTH);

        Some(Self {
            categories: Rect::new(area.x, area.y, category_width, top_height),
            posts: Rect::new(
                area.x + category_width,
                area.y,
                area.width - category_width,
                top_height,
            ),
            preview: Rect::new(area.x, area.y + top_height, area.width, preview_height),
            status: Rect::new(area.x, area.y + body, area.width, 1),
            info: Rect::new(area.x, area.y + body + 1, area.width, 1),
        })
    }

    pub fn for_app(area: Rect, app: &App) -> Option<Self> {
        Self::compute(
            area,
            app.category_width,
            app.view_height,
            app.view_height_percent,
        )
    }

    /// Text columns inside the preview pane borders.
    pub fn preview_cols(&self) -> u16 {
        self.preview.width.saturating_sub(2).max(1)
    }
}

/// Bordered pane with a centered title.
pub(super) fn pane_block<'a>(title: &'a str, focused: bool, palette: &ColorPalette) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_style(palette.border(focused))
        .title(title)
        .title_alignment(Alignment::Center)
        .title_style(palette.pane_title)
}

/// Draw every pane and both text rows.
pub(super) fn render(f: &mut Frame, app: &App) {
    let area = f.area();
    if area.width < 1 || area.height < 1 {
        return;
    }

    let Some(layout) = PaneLayout::for_app(area, app) else {
        let msg = if area.height < 3 || area.width < 20 {
            Paragraph::new("Too small")
        } else {
            Paragraph::new(format!(
                "Terminal too small\n\nMinimum: {}x{}\nCurrent: {}x{}",
                MIN_WIDTH, MIN_HEIGHT, area.width, area.height
            ))
            .alignment(Alignment::Center)
        };
        f.render_widget(msg, area);
        return;
    };

    categories::render(f, app, layout.categories);
    posts::render(f, app, layout.posts);
    preview::render(f, app, layout.preview);
    status::render(f, app, layout.status, layout.info);
}
