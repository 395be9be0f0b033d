use crate::app::{App, Focus};
use crate::util::truncate_to_width;
use ratatui::{
    layout::{Alignment, Rect},
    text::Line,
    widgets::{List, ListItem, ListState, Paragraph},
    Frame,
};

use super::render::pane_block;

/// Render the posts pane. Read posts are dimmed; an empty list shows the
/// pending message centered in the pane.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let focused = app.focus == Focus::Posts;
    let block = pane_block("Posts", focused, &app.palette);

    if app.posts.is_empty() {
        let inner = block.inner(area);
        f.render_widget(block, area);
        if let Some(message) = app.posts_message {
            let row = Rect::new(inner.x, inner.y + inner.height / 2, inner.width, 1);
            let paragraph = Paragraph::new(message)
                .style(app.palette.empty_message)
                .alignment(Alignment::Center);
            f.render_widget(paragraph, row);
        }
        return;
    }

    let title_width = usize::from(area.width.saturating_sub(3));
    let items: Vec<ListItem> = app
        .posts
        .items()
        .iter()
        .map(|post| {
            let style = if post.is_unread() {
                app.palette.item_text
            } else {
                app.palette.item_read
            };
            ListItem::new(Line::styled(
                truncate_to_width(&post.title, title_width),
                style,
            ))
        })
        .collect();

    let list = List::new(items)
        .block(block)
        .highlight_style(app.palette.item_selected)
        .highlight_symbol("*");

    let mut state = ListState::default().with_selected(app.posts.cursor());
    f.render_stateful_widget(list, area, &mut state);
}
