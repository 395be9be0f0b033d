use crate::app::{App, Focus};
use crate::util::truncate_to_width;
use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{List, ListItem, ListState},
    Frame,
};

use super::render::pane_block;

/// Render the category list pane.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let focused = app.focus == Focus::Categories;
    // One column for the cursor mark.
    let label_width = usize::from(area.width.saturating_sub(3));

    let items: Vec<ListItem> = app
        .categories
        .items()
        .iter()
        .map(|c| {
            ListItem::new(Line::styled(
                truncate_to_width(&c.label, label_width),
                app.palette.item_text,
            ))
        })
        .collect();

    let list = List::new(items)
        .block(pane_block("Categories", focused, &app.palette))
        .highlight_style(app.palette.item_selected)
        .highlight_symbol("*");

    let mut state = ListState::default().with_selected(app.categories.cursor());
    f.render_stateful_widget(list, area, &mut state);
}
