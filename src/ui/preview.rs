use crate::app::App;
use ratatui::{layout::Rect, widgets::Paragraph, Frame};

use super::render::pane_block;

/// Render the renderer output verbatim. The pane never takes focus.
pub(super) fn render(f: &mut Frame, app: &App, area: Rect) {
    if area.width < 3 || area.height < 3 {
        return;
    }

    let paragraph = Paragraph::new(app.preview_text.as_str())
        .style(app.palette.preview_text)
        .block(pane_block("", false, &app.palette));
    f.render_widget(paragraph, area);
}
