use crate::app::App;
use crate::util::{clip_to_width, display_width};
use ratatui::{buffer::Buffer, layout::Rect, style::Style, Frame};

/// Render the status row and the info row.
///
/// While the add-subscription prompt is open it replaces the status row and
/// the terminal cursor sits at the end of the input.
pub(super) fn render(f: &mut Frame, app: &App, status: Rect, info: Rect) {
    if status.width < 1 || status.height < 1 {
        return;
    }
    let palette = &app.palette;

    if let Some(prompt) = &app.prompt {
        let label = prompt.label();
        let input_col = display_width(label) + 1;
        let buf = f.buffer_mut();
        put(buf, status, 0, label, palette.prompt);
        put(buf, status, input_col, prompt.input(), palette.status_post);

        let cursor = (input_col + display_width(prompt.input()))
            .min(usize::from(status.width) - 1);
        f.set_cursor_position((status.x + column(cursor), status.y));
    } else {
        let composed = app.status.compose(usize::from(status.width));
        let buf = f.buffer_mut();
        put(buf, status, 0, &composed.update, palette.status_update);
        put(buf, status, composed.post_col, &composed.post, palette.status_post);
        put(buf, status, composed.counter_col, &composed.counter, palette.counter);
    }

    if info.width >= 1 && info.height >= 1 {
        let line = clip_to_width(app.info_line(), usize::from(info.width));
        put(f.buffer_mut(), info, 0, &line, palette.instructions);
    }
}

/// Write `text` at column `offset` of the one-row `area`, clipped to it.
fn put(buf: &mut Buffer, area: Rect, offset: usize, text: &str, style: Style) {
    let width = usize::from(area.width);
    if offset >= width || text.is_empty() {
        return;
    }
    buf.set_stringn(area.x + column(offset), area.y, text, width - offset, style);
}

fn column(offset: usize) -> u16 {
    u16::try_from(offset).unwrap_or(u16::MAX)
}
