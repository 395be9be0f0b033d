use std::borrow::Cow;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string in terminal columns.
///
/// CJK characters and most emoji count as two columns, combining marks as
/// zero.
pub fn display_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Byte index of the longest prefix of `s` that fits in `max_width` columns.
fn fit_prefix(s: &str, max_width: usize) -> usize {
    let mut width = 0;
    for (idx, c) in s.char_indices() {
        width += UnicodeWidthChar::width(c).unwrap_or(0);
        if width > max_width {
            return idx;
        }
    }
    s.len()
}

/// Cut `s` to at most `max_width` columns, without any marker.
///
/// Used for the status line, where the caption simply stops at the edge of
/// its segment.
pub fn clip_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    let end = fit_prefix(s, max_width);
    if end == s.len() {
        Cow::Borrowed(s)
    } else {
        Cow::Owned(s[..end].to_string())
    }
}

const ELLIPSIS: &str = "...";

/// Cut `s` to at most `max_width` columns, ending in `...` when something
/// was removed. Widths too narrow for a character plus the ellipsis clip
/// without it.
pub fn truncate_to_width(s: &str, max_width: usize) -> Cow<'_, str> {
    if display_width(s) <= max_width {
        return Cow::Borrowed(s);
    }
    if max_width <= ELLIPSIS.len() {
        return clip_to_width(s, max_width);
    }
    let end = fit_prefix(s, max_width - ELLIPSIS.len());
    Cow::Owned(format!("{}{}", &s[..end], ELLIPSIS))
}

/// Strip terminal control sequences from text before it is drawn.
///
/// Post titles come from the network and preview text from a child process;
/// either may carry escape sequences that would move the cursor or retitle
/// the terminal. Removes:
/// - ANSI CSI sequences (`ESC [` ... final byte 0x40-0x7E)
/// - OSC sequences (`ESC ]` ... BEL or `ESC \`)
/// - any other ESC and the byte after it
/// - backspace overstrikes (`_\bX` and `X\bX` become `X`)
/// - remaining C0 controls and DEL, except tab and newline
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    let dirty = s
        .bytes()
        .any(|b| b == 0x1b || b == 0x7f || (b < 0x20 && b != b'\t' && b != b'\n'));
    if !dirty {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\x1b' => match chars.next() {
                Some('[') => {
                    for f in chars.by_ref() {
                        if ('\x40'..='\x7e').contains(&f) {
                            break;
                        }
                    }
                }
                Some(']') => {
                    while let Some(f) = chars.next() {
                        if f == '\x07' {
                            break;
                        }
                        if f == '\x1b' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                _ => {}
            },
            '\x08' => {
                out.pop();
            }
            '\t' | '\n' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}
