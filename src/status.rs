//! Status and info line composition.
//!
//! The status row has three segments: an update message on the left, the
//! current post caption after it, and the unread counter flush right. Each
//! call to [`StatusLine::update`] replaces only the segments it is given, so
//! a progress message does not wipe the caption of the post on screen.

use crate::util::{clip_to_width, display_width};

pub const POSTS_INFO_LINE: &str = "Enter: See Preview  A: mark all read  u: mark unread  r: mark read  = : change sort type s: mark saved  S: mark unsaved R: refresh  o: Open in plain-text  O: Open in Browser  F1: exit";
pub const CATEGORIES_INFO_LINE: &str =
    "Enter: Fetch Stream  A: mark all read  R: refresh  F1: exit";

/// Post counters for the loaded stream.
///
/// `unread` stays within `0..=total`: increments and decrements saturate at
/// the bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PostCounts {
    total: usize,
    unread: usize,
}

impl PostCounts {
    /// Counters for a freshly loaded stream, where every post is unread.
    pub fn fresh(total: usize) -> Self {
        Self {
            total,
            unread: total,
        }
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn unread(&self) -> usize {
        self.unread
    }

    pub fn read(&self) -> usize {
        self.total - self.unread
    }

    pub fn mark_one_read(&mut self) {
        self.unread = self.unread.saturating_sub(1);
    }

    pub fn mark_one_unread(&mut self) {
        self.unread = (self.unread + 1).min(self.total);
    }

    /// `[unread:read/total]`
    pub fn label(&self) -> String {
        format!("[{}:{}/{}]", self.unread, self.read(), self.total)
    }
}

/// The three status segments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    update: String,
    post: String,
    counter: String,
}

/// A status line laid out for a given terminal width. Columns are zero-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedStatus {
    pub update: String,
    pub post_col: usize,
    pub post: String,
    pub counter_col: usize,
    pub counter: String,
}

impl StatusLine {
    /// Replace the update and post segments when given. The counter is
    /// shown when `counts` is given and cleared otherwise.
    pub fn update(&mut self, update: Option<&str>, post: Option<&str>, counts: Option<PostCounts>) {
        if let Some(update) = update {
            self.update = update.to_string();
        }
        if let Some(post) = post {
            self.post = post.to_string();
        }
        self.counter = counts.map(|c| c.label()).unwrap_or_default();
    }

    /// Show `message` (an error, or empty on success) with the counter on
    /// success only.
    pub fn report(&mut self, message: &str, counts: PostCounts) {
        let counts = message.is_empty().then_some(counts);
        self.update(Some(message), None, counts);
    }

    pub fn update_text(&self) -> &str {
        &self.update
    }

    pub fn post_text(&self) -> &str {
        &self.post
    }

    pub fn counter_text(&self) -> &str {
        &self.counter
    }

    /// Lay the segments out on a row of `width` columns.
    ///
    /// The caption starts one column after the update message and is clipped
    /// so that it leaves a gap before the right-aligned counter.
    pub fn compose(&self, width: usize) -> ComposedStatus {
        let update_w = display_width(&self.update);
        let counter_w = display_width(&self.counter);

        let post_col = if self.update.is_empty() { 0 } else { update_w + 1 };
        let post_room = width.saturating_sub(update_w + counter_w + 2);

        ComposedStatus {
            update: clip_to_width(&self.update, width).into_owned(),
            post_col,
            post: clip_to_width(&self.post, post_room).into_owned(),
            counter_col: width.saturating_sub(counter_w),
            counter: self.counter.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    #[test]
    fn test_counter_label() {
        let mut counts = PostCounts::fresh(10);
        counts.mark_one_read();
        counts.mark_one_read();
        assert_eq!(counts.label(), "[8:2/10]");
    }

    #[test]
    fn test_counts_saturate() {
        let mut counts = PostCounts::fresh(1);
        counts.mark_one_unread();
        assert_eq!(counts.unread(), 1);
        counts.mark_one_read();
        counts.mark_one_read();
        assert_eq!(counts.unread(), 0);
        assert_eq!(counts.read(), 1);
    }

    #[test]
    fn test_none_keeps_previous_segment() {
        let mut status = StatusLine::default();
        status.update(Some("[Updating stream]"), Some(""), None);
        status.update(None, Some("Blog - Title"), Some(PostCounts::fresh(3)));
        assert_eq!(status.update_text(), "[Updating stream]");
        assert_eq!(status.post_text(), "Blog - Title");
        assert_eq!(status.counter_text(), "[3:0/3]");

        status.update(Some("[Marking post read]"), None, None);
        assert_eq!(status.post_text(), "Blog - Title");
        assert_eq!(status.counter_text(), "");
    }

    #[test]
    fn test_report_success_and_error() {
        let mut status = StatusLine::default();
        status.report("", PostCounts::fresh(2));
        assert_eq!(status.update_text(), "");
        assert_eq!(status.counter_text(), "[2:0/2]");

        status.report("HTTP 500: boom", PostCounts::fresh(2));
        assert_eq!(status.update_text(), "HTTP 500: boom");
        assert_eq!(status.counter_text(), "");
    }

    #[test]
    fn test_compose_layout() {
        let mut status = StatusLine::default();
        status.update(Some("[x]"), Some("Origin - A long title"), Some(PostCounts::fresh(5)));
        let composed = status.compose(30);
        // "[x]" (3) + counter "[5:0/5]" (7) + 2 gap leaves 18 for the caption.
        assert_eq!(
            composed,
            ComposedStatus {
                update: "[x]".into(),
                post_col: 4,
                post: "Origin - A long ti".into(),
                counter_col: 23,
                counter: "[5:0/5]".into(),
            }
        );
    }

    #[test]
    fn test_compose_without_update_starts_caption_at_zero() {
        let mut status = StatusLine::default();
        status.update(None, Some("caption"), None);
        let composed = status.compose(80);
        assert_eq!(composed.post_col, 0);
        assert_eq!(composed.post, "caption");
        assert_eq!(composed.counter_col, 80);
    }

    #[test]
    fn test_compose_narrow_terminal_drops_caption() {
        let mut status = StatusLine::default();
        status.update(Some("[Updating stream]"), Some("caption"), Some(PostCounts::fresh(100)));
        let composed = status.compose(20);
        assert_eq!(composed.post, "");
    }

    proptest! {
        #[test]
        fn prop_unread_stays_in_bounds(total in 0usize..50, ops in proptest::collection::vec(any::<bool>(), 0..100)) {
            let mut counts = PostCounts::fresh(total);
            for read in ops {
                let before = counts.unread();
                if read {
                    counts.mark_one_read();
                    prop_assert_eq!(counts.unread(), before.saturating_sub(1));
                } else {
                    counts.mark_one_unread();
                    prop_assert_eq!(counts.unread(), (before + 1).min(total));
                }
                prop_assert!(counts.unread() <= counts.total());
            }
        }
    }
}
