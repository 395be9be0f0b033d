//! Session state and the operations the key dispatcher invokes.
//!
//! Every backend call is awaited inline, so the lists, counters and the
//! dwell clock are only ever touched from the UI task. Operations that show
//! a progress message first call [`Progress::show`] so the UI can draw it
//! before the request goes out.

use crate::config::Config;
use crate::feed::{
    order_categories, Category, FeedBackend, NewSubscription, Post, PostDetail, ALL_LABEL,
};
use crate::keybindings::{Context, KeybindingRegistry};
use crate::preview::{ExternalLaunch, LaunchKind, PreviewError, PreviewPipeline};
use crate::read_tracking::DwellTimer;
use crate::selection::SelectableList;
use crate::status::{PostCounts, StatusLine, CATEGORIES_INFO_LINE, POSTS_INFO_LINE};
use crate::theme::ColorPalette;
use crate::util::validate_url_for_open;
use std::sync::Arc;

pub const UPDATING_STREAM: &str = "[Updating stream]";
pub const LOADING: &str = "Loading...";
pub const ALL_POSTS_READ: &str = "All Posts Read";
pub const NO_POSTS: &str = "No Posts";

// ============================================================================
// Focus
// ============================================================================

/// Which pane receives navigation keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Categories,
    Posts,
}

impl Focus {
    pub fn toggle(self) -> Self {
        match self {
            Self::Categories => Self::Posts,
            Self::Posts => Self::Categories,
        }
    }

    pub fn context(self) -> Context {
        match self {
            Self::Categories => Context::Categories,
            Self::Posts => Context::Posts,
        }
    }

    pub fn info_line(self) -> &'static str {
        match self {
            Self::Categories => CATEGORIES_INFO_LINE,
            Self::Posts => POSTS_INFO_LINE,
        }
    }
}

// ============================================================================
// Add-subscription Prompt
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStage {
    Feed,
    Title,
    Category,
}

/// Three-stage line editor on the status row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionPrompt {
    stage: PromptStage,
    input: String,
    feed: String,
    title: String,
}

/// Outcome of pressing Enter in the prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptStep {
    Next,
    Done(NewSubscription),
}

impl Default for SubscriptionPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl SubscriptionPrompt {
    const MAX_INPUT: usize = 200;

    pub fn new() -> Self {
        Self {
            stage: PromptStage::Feed,
            input: String::new(),
            feed: String::new(),
            title: String::new(),
        }
    }

    pub fn stage(&self) -> PromptStage {
        self.stage
    }

    pub fn label(&self) -> &'static str {
        match self.stage {
            PromptStage::Feed => "[ENTER FEED]:",
            PromptStage::Title => "[ENTER TITLE]:",
            PromptStage::Category => "[ENTER CATEGORY]:",
        }
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn push(&mut self, c: char) {
        if self.input.chars().count() < Self::MAX_INPUT && !c.is_control() {
            self.input.push(c);
        }
    }

    pub fn backspace(&mut self) {
        self.input.pop();
    }

    /// Accept the current field and move on. After the category field the
    /// collected subscription is returned.
    pub fn advance(&mut self) -> PromptStep {
        let value = std::mem::take(&mut self.input).trim().to_string();
        match self.stage {
            PromptStage::Feed => {
                self.feed = value;
                self.stage = PromptStage::Title;
                PromptStep::Next
            }
            PromptStage::Title => {
                self.title = value;
                self.stage = PromptStage::Category;
                PromptStep::Next
            }
            PromptStage::Category => PromptStep::Done(NewSubscription {
                is_feed: false,
                url: std::mem::take(&mut self.feed),
                categories: value.split_whitespace().map(str::to_string).collect(),
                title: std::mem::take(&mut self.title),
            }),
        }
    }
}

// ============================================================================
// Progress
// ============================================================================

/// Gives the UI a chance to draw a progress message before a slow call.
pub trait Progress {
    fn show(&mut self, app: &App);
}

impl<F: FnMut(&App)> Progress for F {
    fn show(&mut self, app: &App) {
        self(app)
    }
}

type Opener = Box<dyn Fn(&str) -> std::io::Result<()> + Send + Sync>;

// ============================================================================
// App
// ============================================================================

pub struct App {
    backend: Arc<dyn FeedBackend>,
    pipeline: PreviewPipeline,
    opener: Opener,
    dwell: DwellTimer,

    pub palette: ColorPalette,
    pub keybindings: KeybindingRegistry,

    // Layout settings
    pub category_width: u16,
    pub view_height: u16,
    pub view_height_percent: u16,

    // Data
    pub categories: SelectableList<Category>,
    pub posts: SelectableList<Post>,
    pub counts: PostCounts,
    pub rank: bool,
    /// Id of the newest post known to be read, the upper bound for
    /// mark-category-read.
    pub last_entry_read: Option<String>,

    // UI State
    pub focus: Focus,
    pub preview_text: String,
    /// Renderer width, kept in step with the preview pane by the UI loop.
    pub preview_cols: u16,
    pub status: StatusLine,
    /// Centered message in the posts pane when it has no items.
    pub posts_message: Option<&'static str>,
    pub prompt: Option<SubscriptionPrompt>,
    pub needs_redraw: bool,
}

impl App {
    pub fn new(backend: Arc<dyn FeedBackend>, pipeline: PreviewPipeline, config: &Config) -> Self {
        Self {
            backend,
            pipeline,
            opener: Box::new(|url: &str| open::that_detached(url)),
            dwell: DwellTimer::new(config.seconds_to_mark_as_read),
            palette: ColorPalette::from_config(&config.colors),
            keybindings: KeybindingRegistry::new(),
            category_width: config.category_width(),
            view_height: config.view_win_height,
            view_height_percent: config.view_win_height_per,
            categories: SelectableList::default(),
            posts: SelectableList::default(),
            counts: PostCounts::default(),
            rank: config.rank,
            last_entry_read: None,
            focus: Focus::Posts,
            preview_text: String::new(),
            preview_cols: 80,
            status: StatusLine::default(),
            posts_message: Some(LOADING),
            prompt: None,
            needs_redraw: true,
        }
    }

    /// Replace the desktop URL opener.
    pub fn with_opener(
        mut self,
        opener: impl Fn(&str) -> std::io::Result<()> + Send + Sync + 'static,
    ) -> Self {
        self.opener = Box::new(opener);
        self
    }

    pub fn info_line(&self) -> &'static str {
        self.focus.info_line()
    }

    fn set_focus(&mut self, focus: Focus) {
        if self.focus != focus {
            tracing::debug!(?focus, "Focus changed");
        }
        self.focus = focus;
        self.needs_redraw = true;
    }

    fn show_error(&mut self, message: impl std::fmt::Display) {
        let message = message.to_string();
        tracing::warn!(%message, "Operation failed");
        self.status.update(Some(&message), None, None);
    }

    /// Load the categories and the "All" stream. Focus starts on the posts
    /// when there is anything unread.
    pub async fn init(&mut self, progress: &mut dyn Progress) {
        self.posts_message = Some(LOADING);
        progress.show(self);

        let category_error = match self.backend.list_categories().await {
            Ok(categories) => {
                self.categories.replace(order_categories(categories));
                None
            }
            Err(e) => {
                self.categories.clear();
                Some(e.to_string())
            }
        };

        let all = self
            .categories
            .items()
            .iter()
            .find(|c| c.label == ALL_LABEL)
            .map(|c| c.id.clone())
            .unwrap_or_else(|| ALL_LABEL.to_string());
        self.load_stream(&all, progress).await;

        if let Some(err) = category_error {
            self.show_error(err);
        }

        let focus = if self.counts.total() > 0 {
            Focus::Posts
        } else {
            Focus::Categories
        };
        self.set_focus(focus);
    }

    /// Fetch `stream_id` and make it the posts list.
    ///
    /// The post being left is evaluated for auto-mark first. On success the
    /// first post becomes the current one and is previewed; on failure the
    /// list is emptied and the error is shown.
    async fn load_stream(&mut self, stream_id: &str, progress: &mut dyn Progress) {
        self.auto_mark_current(progress).await;

        let error = match self.backend.list_stream_posts(stream_id, self.rank).await {
            Ok(entries) => {
                let posts = entries
                    .into_iter()
                    .map(|e| Post::unread(e.id, &e.title))
                    .collect();
                self.posts.replace(posts);
                None
            }
            Err(e) => {
                self.posts.clear();
                Some(e.to_string())
            }
        };

        self.counts = PostCounts::fresh(self.posts.len());
        self.status
            .report(error.as_deref().unwrap_or_default(), self.counts);
        tracing::debug!(stream = %stream_id, total = self.counts.total(), rank = self.rank, "Stream loaded");

        match self.posts.items().first() {
            Some(first) => {
                self.posts_message = None;
                self.last_entry_read = Some(first.id.clone());
                self.dwell.restart();
                self.show_current_post().await;
            }
            None => {
                self.posts_message = Some(if error.is_some() { NO_POSTS } else { ALL_POSTS_READ });
                self.preview_text.clear();
            }
        }
        self.needs_redraw = true;
    }

    async fn reload_current_category(&mut self, progress: &mut dyn Progress) -> bool {
        let Some(id) = self.categories.current().map(|c| c.id.clone()) else {
            return false;
        };
        self.load_stream(&id, progress).await;
        true
    }

    /// Fetch and render the current post into the preview pane.
    async fn show_current_post(&mut self) {
        let Some(index) = self.posts.cursor() else {
            return;
        };
        let detail = match self.backend.post_detail(index).await {
            Ok(d) => d,
            Err(e) => return self.show_error(e),
        };
        match self.pipeline.render(&detail.content, self.preview_cols).await {
            Ok(text) => self.preview_text = text,
            Err(e) => {
                self.preview_text.clear();
                return self.show_error(e);
            }
        }
        self.status
            .update(None, Some(&detail.caption()), Some(self.counts));
        self.needs_redraw = true;
    }

    /// Re-render the preview for a new pane width. No-op when the width is
    /// unchanged.
    pub async fn resize_preview(&mut self, cols: u16) {
        if cols == self.preview_cols {
            return;
        }
        self.preview_cols = cols;
        tracing::debug!(cols, "Preview width updated");
        self.show_current_post().await;
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------------
    // Read state
    // ------------------------------------------------------------------------

    /// Mark the post at `index` read. A no-op on a post that is already read.
    ///
    /// The local flag flips before the request and flips back if the backend
    /// refuses, so the list never disagrees with the service.
    async fn mark_read_at(&mut self, index: usize, progress: &mut dyn Progress) {
        let id = match self.posts.get_mut(index) {
            Some(post) if post.is_unread() => {
                post.selectable = false;
                post.id.clone()
            }
            _ => return,
        };
        self.status
            .update(Some("[Marking post read]"), None, Some(self.counts));
        progress.show(self);

        let result = self.backend.mark_read(std::slice::from_ref(&id)).await;
        match result {
            Ok(()) => {
                self.counts.mark_one_read();
                tracing::debug!(post = %id, unread = self.counts.unread(), "Marked read");
                self.status.report("", self.counts);
            }
            Err(e) => {
                if let Some(post) = self.posts.get_mut(index) {
                    post.selectable = true;
                }
                tracing::warn!(post = %id, error = %e, "Mark read failed");
                self.status.report(&e.to_string(), self.counts);
            }
        }
        self.needs_redraw = true;
    }

    /// Evaluate the dwell timer for the current post and restart it.
    async fn auto_mark_current(&mut self, progress: &mut dyn Progress) {
        let current = self.posts.cursor();
        if self.dwell.should_mark(current.is_some()) {
            if let Some(index) = current {
                tracing::debug!(index, "Dwell threshold exceeded");
                self.mark_read_at(index, progress).await;
            }
        }
    }

    pub async fn mark_read(&mut self, progress: &mut dyn Progress) {
        if let Some(index) = self.posts.cursor() {
            self.mark_read_at(index, progress).await;
        }
    }

    /// Mark the current, already read post unread.
    ///
    /// The flag flips only once the backend has accepted the change. Either
    /// way the dwell clock is stopped so the post is not read again as soon
    /// as the cursor leaves it.
    pub async fn mark_unread(&mut self, progress: &mut dyn Progress) {
        let id = match self.posts.current() {
            Some(post) if !post.is_unread() => post.id.clone(),
            _ => return,
        };
        self.status
            .update(Some("[Marking post unread]"), None, Some(self.counts));
        progress.show(self);

        let result = self.backend.mark_unread(std::slice::from_ref(&id)).await;
        match result {
            Ok(()) => {
                if let Some(post) = self.posts.current_mut() {
                    post.selectable = true;
                }
                self.counts.mark_one_unread();
                tracing::debug!(post = %id, unread = self.counts.unread(), "Marked unread");
                self.status.report("", self.counts);
            }
            Err(e) => self.status.report(&e.to_string(), self.counts),
        }
        self.dwell.disarm();
        self.needs_redraw = true;
    }

    pub async fn mark_saved(&mut self, progress: &mut dyn Progress) {
        self.toggle_saved(true, progress).await;
    }

    pub async fn mark_unsaved(&mut self, progress: &mut dyn Progress) {
        self.toggle_saved(false, progress).await;
    }

    async fn toggle_saved(&mut self, saved: bool, progress: &mut dyn Progress) {
        let Some(id) = self.posts.current().map(|p| p.id.clone()) else {
            return;
        };
        let message = if saved {
            "[Marking post saved]"
        } else {
            "[Marking post Unsaved]"
        };
        self.status.update(Some(message), None, Some(self.counts));
        progress.show(self);

        let ids = std::slice::from_ref(&id);
        let result = if saved {
            self.backend.mark_saved(ids).await
        } else {
            self.backend.mark_unsaved(ids).await
        };
        let error = result.err().map(|e| e.to_string());
        self.status
            .report(error.as_deref().unwrap_or_default(), self.counts);
        self.needs_redraw = true;
    }

    // ------------------------------------------------------------------------
    // Navigation
    // ------------------------------------------------------------------------

    pub fn toggle_focus(&mut self) {
        self.set_focus(self.focus.toggle());
    }

    /// Move the cursor of the focused pane.
    ///
    /// In the posts pane a real move evaluates the dwell timer for the post
    /// being left and previews the new one.
    pub async fn move_cursor(&mut self, down: bool, progress: &mut dyn Progress) {
        match self.focus {
            Focus::Categories => {
                if down {
                    self.categories.next();
                } else {
                    self.categories.previous();
                }
                self.needs_redraw = true;
            }
            Focus::Posts => {
                let previous = self.posts.cursor();
                let moved = if down {
                    self.posts.next()
                } else {
                    self.posts.previous()
                };
                if !moved {
                    return;
                }
                if self.dwell.should_mark(previous.is_some()) {
                    if let Some(index) = previous {
                        self.mark_read_at(index, progress).await;
                    }
                }
                self.show_current_post().await;
            }
        }
    }

    /// Enter on a category: load its stream and move to the posts when it
    /// has any.
    pub async fn select_category(&mut self, progress: &mut dyn Progress) {
        if self.categories.current().is_none() {
            return;
        }
        self.status.update(Some(UPDATING_STREAM), Some(""), None);
        progress.show(self);

        self.reload_current_category(progress).await;
        let focus = if self.counts.unread() == 0 {
            Focus::Categories
        } else {
            Focus::Posts
        };
        self.set_focus(focus);
    }

    /// Reload the current category, keeping the sort mode.
    pub async fn refresh(&mut self, progress: &mut dyn Progress) {
        if self.categories.current().is_none() {
            return;
        }
        self.preview_text.clear();
        self.status.update(Some(UPDATING_STREAM), Some(""), None);
        progress.show(self);
        self.reload_current_category(progress).await;
    }

    /// Flip between ranked and newest-first order and reload.
    pub async fn toggle_sort(&mut self, progress: &mut dyn Progress) {
        if self.categories.current().is_none() {
            return;
        }
        self.preview_text.clear();
        self.status.update(Some(UPDATING_STREAM), Some(""), None);
        progress.show(self);
        self.rank = !self.rank;
        tracing::debug!(rank = self.rank, "Sort order toggled");
        self.reload_current_category(progress).await;
    }

    /// Mark everything in the current category up to `last_entry_read`
    /// read, reload it, and return focus to the categories.
    pub async fn mark_category_read(&mut self, progress: &mut dyn Progress) {
        let Some(category_id) = self.categories.current().map(|c| c.id.clone()) else {
            return;
        };
        self.preview_text.clear();
        self.status
            .update(Some("[Marking category read]"), Some(""), Some(self.counts));
        progress.show(self);

        let mut error = None;
        if let Some(entry) = self.last_entry_read.clone() {
            if let Err(e) = self
                .backend
                .mark_category_read_up_to(&category_id, &entry)
                .await
            {
                error = Some(e.to_string());
            }
        }

        self.load_stream(&category_id, progress).await;
        if let Some(err) = error {
            self.show_error(err);
        }
        self.set_focus(Focus::Categories);
    }

    // ------------------------------------------------------------------------
    // Opening posts
    // ------------------------------------------------------------------------

    async fn current_detail(&mut self) -> Option<(usize, PostDetail)> {
        let index = self.posts.cursor()?;
        match self.backend.post_detail(index).await {
            Ok(detail) => Some((index, detail)),
            Err(e) => {
                self.show_error(e);
                None
            }
        }
    }

    /// Build the full-screen command for the current post. `None` when there
    /// is no post or its detail could not be fetched.
    pub async fn prepare_external(&mut self, kind: LaunchKind) -> Option<ExternalLaunch> {
        let (index, detail) = self.current_detail().await?;
        match kind {
            LaunchKind::Preview => match self.pipeline.preview_launch(&detail, index).await {
                Ok(launch) => Some(launch),
                Err(e) => {
                    self.show_error(e);
                    None
                }
            },
            LaunchKind::Browser => Some(self.pipeline.browser_launch(&detail, index)),
        }
    }

    /// Record the outcome of a full-screen viewer. A clean exit marks the
    /// post read; the preview scratch file is removed either way.
    pub async fn finish_external(
        &mut self,
        launch: &ExternalLaunch,
        outcome: Result<bool, PreviewError>,
        progress: &mut dyn Progress,
    ) {
        match outcome {
            Ok(true) => {
                self.mark_read_at(launch.index, progress).await;
                self.last_entry_read = Some(launch.post_id.clone());
            }
            Ok(false) => {
                self.status
                    .update(Some(launch.failure_message()), None, None);
            }
            Err(e) => self.show_error(format!("{}: {e}", launch.failure_message())),
        }
        if launch.kind == LaunchKind::Preview {
            self.pipeline.remove_scratch().await;
        }
        self.needs_redraw = true;
    }

    /// Hand the post URL to the desktop browser in the background, then mark
    /// the post read.
    pub async fn open_in_browser(&mut self, progress: &mut dyn Progress) {
        let Some((index, detail)) = self.current_detail().await else {
            return;
        };
        let url = match validate_url_for_open(&detail.origin_url) {
            Ok(url) => url,
            Err(e) => return self.show_error(e),
        };
        tracing::debug!(%url, "Opening in desktop browser");
        if let Err(e) = (self.opener)(url.as_str()) {
            return self.show_error(format!("Failed to open browser: {e}"));
        }
        self.mark_read_at(index, progress).await;
    }

    // ------------------------------------------------------------------------
    // Subscriptions
    // ------------------------------------------------------------------------

    pub fn start_prompt(&mut self) {
        self.prompt = Some(SubscriptionPrompt::new());
        self.needs_redraw = true;
    }

    pub fn cancel_prompt(&mut self) {
        self.prompt = None;
        self.needs_redraw = true;
    }

    /// Submit a collected subscription. An empty feed URL sends nothing.
    pub async fn submit_subscription(
        &mut self,
        subscription: NewSubscription,
        progress: &mut dyn Progress,
    ) {
        self.prompt = None;
        self.status
            .update(Some("[Adding subscription]"), None, Some(self.counts));
        progress.show(self);

        let mut error = None;
        if !subscription.url.is_empty() {
            if let Err(e) = self.backend.add_subscription(&subscription).await {
                error = Some(e.to_string());
            }
        }
        self.status
            .report(error.as_deref().unwrap_or_default(), self.counts);
        self.needs_redraw = true;
    }

    /// Session end: a post that has been on screen long enough is marked read
    /// before the program exits.
    pub async fn quit(&mut self, progress: &mut dyn Progress) {
        self.auto_mark_current(progress).await;
    }
}

// ============================================================================
// Tests
// ============================================================================
