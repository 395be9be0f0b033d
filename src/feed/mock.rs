//! In-memory backend for session tests.

use super::{BackendError, Category, FeedBackend, NewSubscription, PostDetail, StreamEntry};
use futures::future::{BoxFuture, FutureExt};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// A recorded backend call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    ListCategories,
    ListStream { stream: String, rank: bool },
    Detail(usize),
    MarkRead(Vec<String>),
    MarkUnread(Vec<String>),
    MarkSaved(Vec<String>),
    MarkUnsaved(Vec<String>),
    MarkCategoryRead { category: String, entry: String },
    AddSubscription(NewSubscription),
}

#[derive(Default)]
struct State {
    categories: Vec<Category>,
    streams: HashMap<String, Vec<StreamEntry>>,
    current: Vec<StreamEntry>,
    calls: Vec<Call>,
    failing: HashSet<&'static str>,
}

/// Serves canned categories and streams. Operations named in `fail(...)`
/// return `BackendError::Status { status: 500, .. }`.
#[derive(Default)]
pub struct MockBackend {
    state: Mutex<State>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(self, cats: &[(&str, &str)]) -> Self {
        self.state.lock().unwrap().categories = cats
            .iter()
            .map(|(label, id)| Category::new(*label, *id))
            .collect();
        self
    }

    /// Stream contents in chronological order. Ranked listings return the
    /// reverse.
    pub fn with_stream(self, stream: &str, titles: &[&str]) -> Self {
        let entries = titles
            .iter()
            .map(|t| StreamEntry {
                id: format!("{stream}:{t}"),
                title: t.to_string(),
            })
            .collect();
        self.state
            .lock()
            .unwrap()
            .streams
            .insert(stream.to_string(), entries);
        self
    }

    pub fn fail(&self, op: &'static str) {
        self.state.lock().unwrap().failing.insert(op);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.state.lock().unwrap().calls.clear();
    }

    fn record(&self, call: Call, op: &'static str) -> Result<(), BackendError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if state.failing.contains(op) {
            return Err(BackendError::Status {
                status: 500,
                message: format!("{op} failed"),
            });
        }
        Ok(())
    }
}

impl FeedBackend for MockBackend {
    fn authenticate(&self) -> BoxFuture<'_, Result<(), BackendError>> {
        async { Ok(()) }.boxed()
    }

    fn list_categories(&self) -> BoxFuture<'_, Result<Vec<Category>, BackendError>> {
        async move {
            self.record(Call::ListCategories, "categories")?;
            Ok(self.state.lock().unwrap().categories.clone())
        }
        .boxed()
    }

    fn list_stream_posts<'a>(
        &'a self,
        stream: &'a str,
        rank: bool,
    ) -> BoxFuture<'a, Result<Vec<StreamEntry>, BackendError>> {
        async move {
            self.record(
                Call::ListStream {
                    stream: stream.to_string(),
                    rank,
                },
                "stream",
            )?;
            let mut state = self.state.lock().unwrap();
            let mut entries = state.streams.get(stream).cloned().unwrap_or_default();
            if rank {
                entries.reverse();
            }
            state.current = entries.clone();
            Ok(entries)
        }
        .boxed()
    }

    fn post_detail(&self, index: usize) -> BoxFuture<'_, Result<PostDetail, BackendError>> {
        async move {
            self.record(Call::Detail(index), "detail")?;
            let state = self.state.lock().unwrap();
            let entry = state
                .current
                .get(index)
                .ok_or(BackendError::NoSuchPost(index))?;
            Ok(PostDetail {
                id: entry.id.clone(),
                title: entry.title.clone(),
                origin_title: "Origin".to_string(),
                origin_url: format!("https://example.com/{}", entry.title),
                content: format!("<p>{}</p>", entry.title),
            })
        }
        .boxed()
    }

    fn mark_read<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<(), BackendError>> {
        async move { self.record(Call::MarkRead(ids.to_vec()), "read") }.boxed()
    }

    fn mark_unread<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<(), BackendError>> {
        async move { self.record(Call::MarkUnread(ids.to_vec()), "unread") }.boxed()
    }

    fn mark_saved<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<(), BackendError>> {
        async move { self.record(Call::MarkSaved(ids.to_vec()), "saved") }.boxed()
    }

    fn mark_unsaved<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<(), BackendError>> {
        async move { self.record(Call::MarkUnsaved(ids.to_vec()), "unsaved") }.boxed()
    }

    fn mark_category_read_up_to<'a>(
        &'a self,
        category_id: &'a str,
        entry_id: &'a str,
    ) -> BoxFuture<'a, Result<(), BackendError>> {
        async move {
            self.record(
                Call::MarkCategoryRead {
                    category: category_id.to_string(),
                    entry: entry_id.to_string(),
                },
                "category_read",
            )?;
            // Drop everything up to and including the entry from the stream.
            let mut state = self.state.lock().unwrap();
            if let Some(entries) = state.streams.get_mut(category_id) {
                if let Some(pos) = entries.iter().position(|e| e.id == entry_id) {
                    entries.drain(..=pos);
                }
            }
            Ok(())
        }
        .boxed()
    }

    fn add_subscription<'a>(
        &'a self,
        subscription: &'a NewSubscription,
    ) -> BoxFuture<'a, Result<(), BackendError>> {
        async move {
            self.record(Call::AddSubscription(subscription.clone()), "subscribe")
        }
        .boxed()
    }
}
