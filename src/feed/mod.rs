//! Feed data model and the backend seam.
//!
//! The control loop never talks HTTP directly. It holds an
//! `Arc<dyn FeedBackend>` and converts every [`BackendError`] into a status
//! line message.
//!
//! - `types` - categories, posts, post details, errors
//! - `feedly` - the Feedly cloud implementation

mod feedly;
#[cfg(test)]
pub(crate) mod mock;
mod types;

pub use feedly::FeedlyClient;
pub use types::{BackendError, Category, NewSubscription, Post, PostDetail, StreamEntry};

use futures::future::BoxFuture;

/// Well-known categories, always listed first and in this order.
pub const ALL_LABEL: &str = "All";
pub const SAVED_LABEL: &str = "Saved";
pub const UNCATEGORIZED_LABEL: &str = "Uncategorized";
pub const PINNED_LABELS: [&str; 3] = [ALL_LABEL, SAVED_LABEL, UNCATEGORIZED_LABEL];

/// Remote feed service consumed by the session.
///
/// Methods return boxed futures so the session can hold the backend as a
/// trait object.
pub trait FeedBackend: Send + Sync {
    fn authenticate(&self) -> BoxFuture<'_, Result<(), BackendError>>;

    /// Category labels and ids, in backend order. Includes the well-known
    /// categories somewhere in the sequence.
    fn list_categories(&self) -> BoxFuture<'_, Result<Vec<Category>, BackendError>>;

    /// Unread posts of a stream. `stream` is a category id or one of the
    /// well-known labels. `rank` selects ranked instead of chronological order.
    fn list_stream_posts<'a>(
        &'a self,
        stream: &'a str,
        rank: bool,
    ) -> BoxFuture<'a, Result<Vec<StreamEntry>, BackendError>>;

    /// Detail of the post at `index` in the most recently listed stream.
    fn post_detail(&self, index: usize) -> BoxFuture<'_, Result<PostDetail, BackendError>>;

    fn mark_read<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<(), BackendError>>;
    fn mark_unread<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<(), BackendError>>;
    fn mark_saved<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<(), BackendError>>;
    fn mark_unsaved<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<(), BackendError>>;

    fn mark_category_read_up_to<'a>(
        &'a self,
        category_id: &'a str,
        entry_id: &'a str,
    ) -> BoxFuture<'a, Result<(), BackendError>>;

    fn add_subscription<'a>(
        &'a self,
        subscription: &'a NewSubscription,
    ) -> BoxFuture<'a, Result<(), BackendError>>;
}

/// Order categories for display: `All`, `Saved`, `Uncategorized`, then the
/// remaining categories in backend order.
///
/// A well-known label missing from the backend response is skipped. Duplicate
/// well-known entries keep only the first occurrence.
pub fn order_categories(categories: Vec<Category>) -> Vec<Category> {
    let mut ordered = Vec::with_capacity(categories.len());
    for label in PINNED_LABELS {
        if let Some(cat) = categories.iter().find(|c| c.label == label) {
            ordered.push(cat.clone());
        }
    }
    ordered.extend(
        categories
            .into_iter()
            .filter(|c| !PINNED_LABELS.contains(&c.label.as_str())),
    );
    ordered
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn labels(cats: &[Category]) -> Vec<&str> {
        cats.iter().map(|c| c.label.as_str()).collect()
    }

    #[test]
    fn test_pinned_categories_come_first() {
        let cats = vec![
            Category::new("Tech", "c/tech"),
            Category::new("Saved", "t/saved"),
            Category::new("News", "c/news"),
            Category::new("All", "c/all"),
            Category::new("Uncategorized", "c/uncat"),
        ];
        let ordered = order_categories(cats);
        assert_eq!(
            labels(&ordered),
            vec!["All", "Saved", "Uncategorized", "Tech", "News"]
        );
    }

    #[test]
    fn test_missing_pinned_category_is_skipped() {
        let cats = vec![Category::new("News", "c/news"), Category::new("All", "c/all")];
        assert_eq!(labels(&order_categories(cats)), vec!["All", "News"]);
    }

    #[test]
    fn test_empty_input() {
        assert!(order_categories(Vec::new()).is_empty());
    }

    #[test]
    fn test_post_detail_caption() {
        let detail = PostDetail {
            id: "e1".into(),
            title: "Hello".into(),
            origin_title: "Blog".into(),
            origin_url: "https://example.com".into(),
            content: String::new(),
        };
        assert_eq!(detail.caption(), "Blog - Hello");
    }

    proptest! {
        #[test]
        fn prop_order_is_pinned_then_backend_order(
            extra in proptest::collection::vec("[a-z]{1,8}", 0..8),
            seed in any::<u64>(),
        ) {
            let mut cats: Vec<Category> = extra
                .iter()
                .enumerate()
                .map(|(i, l)| Category::new(format!("{l}{i}"), format!("id{i}")))
                .collect();
            let rest: Vec<String> = cats.iter().map(|c| c.label.clone()).collect();
            for (n, label) in PINNED_LABELS.iter().enumerate() {
                let pos = (seed as usize).wrapping_add(n * 7) % (cats.len() + 1);
                cats.insert(pos, Category::new(*label, format!("pinned{n}")));
            }

            let ordered = order_categories(cats);
            let got: Vec<String> = ordered.iter().map(|c| c.label.clone()).collect();
            let mut expected: Vec<String> = PINNED_LABELS.iter().map(|s| s.to_string()).collect();
            expected.extend(rest);
            prop_assert_eq!(got, expected);
        }
    }
}
