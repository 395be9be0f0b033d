use std::sync::Arc;
use thiserror::Error;

// ============================================================================
// Error Types
// ============================================================================

/// Errors surfaced by a feed backend.
///
/// All variants are recoverable: the control loop renders them on the
/// status line and carries on with the next key.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("Not authorized: check the Feedly access token")]
    Unauthorized,

    #[error("Not authenticated")]
    NotAuthenticated,

    /// Non-success HTTP status with a short excerpt of the response body.
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Malformed response: {0}")]
    Malformed(String),

    #[error("No post at index {0}")]
    NoSuchPost(usize),

    #[error("Response too large (exceeds {0} bytes)")]
    ResponseTooLarge(usize),

    #[error("Insecure base URL: HTTPS required (except localhost for testing)")]
    InsecureBaseUrl,
}

// ============================================================================
// Model Types
// ============================================================================

/// A labeled grouping of subscriptions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Category {
    pub label: String,
    pub id: String,
}

impl Category {
    pub fn new(label: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            id: id.into(),
        }
    }
}

/// A post as listed in the posts pane.
///
/// `selectable` doubles as the unread flag: unread posts are selectable,
/// read posts are grayed out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: String,
    pub title: Arc<str>,
    pub selectable: bool,
}

impl Post {
    pub fn unread(id: impl Into<String>, title: &str) -> Self {
        Self {
            id: id.into(),
            title: Arc::from(title),
            selectable: true,
        }
    }

    pub fn is_unread(&self) -> bool {
        self.selectable
    }
}

/// Entry returned by a stream listing, before it becomes a list [`Post`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamEntry {
    pub id: String,
    pub title: String,
}

/// Full data for a single post, fetched on demand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDetail {
    pub id: String,
    pub title: String,
    pub origin_title: String,
    pub origin_url: String,
    /// Raw HTML body.
    pub content: String,
}

impl PostDetail {
    /// Status-line caption: `origin - title`.
    pub fn caption(&self) -> String {
        format!("{} - {}", self.origin_title, self.title)
    }
}

/// Parameters for creating a subscription.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewSubscription {
    /// `url` is already a backend feed id rather than a plain URL.
    pub is_feed: bool,
    pub url: String,
    pub categories: Vec<String>,
    pub title: String,
}
