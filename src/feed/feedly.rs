use super::{
    BackendError, Category, FeedBackend, NewSubscription, PostDetail, StreamEntry, ALL_LABEL,
    SAVED_LABEL, UNCATEGORIZED_LABEL,
};
use futures::future::{BoxFuture, FutureExt};
use futures::StreamExt;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use std::sync::{Mutex, RwLock};
use std::time::Duration;

const REQUEST_TIMEOUT_SECS: u64 = 30;
const MAX_RESPONSE_SIZE: usize = 10 * 1024 * 1024; // 10MB
const ERROR_EXCERPT_CHARS: usize = 200;

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct ProfileJson {
    id: String,
}

#[derive(Debug, Deserialize)]
struct CategoryJson {
    id: String,
    label: String,
}

#[derive(Debug, Deserialize)]
struct StreamJson {
    #[serde(default)]
    items: Vec<EntryJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct EntryJson {
    id: String,
    title: Option<String>,
    origin: Option<OriginJson>,
    content: Option<ContentJson>,
    summary: Option<ContentJson>,
    #[serde(default)]
    alternate: Vec<LinkJson>,
    origin_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OriginJson {
    title: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ContentJson {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LinkJson {
    href: Option<String>,
}

impl EntryJson {
    fn into_detail(self) -> PostDetail {
        let content = self
            .content
            .and_then(|c| c.content)
            .or_else(|| self.summary.and_then(|s| s.content))
            .unwrap_or_default();
        let origin_url = self
            .alternate
            .into_iter()
            .find_map(|l| l.href)
            .or(self.origin_id)
            .unwrap_or_default();
        PostDetail {
            id: self.id,
            title: self.title.unwrap_or_default(),
            origin_title: self.origin.and_then(|o| o.title).unwrap_or_default(),
            origin_url,
            content,
        }
    }
}

// ============================================================================
// Client
// ============================================================================

/// Feedly cloud API client.
///
/// The user id comes from `/v3/profile` and is required by every call that
/// builds a stream or category id, so [`FeedBackend::authenticate`] must
/// succeed first.
pub struct FeedlyClient {
    http: reqwest::Client,
    base_url: url::Url,
    token: SecretString,
    stream_count: u32,
    user_id: RwLock<Option<String>>,
    /// Details of the most recently listed stream, in list order.
    current: Mutex<Vec<PostDetail>>,
}

impl FeedlyClient {
    pub fn new(
        base_url: &str,
        token: SecretString,
        stream_count: u32,
    ) -> Result<Self, BackendError> {
        // The token must never travel in the clear. Plain HTTP is allowed
        // against loopback only.
        if !base_url.starts_with("https://") {
            let is_localhost = base_url.starts_with("http://127.0.0.1")
                || base_url.starts_with("http://localhost");
            if !is_localhost {
                tracing::error!(base_url = %base_url, "Rejecting non-HTTPS Feedly base URL");
                return Err(BackendError::InsecureBaseUrl);
            }
            tracing::warn!(base_url = %base_url, "Using non-HTTPS Feedly base URL (localhost only)");
        }

        let base_url = url::Url::parse(base_url)
            .map_err(|e| BackendError::Malformed(format!("base URL: {e}")))?;

        let http = reqwest::Client::builder()
            .user_agent(concat!("feedpane/", env!("CARGO_PKG_VERSION")))
            .connect_timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            http,
            base_url,
            token,
            stream_count,
            user_id: RwLock::new(None),
            current: Mutex::new(Vec::new()),
        })
    }

    fn user_id(&self) -> Result<String, BackendError> {
        self.user_id
            .read()
            .map_err(|_| BackendError::NotAuthenticated)?
            .clone()
            .ok_or(BackendError::NotAuthenticated)
    }

    fn endpoint(&self, path: &str) -> Result<url::Url, BackendError> {
        self.base_url
            .join(path)
            .map_err(|e| BackendError::Malformed(format!("endpoint {path}: {e}")))
    }

    /// Map a well-known label to its stream id. Anything else is already an id.
    fn resolve_stream(&self, stream: &str) -> Result<String, BackendError> {
        let uid = self.user_id()?;
        Ok(match stream {
            ALL_LABEL => format!("user/{uid}/category/global.all"),
            SAVED_LABEL => format!("user/{uid}/tag/global.saved"),
            UNCATEGORIZED_LABEL => format!("user/{uid}/category/global.uncategorized"),
            other => other.to_string(),
        })
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, BackendError> {
        let request = request.header(
            "Authorization",
            format!("Bearer {}", self.token.expose_secret()),
        );

        let response = tokio::time::timeout(
            Duration::from_secs(REQUEST_TIMEOUT_SECS),
            request.send(),
        )
        .await
        .map_err(|_| BackendError::Timeout(REQUEST_TIMEOUT_SECS))??;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(BackendError::Unauthorized);
        }

        let body = read_limited_text(response, MAX_RESPONSE_SIZE).await?;
        if !status.is_success() {
            let message: String = body.trim().chars().take(ERROR_EXCERPT_CHARS).collect();
            tracing::debug!(status = status.as_u16(), %message, "Feedly request failed");
            return Err(BackendError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: url::Url) -> Result<T, BackendError> {
        tracing::debug!(path = url.path(), "GET");
        let body = self.send(self.http.get(url)).await?;
        serde_json::from_str(&body).map_err(|e| BackendError::Malformed(e.to_string()))
    }

    async fn post_json(
        &self,
        path: &str,
        payload: serde_json::Value,
    ) -> Result<(), BackendError> {
        let url = self.endpoint(path)?;
        tracing::debug!(path = url.path(), "POST");
        let request = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .body(payload.to_string());
        self.send(request).await.map(|_| ())
    }

    async fn mark_entries(&self, action: &str, ids: &[String]) -> Result<(), BackendError> {
        if ids.is_empty() {
            return Ok(());
        }
        self.post_json(
            "/v3/markers",
            json!({ "action": action, "type": "entries", "entryIds": ids }),
        )
        .await
    }
}

/// Collect the body, refusing anything over `limit` bytes.
async fn read_limited_text(
    response: reqwest::Response,
    limit: usize,
) -> Result<String, BackendError> {
    if let Some(len) = response.content_length() {
        if len as usize > limit {
            return Err(BackendError::ResponseTooLarge(limit));
        }
    }

    let mut bytes = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        if bytes.len().saturating_add(chunk.len()) > limit {
            return Err(BackendError::ResponseTooLarge(limit));
        }
        bytes.extend_from_slice(&chunk);
    }

    String::from_utf8(bytes).map_err(|_| BackendError::Malformed("invalid UTF-8 body".into()))
}

impl FeedBackend for FeedlyClient {
    fn authenticate(&self) -> BoxFuture<'_, Result<(), BackendError>> {
        async move {
            let profile: ProfileJson = self.get_json(self.endpoint("/v3/profile")?).await?;
            tracing::info!("Authenticated with Feedly");
            let mut slot = self
                .user_id
                .write()
                .map_err(|_| BackendError::NotAuthenticated)?;
            *slot = Some(profile.id);
            Ok(())
        }
        .boxed()
    }

    fn list_categories(&self) -> BoxFuture<'_, Result<Vec<Category>, BackendError>> {
        async move {
            let uid = self.user_id()?;
            let listed: Vec<CategoryJson> =
                self.get_json(self.endpoint("/v3/categories")?).await?;

            let mut categories = vec![
                Category::new(ALL_LABEL, format!("user/{uid}/category/global.all")),
                Category::new(SAVED_LABEL, format!("user/{uid}/tag/global.saved")),
                Category::new(
                    UNCATEGORIZED_LABEL,
                    format!("user/{uid}/category/global.uncategorized"),
                ),
            ];
            categories.extend(listed.into_iter().map(|c| Category::new(c.label, c.id)));
            tracing::debug!(count = categories.len(), "Listed categories");
            Ok(categories)
        }
        .boxed()
    }

    fn list_stream_posts<'a>(
        &'a self,
        stream: &'a str,
        rank: bool,
    ) -> BoxFuture<'a, Result<Vec<StreamEntry>, BackendError>> {
        async move {
            let stream_id = self.resolve_stream(stream)?;
            let mut url = self.endpoint("/v3/streams/contents")?;
            url.query_pairs_mut()
                .append_pair("streamId", &stream_id)
                .append_pair("unreadOnly", "true")
                .append_pair("count", &self.stream_count.to_string())
                .append_pair("ranked", if rank { "engagement" } else { "newest" });

            let contents: StreamJson = self.get_json(url).await?;
            let details: Vec<PostDetail> =
                contents.items.into_iter().map(EntryJson::into_detail).collect();
            let entries = details
                .iter()
                .map(|d| StreamEntry {
                    id: d.id.clone(),
                    title: d.title.clone(),
                })
                .collect();

            tracing::debug!(stream = %stream_id, count = details.len(), rank, "Listed stream");
            if let Ok(mut current) = self.current.lock() {
                *current = details;
            }
            Ok(entries)
        }
        .boxed()
    }

    fn post_detail(&self, index: usize) -> BoxFuture<'_, Result<PostDetail, BackendError>> {
        async move {
            let current = self
                .current
                .lock()
                .map_err(|_| BackendError::NoSuchPost(index))?;
            current
                .get(index)
                .cloned()
                .ok_or(BackendError::NoSuchPost(index))
        }
        .boxed()
    }

    fn mark_read<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<(), BackendError>> {
        self.mark_entries("markAsRead", ids).boxed()
    }

    fn mark_unread<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<(), BackendError>> {
        self.mark_entries("keepUnread", ids).boxed()
    }

    fn mark_saved<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<(), BackendError>> {
        self.mark_entries("markAsSaved", ids).boxed()
    }

    fn mark_unsaved<'a>(&'a self, ids: &'a [String]) -> BoxFuture<'a, Result<(), BackendError>> {
        self.mark_entries("markAsUnsaved", ids).boxed()
    }

    fn mark_category_read_up_to<'a>(
        &'a self,
        category_id: &'a str,
        entry_id: &'a str,
    ) -> BoxFuture<'a, Result<(), BackendError>> {
        async move {
            let stream_id = self.resolve_stream(category_id)?;
            // Tags (the Saved stream) use a different marker type.
            let payload = if stream_id.contains("/tag/") {
                json!({
                    "action": "markAsRead",
                    "type": "tags",
                    "tagIds": [stream_id],
                    "lastReadEntryId": entry_id,
                })
            } else {
                json!({
                    "action": "markAsRead",
                    "type": "categories",
                    "categoryIds": [stream_id],
                    "lastReadEntryId": entry_id,
                })
            };
            self.post_json("/v3/markers", payload).await
        }
        .boxed()
    }

    fn add_subscription<'a>(
        &'a self,
        subscription: &'a NewSubscription,
    ) -> BoxFuture<'a, Result<(), BackendError>> {
        async move {
            let uid = self.user_id()?;
            let feed_id = if subscription.is_feed {
                subscription.url.clone()
            } else {
                format!("feed/{}", subscription.url)
            };
            let categories: Vec<serde_json::Value> = subscription
                .categories
                .iter()
                .map(|token| json!({ "id": format!("user/{uid}/category/{token}"), "label": token }))
                .collect();

            let mut payload = json!({ "id": feed_id, "categories": categories });
            if !subscription.title.is_empty() {
                payload["title"] = json!(subscription.title);
            }
            tracing::info!(feed = %feed_id, "Adding subscription");
            self.post_json("/v3/subscriptions", payload).await
        }
        .boxed()
    }
}
