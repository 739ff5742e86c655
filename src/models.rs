use serde::{Deserialize, Deserializer, Serialize};

/// A post as returned by the listing and detail endpoints.
///
/// Immutable from the client's perspective; `comments_count` is
/// server-owned and is never incremented locally (see `feed`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    pub body: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub image: Option<String>,
    /// Opaque server-formatted timestamp, displayed verbatim.
    pub created_at: String,
    #[serde(default)]
    pub comments_count: u64,
    pub author: Author,
}

impl Post {
    /// Image URL suitable for display, if any. The upstream API sometimes
    /// reports placeholder values here; only absolute URLs count.
    #[must_use]
    pub fn display_image(&self) -> Option<&str> {
        self.image.as_deref().filter(|url| url.starts_with("http"))
    }
}

/// Author snapshot embedded in posts and comments. Never fetched standalone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Author {
    pub id: u64,
    pub name: String,
    pub username: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub profile_image: Option<String>,
}

/// A comment on a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: u64,
    pub body: String,
    pub author: Author,
}

/// A post plus its comment list, from the detail endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct PostDetail {
    #[serde(flatten)]
    pub post: Post,
    #[serde(default)]
    pub comments: Vec<Comment>,
}

/// One fetched slice of the feed.
///
/// `next` is the 1-based page number to request next, or `None` when the
/// feed is exhausted. The value is heuristic (see `feed::has_next_page`):
/// an exactly-full final page yields `Some` and callers must tolerate the
/// trailing empty page that follows.
#[derive(Debug, Clone)]
pub struct Page {
    pub posts: Vec<Post>,
    pub next: Option<u32>,
}

/// `{"data": [...]}` envelope of the listing endpoint.
#[derive(Debug, Deserialize)]
pub struct ListEnvelope {
    pub data: Vec<Post>,
}

/// `{"data": {...}}` envelope of the detail and write endpoints.
#[derive(Debug, Deserialize)]
pub struct ItemEnvelope<T> {
    pub data: T,
}

/// `{"token", "user"}` response of the login and register endpoints.
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: Author,
}

/// Deserialize a field that should be a string but that the upstream API
/// sometimes emits as `null`, `[]` or another placeholder. Non-string
/// values become `None` instead of failing the whole document.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        _ => None,
    })
}
