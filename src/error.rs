use reqwest::StatusCode;
use thiserror::Error;

/// Errors from talking to the remote API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The server answered with a non-2xx status. The message is taken from
    /// the server's JSON `message` field when present, otherwise a
    /// call-site-specific default.
    #[error("{message}")]
    Status { status: StatusCode, message: String },

    /// Transport-level failure (DNS, TLS, timeout, connection reset).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered 2xx but the body was not the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// An authenticated write was attempted without a session.
    #[error("not signed in")]
    AuthRequired,
}

/// Errors from the feed pager.
#[derive(Debug, Error)]
pub enum FeedError {
    /// A page load for this feed is already in flight. The call is rejected,
    /// not queued.
    #[error("a page load is already in flight")]
    AlreadyLoading,

    /// The feed is exhausted; the last fetched page had no next-page token.
    #[error("no more pages")]
    NoMorePages,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Client-side form validation failure. Never sent to the server.
#[derive(Debug, Error)]
#[error("{}", self.describe())]
pub struct ValidationError {
    pub issues: Vec<FieldIssue>,
}

/// A single failed validation rule, attributed to a form field.
#[derive(Debug, Clone)]
pub struct FieldIssue {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    #[must_use]
    pub fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    #[must_use]
    pub fn single(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            issues: vec![FieldIssue {
                field,
                message: message.into(),
            }],
        }
    }

    fn describe(&self) -> String {
        self.issues
            .iter()
            .map(|issue| format!("{}: {}", issue.field, issue.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
