//! HTTP client for the remote microblogging API.
//!
//! Thin request/response wrappers over reqwest: every method maps to one
//! endpoint, attaches credentials explicitly, and turns non-2xx responses
//! into `ApiError::Status` carrying the server's `message` when present.

use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::Config;
use crate::error::ApiError;
use crate::feed::has_next_page;
use crate::models::{AuthResponse, Comment, ItemEnvelope, ListEnvelope, Page, Post, PostDetail};
use crate::session::Session;
use crate::validate::{ImageAttachment, LoginForm, NewPost, RegisterForm};

const USER_AGENT: &str = concat!("microblog-client/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    page_limit: u32,
}

impl ApiClient {
    /// Build a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.http_timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self {
            http,
            base_url: config.api_base_url.as_str().trim_end_matches('/').to_string(),
            page_limit: config.page_limit,
        })
    }

    #[must_use]
    pub fn page_limit(&self) -> u32 {
        self.page_limit
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url)
    }

    /// Fetch one feed page (1-based page number).
    ///
    /// The returned page's `next` token comes from the count heuristic in
    /// `feed::has_next_page`, not from a server cursor.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or an
    /// unexpected body.
    pub async fn fetch_page(&self, token: u32) -> Result<Page, ApiError> {
        let response = self
            .http
            .get(self.endpoint("posts"))
            .query(&[("limit", self.page_limit), ("page", token)])
            .send()
            .await?;
        let envelope: ListEnvelope = decode(response, "Failed to fetch posts").await?;

        let returned = envelope.data.len();
        let next = has_next_page(returned, self.page_limit as usize).then_some(token + 1);
        debug!(page = token, returned, more = next.is_some(), "Fetched feed page");

        Ok(Page {
            posts: envelope.data,
            next,
        })
    }

    /// Fetch a single post with its comments.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or an
    /// unexpected body.
    pub async fn fetch_post(&self, post_id: u64) -> Result<PostDetail, ApiError> {
        let response = self
            .http
            .get(self.endpoint(&format!("posts/{post_id}")))
            .send()
            .await?;
        let envelope: ItemEnvelope<PostDetail> =
            decode(response, "Failed to fetch comments").await?;
        Ok(envelope.data)
    }

    /// Create a post (multipart, authenticated).
    ///
    /// The caller is expected to have run `NewPost::validate` first; the
    /// server applies its own rules regardless.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or an
    /// unexpected body.
    pub async fn create_post(&self, session: &Session, post: &NewPost) -> Result<Post, ApiError> {
        let mut form = Form::new().text("body", post.body.clone());
        if let Some(title) = &post.title {
            form = form.text("title", title.clone());
        }
        if let Some(image) = &post.image {
            form = form.part("image", image_part(image)?);
        }

        let response = self
            .http
            .post(self.endpoint("posts"))
            .header(AUTHORIZATION, session.bearer())
            .multipart(form)
            .send()
            .await?;
        let envelope: ItemEnvelope<Post> = decode(response, "Failed to create post").await?;
        debug!(post_id = envelope.data.id, "Created post");
        Ok(envelope.data)
    }

    /// Create a comment on a post (JSON, authenticated).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or an
    /// unexpected body.
    pub async fn create_comment(
        &self,
        session: &Session,
        post_id: u64,
        body: &str,
    ) -> Result<Comment, ApiError> {
        let response = self
            .http
            .post(self.endpoint(&format!("posts/{post_id}/comments")))
            .header(AUTHORIZATION, session.bearer())
            .json(&serde_json::json!({ "body": body }))
            .send()
            .await?;
        let envelope: ItemEnvelope<Comment> =
            decode(response, "Failed to create comment").await?;
        debug!(post_id, comment_id = envelope.data.id, "Created comment");
        Ok(envelope.data)
    }

    /// Exchange credentials for a session.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or an
    /// unexpected body.
    pub async fn login(&self, form: &LoginForm) -> Result<Session, ApiError> {
        let response = self
            .http
            .post(self.endpoint("login"))
            .json(&serde_json::json!({
                "username": form.username,
                "password": form.password,
            }))
            .send()
            .await?;
        let auth: AuthResponse = decode(response, "Invalid username or password").await?;
        debug!(username = %auth.user.username, "Signed in");
        Ok(Session {
            token: auth.token,
            user: auth.user,
        })
    }

    /// Register a new account (multipart) and return its session.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, a non-2xx status, or an
    /// unexpected body.
    pub async fn register(&self, form: &RegisterForm) -> Result<Session, ApiError> {
        let mut multipart = Form::new()
            .text("username", form.username.clone())
            .text("password", form.password.clone())
            .text("name", form.name.clone())
            .text("email", form.email.clone());
        if let Some(image) = &form.image {
            multipart = multipart.part("image", image_part(image)?);
        }

        let response = self
            .http
            .post(self.endpoint("register"))
            .multipart(multipart)
            .send()
            .await?;
        let auth: AuthResponse = decode(response, "Registration failed").await?;
        debug!(username = %auth.user.username, "Registered");
        Ok(Session {
            token: auth.token,
            user: auth.user,
        })
    }
}

fn image_part(image: &ImageAttachment) -> Result<Part, ApiError> {
    let part = Part::bytes(image.bytes.clone())
        .file_name(image.file_name.clone())
        .mime_str(image.mime().as_ref())?;
    Ok(part)
}

/// Check the status and decode the body. On a non-2xx status the server's
/// JSON `message` field is surfaced when present, otherwise
/// `default_message`.
async fn decode<T: DeserializeOwned>(
    response: reqwest::Response,
    default_message: &str,
) -> Result<T, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await?;
    if !status.is_success() {
        return Err(ApiError::Status {
            status,
            message: server_message(&bytes).unwrap_or_else(|| default_message.to_string()),
        });
    }
    serde_json::from_slice(&bytes).map_err(ApiError::Decode)
}

fn server_message(body: &[u8]) -> Option<String> {
    serde_json::from_slice::<serde_json::Value>(body)
        .ok()?
        .get("message")?
        .as_str()
        .map(str::to_owned)
}
