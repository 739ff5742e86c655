//! Per-post comment threads.
//!
//! Comments are fetched lazily from the post detail endpoint and cached for
//! the lifetime of the view. The cache is never invalidated except by an
//! explicit `refresh`, which re-reads the whole post detail rather than
//! appending a single new comment. No size bound: fine at this scale.

use std::collections::HashMap;

use tracing::debug;

use crate::client::ApiClient;
use crate::error::ApiError;
use crate::models::Comment;
use crate::session::Session;

#[derive(Debug)]
pub struct CommentThreads {
    client: ApiClient,
    threads: HashMap<u64, Vec<Comment>>,
    visible: HashMap<u64, bool>,
}

impl CommentThreads {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            threads: HashMap::new(),
            visible: HashMap::new(),
        }
    }

    /// Cached comments for a post, if they have been fetched.
    #[must_use]
    pub fn comments(&self, post_id: u64) -> Option<&[Comment]> {
        self.threads.get(&post_id).map(Vec::as_slice)
    }

    #[must_use]
    pub fn is_visible(&self, post_id: u64) -> bool {
        self.visible.get(&post_id).copied().unwrap_or(false)
    }

    /// Toggle a post's comment thread, returning the new visibility.
    ///
    /// The first show fetches the thread; afterwards toggling only flips
    /// the flag, without refetching.
    ///
    /// # Errors
    ///
    /// Propagates the fetch failure on first show; visibility is unchanged.
    pub async fn toggle(&mut self, post_id: u64) -> Result<bool, ApiError> {
        if self.is_visible(post_id) {
            self.visible.insert(post_id, false);
            return Ok(false);
        }
        if !self.threads.contains_key(&post_id) {
            self.fetch(post_id).await?;
        }
        self.visible.insert(post_id, true);
        Ok(true)
    }

    /// Re-read the whole post detail and replace the cached thread.
    ///
    /// # Errors
    ///
    /// Propagates the fetch failure; the cached thread is unchanged.
    pub async fn refresh(&mut self, post_id: u64) -> Result<&[Comment], ApiError> {
        self.fetch(post_id).await?;
        self.visible.insert(post_id, true);
        Ok(self.threads.get(&post_id).map(Vec::as_slice).unwrap_or(&[]))
    }

    /// Submit a comment and refresh the thread from the server.
    ///
    /// The feed's first page should be invalidated alongside
    /// (`Feed::invalidate_and_refetch_first_page`): the post's comment
    /// count is server-owned and is not incremented locally.
    ///
    /// # Errors
    ///
    /// `ApiError::AuthRequired` without a session — submission is never a
    /// silent no-op. Otherwise propagates the write or refresh failure.
    pub async fn submit(
        &mut self,
        session: Option<&Session>,
        post_id: u64,
        body: &str,
    ) -> Result<Comment, ApiError> {
        let session = Session::require(session)?;
        let comment = self.client.create_comment(session, post_id, body).await?;
        self.refresh(post_id).await?;
        Ok(comment)
    }

    async fn fetch(&mut self, post_id: u64) -> Result<(), ApiError> {
        let detail = self.client.fetch_post(post_id).await?;
        debug!(post_id, count = detail.comments.len(), "Fetched comment thread");
        self.threads.insert(post_id, detail.comments);
        Ok(())
    }
}
