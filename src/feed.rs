//! Feed cache & pager.
//!
//! `FeedCache` is the synchronous state machine: an append-only sequence of
//! pages, the tokens that produced them, and an explicit load state. All
//! pagination invariants live here, with no I/O. `Feed` pairs a cache with
//! an `ApiClient` and drives the actual page fetches.
//!
//! A cache is owned by exactly one view at a time and is discarded with it;
//! nothing here persists across sessions.

use tracing::debug;

use crate::client::ApiClient;
use crate::error::FeedError;
use crate::models::{Page, Post};

/// First page number of the feed (the API is 1-based).
pub const FIRST_PAGE: u32 = 1;

/// Is there (probably) a page after one that returned `returned` posts?
///
/// Heuristic carried over from the source behavior: a short page means the
/// feed is exhausted. A last page that is exactly full therefore reports
/// more data, and the follow-up fetch returns an empty page. Kept as the
/// single predicate so a cursor-based backend can replace it in one place.
#[must_use]
pub fn has_next_page(returned: usize, limit: usize) -> bool {
    returned >= limit
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedState {
    /// Ready for the next `start_load`.
    Idle,
    /// A fetch is in flight; further loads are rejected, not queued.
    Loading,
    /// The last page had no next token; `start_load` fails permanently.
    Exhausted,
}

/// Paginated local view of the remote feed.
///
/// Invariants:
/// - tokens are strictly increasing by 1 starting at [`FIRST_PAGE`];
/// - page `i`'s `next` equals the token that produced page `i + 1`;
/// - within a page posts keep server order, across pages arrival order.
#[derive(Debug)]
pub struct FeedCache {
    pages: Vec<Page>,
    tokens: Vec<u32>,
    state: FeedState,
}

impl Default for FeedCache {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedCache {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            tokens: Vec::new(),
            state: FeedState::Idle,
        }
    }

    #[must_use]
    pub fn state(&self) -> FeedState {
        self.state
    }

    #[must_use]
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Tokens that produced each cached page, in order.
    #[must_use]
    pub fn tokens(&self) -> &[u32] {
        &self.tokens
    }

    /// All cached posts in feed order.
    pub fn posts(&self) -> impl Iterator<Item = &Post> {
        self.pages.iter().flat_map(|page| page.posts.iter())
    }

    /// Token the next load would request, or `None` when exhausted.
    #[must_use]
    pub fn next_token(&self) -> Option<u32> {
        match self.pages.last() {
            None => Some(FIRST_PAGE),
            Some(page) => page.next,
        }
    }

    /// Begin a page load, returning the token to fetch.
    ///
    /// # Errors
    ///
    /// `AlreadyLoading` while a load is in flight, `NoMorePages` once the
    /// feed is exhausted.
    pub fn start_load(&mut self) -> Result<u32, FeedError> {
        match self.state {
            FeedState::Loading => Err(FeedError::AlreadyLoading),
            FeedState::Exhausted => Err(FeedError::NoMorePages),
            FeedState::Idle => {
                // Idle implies the last page (if any) carries a next token.
                let token = self.next_token().ok_or(FeedError::NoMorePages)?;
                self.state = FeedState::Loading;
                Ok(token)
            }
        }
    }

    /// Append the fetched page and leave the loading state.
    pub fn complete_load(&mut self, token: u32, page: Page) -> &Page {
        self.state = if page.next.is_none() {
            FeedState::Exhausted
        } else {
            FeedState::Idle
        };
        self.tokens.push(token);
        self.pages.push(page);
        self.pages.last().expect("page was just appended")
    }

    /// Abandon an in-flight load. The cache is left exactly as it was
    /// before `start_load`; no partial page is ever appended.
    pub fn fail_load(&mut self) {
        if self.state == FeedState::Loading {
            self.state = FeedState::Idle;
        }
    }

    /// Insert a freshly created post at the head of the first page, with no
    /// network round trip. On an empty cache, synthesizes a single
    /// exhausted page holding only this post.
    ///
    /// This is the sole optimistic-update path; later pages are neither
    /// renumbered nor revalidated, and no element is ever dropped.
    pub fn prepend_post(&mut self, post: Post) {
        match self.pages.first_mut() {
            Some(first) => first.posts.insert(0, post),
            None => {
                self.pages.push(Page {
                    posts: vec![post],
                    next: None,
                });
                self.tokens.push(FIRST_PAGE);
                self.state = FeedState::Exhausted;
            }
        }
    }

    /// Replace the first page with a freshly fetched copy.
    ///
    /// Later pages are untouched. The fresh page's `next` token only
    /// drives the exhausted flag while the cache holds a single page;
    /// otherwise the pager keeps its position.
    pub fn replace_first_page(&mut self, page: Page) {
        if self.pages.is_empty() {
            self.tokens.push(FIRST_PAGE);
            self.pages.push(page);
        } else {
            self.pages[0] = page;
        }
        if self.pages.len() == 1 && self.state != FeedState::Loading {
            self.state = if self.pages[0].next.is_none() {
                FeedState::Exhausted
            } else {
                FeedState::Idle
            };
        }
    }
}

/// One feed subscription: a cache plus the client that fills it.
#[derive(Debug)]
pub struct Feed {
    client: ApiClient,
    cache: FeedCache,
}

impl Feed {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            cache: FeedCache::new(),
        }
    }

    #[must_use]
    pub fn cache(&self) -> &FeedCache {
        &self.cache
    }

    /// Fetch and append the next page.
    ///
    /// Calls are serialized per feed: a second call while one is in flight
    /// is rejected with `AlreadyLoading` (this includes a previous call
    /// whose future was dropped mid-fetch). A fetch failure leaves the
    /// cache exactly as it was.
    ///
    /// # Errors
    ///
    /// `AlreadyLoading`, `NoMorePages`, or the propagated `ApiError`.
    pub async fn load_next(&mut self) -> Result<&Page, FeedError> {
        let token = self.cache.start_load()?;
        match self.client.fetch_page(token).await {
            Ok(page) => Ok(self.cache.complete_load(token, page)),
            Err(e) => {
                self.cache.fail_load();
                Err(e.into())
            }
        }
    }

    /// Optimistically insert a just-created post at the head of the feed.
    pub fn prepend_post(&mut self, post: Post) {
        debug!(post_id = post.id, "Prepending created post to feed");
        self.cache.prepend_post(post);
    }

    /// Refetch the first page (and only the first page) from the server,
    /// discarding the locally cached copy. Used after a comment is added:
    /// comment counts are server-owned, so local state cannot be trusted.
    ///
    /// # Errors
    ///
    /// Propagates the fetch failure; the cache is unchanged on error.
    pub async fn invalidate_and_refetch_first_page(&mut self) -> Result<&Page, FeedError> {
        let page = self.client.fetch_page(FIRST_PAGE).await?;
        debug!(returned = page.posts.len(), "Refetched first feed page");
        self.cache.replace_first_page(page);
        Ok(&self.cache.pages[0])
    }
}
