//! Microblog client library.
//!
//! An async client for a third-party microblogging REST API: paginated
//! feed browsing with a local cache, post creation with image uploads,
//! per-post comment threads, and session-based auth. The `microblog`
//! binary is a thin CLI over these modules.

pub mod client;
pub mod comments;
pub mod config;
pub mod error;
pub mod feed;
pub mod models;
pub mod session;
pub mod validate;
