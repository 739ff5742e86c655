use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::ApiError;
use crate::models::Author;

/// Credentials produced by login or registration: a bearer token and a
/// snapshot of the signed-in user.
///
/// Sessions are passed explicitly into every authenticated operation; the
/// library never reads them from ambient state. Token shape and expiry are
/// not validated client-side — expiry is discovered via a failed write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user: Author,
}

impl Session {
    /// Value for the `Authorization` header.
    #[must_use]
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }

    /// Require a session for an authenticated write.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::AuthRequired` when no session is present.
    pub fn require(session: Option<&Session>) -> Result<&Session, ApiError> {
        session.ok_or(ApiError::AuthRequired)
    }
}

#[derive(Debug, Error)]
pub enum SessionStoreError {
    #[error("failed to access session file: {0}")]
    Io(#[from] std::io::Error),
    #[error("session file is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}

/// File-backed session persistence for the CLI, standing in for the
/// browser-local storage the web client uses.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
}

impl SessionStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Load the stored session, if any.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub async fn load(&self) -> Result<Option<Session>, SessionStoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Persist a session, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub async fn save(&self, session: &Session) -> Result<(), SessionStoreError> {
        let json = serde_json::to_vec_pretty(session)?;
        tokio::fs::write(&self.path, json).await?;
        debug!(path = %self.path.display(), "Session saved");
        Ok(())
    }

    /// Remove the stored session. A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be removed.
    pub async fn clear(&self) -> Result<(), SessionStoreError> {
        match tokio::fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
