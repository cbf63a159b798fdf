//! In-memory session with write-through persistence.
//!
//! # Responsibility
//! - Hold the access token and user profile for the running process.
//! - Mirror every change to durable storage through the repository.
//!
//! # Invariants
//! - Token and user are set together by successful auth operations and
//!   cleared together; callers never observe a half-established session
//!   as a steady state.
//! - An empty token means signed out.

use crate::model::session::UserProfile;
use crate::repo::session_repo::{RepoResult, SessionRepository};
use log::warn;

/// Process-wide session state, owned by the application aggregate and
/// passed by unique reference; never a global.
pub struct SessionStore<R: SessionRepository> {
    token: String,
    user: Option<UserProfile>,
    repo: R,
}

impl<R: SessionRepository> SessionStore<R> {
    /// Restores the session from durable storage, falling back to signed
    /// out when storage is unreadable.
    pub fn restore(repo: R) -> Self {
        match repo.load() {
            Ok(persisted) => Self {
                token: persisted.token.unwrap_or_default(),
                user: persisted.user,
                repo,
            },
            Err(err) => {
                warn!("event=session_restore module=session status=error error={err}");
                Self {
                    token: String::new(),
                    user: None,
                    repo,
                }
            }
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    /// A session is valid only when both halves are present.
    pub fn is_authenticated(&self) -> bool {
        !self.token.is_empty() && self.user.is_some()
    }

    /// Writes the token through to durable storage; `None` or an empty
    /// value removes the durable entry.
    pub fn set_token(&mut self, token: Option<&str>) -> RepoResult<()> {
        self.token = token.unwrap_or_default().to_string();
        self.repo.store_token(token)
    }

    /// Writes the profile through to durable storage; `None` removes the
    /// durable entry.
    pub fn set_user(&mut self, user: Option<UserProfile>) -> RepoResult<()> {
        self.repo.store_user(user.as_ref())?;
        self.user = user;
        Ok(())
    }

    /// Stores both halves of a freshly authenticated session.
    pub fn establish(&mut self, token: &str, user: UserProfile) -> RepoResult<()> {
        self.set_token(Some(token))?;
        self.set_user(Some(user))
    }

    /// Clears the in-memory session and every durable entry.
    ///
    /// The in-memory half is cleared even when durable storage fails, so
    /// the process is always observably signed out afterwards.
    pub fn clear_auth(&mut self) -> RepoResult<()> {
        self.token.clear();
        self.user = None;
        self.repo.clear()
    }
}
