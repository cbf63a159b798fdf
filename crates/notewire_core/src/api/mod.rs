//! API gateway types.
//!
//! # Responsibility
//! - Define the gateway error taxonomy and the uniform response envelope.
//!
//! # Invariants
//! - `ApiError::Unauthorized` is fully handled by the gateway before it is
//!   returned; callers must not surface it again.
//! - Every endpoint decodes into the same [`ApiEnvelope`] shape.

use crate::model::note::Note;
use crate::model::session::UserProfile;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod gateway;

pub use gateway::{ApiClient, ApiRequest};

pub type ApiResult<T> = Result<T, ApiError>;

/// Gateway-level error.
///
/// The gateway has already emitted the matching user notice for both
/// variants by the time a caller sees them; callers only reset their own
/// loading state.
#[derive(Debug)]
pub enum ApiError {
    /// 401/403 from any endpoint. Session already cleared, login view
    /// already shown, notice already emitted.
    Unauthorized,
    /// Connection, timeout or body-decode failure. Notice already emitted.
    Transport(reqwest::Error),
    /// The request could not be constructed (malformed header value).
    Request(String),
}

impl Display for ApiError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unauthorized => write!(f, "session expired"),
            Self::Transport(err) => write!(f, "{err}"),
            Self::Request(message) => write!(f, "invalid request: {message}"),
        }
    }
}

impl Error for ApiError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Transport(err) => Some(err),
            Self::Unauthorized | Self::Request(_) => None,
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(value: reqwest::Error) -> Self {
        Self::Transport(value)
    }
}

/// Uniform response shape shared by every endpoint.
///
/// Fields beyond `success`/`error` are populated only by the endpoints
/// that carry them; absent fields decode to `None`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiEnvelope {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub user: Option<UserProfile>,
    #[serde(default)]
    pub notes: Option<Vec<Note>>,
    #[serde(default)]
    pub note: Option<Note>,
    /// Development-only reset code echoed by some deployments.
    #[serde(rename = "debugCode", default)]
    pub debug_code: Option<String>,
}

impl ApiEnvelope {
    /// Synthesized failure for responses that are not JSON.
    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// The server's error text, or `fallback` when it sent none.
    pub fn error_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.error.as_deref().filter(|text| !text.is_empty()).unwrap_or(fallback)
    }
}
