//! Authenticated-user profile model.
//!
//! # Responsibility
//! - Define the profile shape returned by login/registration and persisted
//!   alongside the access token.
//!
//! # Invariants
//! - A profile is only ever stored together with a token; the pair is the
//!   session (see `service::session_store`).

use serde::{Deserialize, Serialize};

/// Profile of the signed-in user as returned by the auth endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Server-assigned user id. Some deployments send it as `_id`.
    #[serde(alias = "_id")]
    pub id: String,
    pub name: String,
    pub email: String,
}
