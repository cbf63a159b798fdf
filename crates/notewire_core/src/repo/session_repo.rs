//! Session credential persistence.
//!
//! # Responsibility
//! - Persist the access token and user profile across process restarts.
//! - Restore them at startup, degrading corrupt entries to absent.
//!
//! # Invariants
//! - Only the well-known keys `token` and `user` are written.
//! - `clear` removes every durable entry associated with the session.
//! - A corrupt stored profile is reported as absent, never as an error.

use crate::db::DbError;
use crate::model::session::UserProfile;
use log::warn;
use rusqlite::{params, Connection, OptionalExtension};
use std::error::Error;
use std::fmt::{Display, Formatter};

const KEY_TOKEN: &str = "token";
const KEY_USER: &str = "user";

pub type RepoResult<T> = Result<T, RepoError>;

/// Persistence error for session credential storage.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    Serialize(serde_json::Error),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Serialize(err) => write!(f, "failed to serialize profile: {err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Serialize(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for RepoError {
    fn from(value: serde_json::Error) -> Self {
        Self::Serialize(value)
    }
}

/// Credential pair restored from durable storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PersistedSession {
    pub token: Option<String>,
    pub user: Option<UserProfile>,
}

/// Storage contract for the session credential pair.
pub trait SessionRepository {
    /// Reads both durable entries, falling back to absent values.
    fn load(&self) -> RepoResult<PersistedSession>;
    /// Writes or removes the durable token entry.
    fn store_token(&self, token: Option<&str>) -> RepoResult<()>;
    /// Writes or removes the durable profile entry.
    fn store_user(&self, user: Option<&UserProfile>) -> RepoResult<()>;
    /// Removes every durable entry for the session.
    fn clear(&self) -> RepoResult<()>;
}

/// SQLite-backed credential storage.
pub struct SqliteSessionRepository {
    conn: Connection,
}

impl SqliteSessionRepository {
    /// Wraps a migrated connection from `db::open_db`.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    fn read_key(&self, key: &str) -> RepoResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM credentials WHERE key = ?1;",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn write_key(&self, key: &str, value: Option<&str>) -> RepoResult<()> {
        match value {
            Some(value) => {
                self.conn.execute(
                    "INSERT INTO credentials (key, value) VALUES (?1, ?2)
                     ON CONFLICT (key) DO UPDATE SET value = excluded.value;",
                    params![key, value],
                )?;
            }
            None => {
                self.conn
                    .execute("DELETE FROM credentials WHERE key = ?1;", params![key])?;
            }
        }
        Ok(())
    }
}

impl SessionRepository for SqliteSessionRepository {
    fn load(&self) -> RepoResult<PersistedSession> {
        let token = self.read_key(KEY_TOKEN)?.filter(|token| !token.is_empty());

        let user = match self.read_key(KEY_USER)? {
            Some(raw) => match serde_json::from_str::<UserProfile>(&raw) {
                Ok(profile) => Some(profile),
                Err(err) => {
                    warn!(
                        "event=session_restore module=repo status=degraded reason=corrupt_profile error={err}"
                    );
                    None
                }
            },
            None => None,
        };

        Ok(PersistedSession { token, user })
    }

    fn store_token(&self, token: Option<&str>) -> RepoResult<()> {
        self.write_key(KEY_TOKEN, token.filter(|token| !token.is_empty()))
    }

    fn store_user(&self, user: Option<&UserProfile>) -> RepoResult<()> {
        let serialized = match user {
            Some(profile) => Some(serde_json::to_string(profile)?),
            None => None,
        };
        self.write_key(KEY_USER, serialized.as_deref())
    }

    fn clear(&self) -> RepoResult<()> {
        self.conn.execute("DELETE FROM credentials;", [])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{PersistedSession, SessionRepository, SqliteSessionRepository};
    use crate::db::open_db_in_memory;
    use crate::model::session::UserProfile;

    fn repo() -> SqliteSessionRepository {
        let conn = open_db_in_memory().expect("in-memory store should open");
        SqliteSessionRepository::new(conn)
    }

    fn profile() -> UserProfile {
        UserProfile {
            id: "u-1".to_string(),
            name: "Ada".to_string(),
            email: "ada@example.com".to_string(),
        }
    }

    #[test]
    fn empty_store_loads_as_absent() {
        let loaded = repo().load().expect("load should succeed");
        assert_eq!(loaded, PersistedSession::default());
    }

    #[test]
    fn token_and_user_round_trip() {
        let repo = repo();
        repo.store_token(Some("tok-123")).expect("store token");
        repo.store_user(Some(&profile())).expect("store user");

        let loaded = repo.load().expect("load should succeed");
        assert_eq!(loaded.token.as_deref(), Some("tok-123"));
        assert_eq!(loaded.user, Some(profile()));
    }

    #[test]
    fn storing_none_removes_the_entry() {
        let repo = repo();
        repo.store_token(Some("tok-123")).expect("store token");
        repo.store_token(None).expect("remove token");

        let loaded = repo.load().expect("load should succeed");
        assert_eq!(loaded.token, None);
    }

    #[test]
    fn empty_token_is_treated_as_removal() {
        let repo = repo();
        repo.store_token(Some("")).expect("store empty token");

        let loaded = repo.load().expect("load should succeed");
        assert_eq!(loaded.token, None);
    }

    #[test]
    fn clear_removes_both_entries() {
        let repo = repo();
        repo.store_token(Some("tok-123")).expect("store token");
        repo.store_user(Some(&profile())).expect("store user");
        repo.clear().expect("clear should succeed");

        let loaded = repo.load().expect("load should succeed");
        assert_eq!(loaded, PersistedSession::default());
    }
}
