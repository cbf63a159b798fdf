use notewire_core::db::migrations::latest_version;
use notewire_core::db::open_db;
use notewire_core::{SessionRepository, SessionStore, SqliteSessionRepository, UserProfile};
use rusqlite::params;

fn profile() -> UserProfile {
    UserProfile {
        id: "u-1".to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    }
}

#[test]
fn open_applies_migrations_and_reopen_is_idempotent() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("notewire.db");

    let conn = open_db(&path).expect("first open should migrate");
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .expect("user_version should be readable");
    assert_eq!(version, latest_version());
    drop(conn);

    let conn = open_db(&path).expect("reopen should be a no-op");
    let version: u32 = conn
        .query_row("PRAGMA user_version;", [], |row| row.get(0))
        .expect("user_version should be readable");
    assert_eq!(version, latest_version());
}

#[test]
fn session_survives_a_process_restart() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("notewire.db");

    {
        let repo = SqliteSessionRepository::new(open_db(&path).expect("open"));
        let mut store = SessionStore::restore(repo);
        store
            .establish("tok-persisted", profile())
            .expect("establish should persist");
    }

    let repo = SqliteSessionRepository::new(open_db(&path).expect("reopen"));
    let store = SessionStore::restore(repo);
    assert!(store.is_authenticated());
    assert_eq!(store.token(), "tok-persisted");
    assert_eq!(store.user().map(|user| user.name.as_str()), Some("Ada"));
}

#[test]
fn clear_auth_removes_both_durable_keys() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("notewire.db");

    {
        let repo = SqliteSessionRepository::new(open_db(&path).expect("open"));
        let mut store = SessionStore::restore(repo);
        store
            .establish("tok-persisted", profile())
            .expect("establish should persist");
        store.clear_auth().expect("clear should persist");
    }

    let conn = open_db(&path).expect("reopen");
    let remaining: u32 = conn
        .query_row("SELECT COUNT(*) FROM credentials;", [], |row| row.get(0))
        .expect("count should be readable");
    assert_eq!(remaining, 0);
}

#[test]
fn corrupt_stored_profile_restores_as_signed_out() {
    let dir = tempfile::tempdir().expect("temp dir should be created");
    let path = dir.path().join("notewire.db");

    {
        let repo = SqliteSessionRepository::new(open_db(&path).expect("open"));
        repo.store_token(Some("tok-persisted")).expect("seed token");
        repo.store_user(Some(&profile())).expect("seed user");
    }

    {
        let conn = open_db(&path).expect("reopen for corruption");
        conn.execute(
            "UPDATE credentials SET value = ?1 WHERE key = 'user';",
            params!["{not json"],
        )
        .expect("corrupt the stored profile");
    }

    let repo = SqliteSessionRepository::new(open_db(&path).expect("reopen"));
    let store = SessionStore::restore(repo);
    assert_eq!(store.token(), "tok-persisted");
    assert!(store.user().is_none());
    assert!(!store.is_authenticated());
}
