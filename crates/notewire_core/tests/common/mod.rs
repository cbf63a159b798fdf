//! Shared fixtures for gateway-level integration tests.

use notewire_core::db::open_db_in_memory;
use notewire_core::{
    App, Config, NoticeLevel, Presenter, SessionRepository, SqliteSessionRepository, UserProfile,
};

/// Records every core signal so tests can assert on exact notice counts.
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    pub notices: Vec<(NoticeLevel, String)>,
    pub login_routes: usize,
}

impl Presenter for RecordingPresenter {
    fn notify(&mut self, level: NoticeLevel, message: &str) {
        self.notices.push((level, message.to_string()));
    }

    fn show_login(&mut self) {
        self.login_routes += 1;
    }
}

impl RecordingPresenter {
    pub fn count_containing(&self, needle: &str) -> usize {
        self.notices
            .iter()
            .filter(|(_, message)| message.contains(needle))
            .count()
    }

    pub fn has_notice(&self, level: NoticeLevel, needle: &str) -> bool {
        self.notices
            .iter()
            .any(|(notice_level, message)| *notice_level == level && message.contains(needle))
    }
}

pub type TestApp = App<SqliteSessionRepository, RecordingPresenter>;

pub fn profile() -> UserProfile {
    UserProfile {
        id: "u-1".to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
    }
}

pub fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.api.base_url = base_url.to_string();
    config.api.timeout_secs = 5;
    config
}

/// App with an empty in-memory credential store.
pub fn test_app(base_url: &str) -> TestApp {
    app_with_config(test_config(base_url))
}

pub fn app_with_config(config: Config) -> TestApp {
    let conn = open_db_in_memory().expect("in-memory store should open");
    App::new(
        &config,
        SqliteSessionRepository::new(conn),
        RecordingPresenter::default(),
    )
    .expect("app should build")
}

/// App restored from a store already holding a valid session, so tests
/// reach authenticated endpoints without replaying the login exchange.
pub fn seeded_app(base_url: &str, token: &str) -> TestApp {
    let conn = open_db_in_memory().expect("in-memory store should open");
    let repo = SqliteSessionRepository::new(conn);
    repo.store_token(Some(token)).expect("seed token");
    repo.store_user(Some(&profile())).expect("seed user");

    App::new(
        &test_config(base_url),
        repo,
        RecordingPresenter::default(),
    )
    .expect("app should build")
}
