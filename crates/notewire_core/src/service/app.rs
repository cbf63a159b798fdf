//! Application aggregate and command surface.
//!
//! # Responsibility
//! - Own every piece of client state (session, cache, reset flow, busy
//!   flag) and thread it explicitly through the components.
//! - Expose the commands the presentation layer dispatches.
//!
//! # Invariants
//! - All network I/O goes through the gateway; no command talks to the
//!   server directly.
//! - The busy flag guards login/register/save/delete re-entry; a dropped
//!   invocation is a logged no-op, never queued.
//! - Operations take `&mut self`, so two requests for the same resource
//!   are never in flight at once.

use crate::api::{ApiClient, ApiEnvelope, ApiError, ApiRequest};
use crate::config::Config;
use crate::model::credentials::{
    normalize_email, validate_login, validate_registration, CredentialError,
};
use crate::model::note::{Note, NoteDraft, NoteValidationError, SortOrder};
use crate::presenter::{NoticeLevel, Presenter};
use crate::repo::session_repo::{RepoError, SessionRepository};
use crate::service::note_service::{sort_notes, NoteCache};
use crate::service::reset_flow::{ResetError, ResetFlow};
use crate::session_store::SessionStore;
use log::{debug, warn};
use serde_json::json;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AppResult<T> = Result<T, AppError>;

/// Command-level error.
///
/// Gateway variants arrive with their user notice already emitted;
/// validation and rejection variants carry the text the presentation
/// layer shows inline.
#[derive(Debug)]
pub enum AppError {
    Credentials(CredentialError),
    Draft(NoteValidationError),
    Session(RepoError),
    Api(ApiError),
    Reset(ResetError),
    /// Server-declared business failure, surfaced verbatim.
    Rejected(String),
}

impl Display for AppError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credentials(err) => write!(f, "{err}"),
            Self::Draft(err) => write!(f, "{err}"),
            Self::Session(err) => write!(f, "{err}"),
            Self::Api(err) => write!(f, "{err}"),
            Self::Reset(err) => write!(f, "{err}"),
            Self::Rejected(message) => write!(f, "{message}"),
        }
    }
}

impl Error for AppError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Credentials(err) => Some(err),
            Self::Draft(err) => Some(err),
            Self::Session(err) => Some(err),
            Self::Api(err) => Some(err),
            Self::Reset(err) => Some(err),
            Self::Rejected(_) => None,
        }
    }
}

impl From<CredentialError> for AppError {
    fn from(value: CredentialError) -> Self {
        Self::Credentials(value)
    }
}

impl From<NoteValidationError> for AppError {
    fn from(value: NoteValidationError) -> Self {
        Self::Draft(value)
    }
}

impl From<RepoError> for AppError {
    fn from(value: RepoError) -> Self {
        Self::Session(value)
    }
}

impl From<ApiError> for AppError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

impl From<ResetError> for AppError {
    fn from(value: ResetError) -> Self {
        Self::Reset(value)
    }
}

/// The application: every component, threaded explicitly.
pub struct App<R: SessionRepository, P: Presenter> {
    gateway: ApiClient,
    session: SessionStore<R>,
    notes: NoteCache,
    reset: ResetFlow,
    presenter: P,
    busy: bool,
}

impl<R: SessionRepository, P: Presenter> App<R, P> {
    /// Builds the aggregate, restoring the session from durable storage.
    pub fn new(config: &Config, repo: R, presenter: P) -> AppResult<Self> {
        let gateway = ApiClient::new(&config.api)?;
        Ok(Self {
            gateway,
            session: SessionStore::restore(repo),
            notes: NoteCache::new(),
            reset: ResetFlow::new(config.reset.expose_debug_codes),
            presenter,
            busy: false,
        })
    }

    pub fn session(&self) -> &SessionStore<R> {
        &self.session
    }

    pub fn notes(&self) -> &[Note] {
        self.notes.notes()
    }

    pub fn editing_id(&self) -> Option<&str> {
        self.notes.editing_id()
    }

    pub fn reset(&self) -> &ResetFlow {
        &self.reset
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn find_note(&self, id: &str) -> Option<&Note> {
        self.notes.find(id)
    }

    /// Pure ordering projection for rendering; the cache is untouched.
    pub fn sorted_notes(&self, order: SortOrder) -> Vec<Note> {
        sort_notes(self.notes.notes(), order)
    }

    // ----- auth ----------------------------------------------------------

    pub async fn login(&mut self, email: &str, password: &str) -> AppResult<()> {
        if self.enter_busy("login") {
            return Ok(());
        }
        let outcome = self.login_inner(email, password).await;
        self.busy = false;
        outcome
    }

    async fn login_inner(&mut self, email: &str, password: &str) -> AppResult<()> {
        let email = normalize_email(email);
        validate_login(&email)?;

        let envelope = self
            .gateway
            .call(
                &mut self.session,
                &mut self.presenter,
                ApiRequest::post(
                    "/api/login",
                    json!({ "email": email, "password": password }),
                ),
            )
            .await?;
        if !envelope.success {
            return Err(AppError::Rejected(
                envelope.error_or("Invalid credentials").to_string(),
            ));
        }

        self.finish_sign_in(envelope, "Login successful!").await
    }

    pub async fn register(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> AppResult<()> {
        if self.enter_busy("register") {
            return Ok(());
        }
        let outcome = self
            .register_inner(name, email, password, confirm_password)
            .await;
        self.busy = false;
        outcome
    }

    async fn register_inner(
        &mut self,
        name: &str,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> AppResult<()> {
        let name = name.trim();
        let email = normalize_email(email);
        validate_registration(name, &email, password, confirm_password)?;

        let envelope = self
            .gateway
            .call(
                &mut self.session,
                &mut self.presenter,
                ApiRequest::post(
                    "/api/register",
                    json!({ "name": name, "email": email, "password": password }),
                ),
            )
            .await?;
        if !envelope.success {
            return Err(AppError::Rejected(
                envelope.error_or("Registration failed").to_string(),
            ));
        }

        self.finish_sign_in(envelope, "Account created successfully!")
            .await
    }

    async fn finish_sign_in(&mut self, envelope: ApiEnvelope, notice: &str) -> AppResult<()> {
        let (token, user) = match (envelope.token, envelope.user) {
            (Some(token), Some(user)) => (token, user),
            // Contract violation; fail like a business error rather than
            // storing a half-established session.
            _ => return Err(AppError::Rejected("Malformed auth response".to_string())),
        };

        self.session.establish(&token, user)?;
        self.presenter.notify(NoticeLevel::Success, notice);
        self.load_notes(true).await
    }

    /// Signs out locally; no network call is involved.
    pub fn logout(&mut self) -> AppResult<()> {
        self.session.clear_auth()?;
        self.notes.clear();
        self.notes.cancel_edit();
        self.presenter.show_login();
        self.presenter
            .notify(NoticeLevel::Success, "Logged out successfully");
        Ok(())
    }

    /// Startup check: a restored token must still be accepted server-side.
    pub async fn verify_session(&mut self) -> AppResult<()> {
        if !self.session.is_authenticated() {
            self.presenter.show_login();
            return Ok(());
        }

        match self
            .gateway
            .call(
                &mut self.session,
                &mut self.presenter,
                ApiRequest::post("/api/verify-token", json!({})),
            )
            .await
        {
            Ok(envelope) if envelope.success => Ok(()),
            Ok(_) => {
                self.session.clear_auth()?;
                self.presenter.show_login();
                Ok(())
            }
            // 401/403 is already fully handled inside the gateway.
            Err(ApiError::Unauthorized) => Ok(()),
            Err(err) => {
                warn!("event=verify_token module=app status=degraded error={err}");
                self.session.clear_auth()?;
                self.presenter.show_login();
                Ok(())
            }
        }
    }

    // ----- notes ---------------------------------------------------------

    /// Synchronizes the cache from the server.
    ///
    /// With `force_refresh` false a non-empty cache is served as-is. Any
    /// failure degrades to an empty cache; the gateway has already told
    /// the user what went wrong.
    pub async fn load_notes(&mut self, force_refresh: bool) -> AppResult<()> {
        if !self.session.is_authenticated() {
            self.presenter.show_login();
            return Ok(());
        }
        if !force_refresh && !self.notes.is_empty() {
            return Ok(());
        }

        match self
            .gateway
            .call(
                &mut self.session,
                &mut self.presenter,
                ApiRequest::get("/api/notes"),
            )
            .await
        {
            Ok(envelope) if envelope.success => {
                match envelope.notes {
                    Some(notes) => self.notes.replace(notes),
                    None => self.notes.clear(),
                }
                Ok(())
            }
            Ok(_) => {
                self.notes.clear();
                Ok(())
            }
            Err(err) => {
                warn!("event=notes_load module=app status=degraded error={err}");
                self.notes.clear();
                Ok(())
            }
        }
    }

    /// Creates a new note, or updates the current edit target.
    pub async fn save_note(&mut self, title: &str, content: &str) -> AppResult<()> {
        if self.enter_busy("save_note") {
            return Ok(());
        }
        let outcome = self.save_note_inner(title, content).await;
        self.busy = false;
        outcome
    }

    async fn save_note_inner(&mut self, title: &str, content: &str) -> AppResult<()> {
        let draft = NoteDraft::new(title, content);
        draft.validate()?;

        let body = json!({ "title": draft.title, "content": draft.content });
        let (request, updating) = match self.notes.editing_id() {
            Some(id) => (ApiRequest::put(format!("/api/notes/{id}"), body), true),
            None => (ApiRequest::post("/api/notes", body), false),
        };

        let envelope = self
            .gateway
            .call(&mut self.session, &mut self.presenter, request)
            .await?;
        if !envelope.success {
            return Err(AppError::Rejected(
                envelope.error_or("Failed to save note").to_string(),
            ));
        }

        // Full reload after every successful mutation, so server-computed
        // fields (timestamps, ids) are always reflected.
        self.notes.cancel_edit();
        self.load_notes(true).await?;
        self.presenter.notify(
            NoticeLevel::Success,
            if updating { "Note updated!" } else { "Note created!" },
        );
        Ok(())
    }

    pub async fn delete_note(&mut self, id: &str) -> AppResult<()> {
        if self.enter_busy("delete_note") {
            return Ok(());
        }
        let outcome = self.delete_note_inner(id).await;
        self.busy = false;
        outcome
    }

    async fn delete_note_inner(&mut self, id: &str) -> AppResult<()> {
        let envelope = self
            .gateway
            .call(
                &mut self.session,
                &mut self.presenter,
                ApiRequest::delete(format!("/api/notes/{id}")),
            )
            .await?;
        if !envelope.success {
            return Err(AppError::Rejected(
                envelope.error_or("Failed to delete note").to_string(),
            ));
        }

        if self.notes.editing_id() == Some(id) {
            self.notes.cancel_edit();
        }
        self.load_notes(true).await?;
        self.presenter
            .notify(NoticeLevel::Success, "Note deleted successfully");
        Ok(())
    }

    /// Selects a cached note as the edit target and returns it for form
    /// prefill; notifies when the id is unknown.
    pub fn edit_note(&mut self, id: &str) -> Option<&Note> {
        if !self.notes.begin_edit(id) {
            self.presenter.notify(NoticeLevel::Error, "Note not found");
            return None;
        }
        self.notes.find(id)
    }

    pub fn cancel_edit(&mut self) {
        self.notes.cancel_edit();
    }

    // ----- password reset ------------------------------------------------

    pub async fn reset_request_code(&mut self, email: &str) -> AppResult<()> {
        self.reset
            .request_code(&self.gateway, &mut self.session, &mut self.presenter, email)
            .await?;
        Ok(())
    }

    pub async fn reset_resend_code(&mut self) -> AppResult<()> {
        self.reset
            .resend_code(&self.gateway, &mut self.session, &mut self.presenter)
            .await?;
        Ok(())
    }

    pub async fn reset_verify_code(&mut self, code: &str) -> AppResult<()> {
        self.reset
            .verify_code(&self.gateway, &mut self.session, &mut self.presenter, code)
            .await?;
        Ok(())
    }

    pub async fn reset_set_password(
        &mut self,
        new_password: &str,
        confirm_password: &str,
    ) -> AppResult<()> {
        self.reset
            .set_password(
                &self.gateway,
                &mut self.session,
                &mut self.presenter,
                new_password,
                confirm_password,
            )
            .await?;
        Ok(())
    }

    pub fn reset_exit(&mut self) {
        self.reset.exit(&mut self.presenter);
    }

    // ----- internals -----------------------------------------------------

    /// Claims the busy flag; returns true when another submission is
    /// already in flight (the caller must drop the invocation).
    fn enter_busy(&mut self, operation: &str) -> bool {
        if self.busy {
            debug!("event=busy_drop module=app operation={operation}");
            return true;
        }
        self.busy = true;
        false
    }
}
