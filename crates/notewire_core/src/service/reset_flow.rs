//! Password-reset state machine.
//!
//! # Responsibility
//! - Drive the request-code → verify-code → new-password sequence.
//! - Validate each step locally before its network call.
//!
//! # Invariants
//! - The flow reaches `Complete` only through a verify-code success.
//! - Exiting discards the ephemeral state unconditionally; nothing is
//!   ever persisted.
//! - Server-echoed debug codes surface only when explicitly enabled.

use crate::api::{ApiClient, ApiError, ApiRequest};
use crate::model::credentials::{
    is_valid_email, normalize_email, validate_new_password, CredentialError, RESET_CODE_CHARS,
};
use crate::presenter::{NoticeLevel, Presenter};
use crate::repo::session_repo::SessionRepository;
use crate::session_store::SessionStore;
use serde_json::json;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ResetResult<T> = Result<T, ResetError>;

/// Current position in the reset sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStep {
    Request,
    Verify,
    Complete,
}

impl Display for ResetStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Request => "request",
            Self::Verify => "verify",
            Self::Complete => "complete",
        };
        write!(f, "{name}")
    }
}

/// Reset-flow error.
#[derive(Debug)]
pub enum ResetError {
    Credentials(CredentialError),
    /// The code is not exactly six characters.
    InvalidCode,
    /// An operation was invoked out of sequence.
    StepMismatch {
        expected: ResetStep,
        actual: ResetStep,
    },
    /// Server-declared failure, surfaced verbatim.
    Rejected(String),
    Api(ApiError),
}

impl Display for ResetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Credentials(err) => write!(f, "{err}"),
            Self::InvalidCode => {
                write!(f, "Please enter a valid {RESET_CODE_CHARS}-digit code")
            }
            Self::StepMismatch { expected, actual } => {
                write!(f, "reset flow is at the {actual} step, not {expected}")
            }
            Self::Rejected(message) => write!(f, "{message}"),
            Self::Api(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ResetError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Credentials(err) => Some(err),
            Self::Api(err) => Some(err),
            Self::InvalidCode | Self::StepMismatch { .. } | Self::Rejected(_) => None,
        }
    }
}

impl From<CredentialError> for ResetError {
    fn from(value: CredentialError) -> Self {
        Self::Credentials(value)
    }
}

impl From<ApiError> for ResetError {
    fn from(value: ApiError) -> Self {
        Self::Api(value)
    }
}

/// Ephemeral reset session; exists only while the flow is on screen.
pub struct ResetFlow {
    email: String,
    code: String,
    step: ResetStep,
    expose_debug_codes: bool,
}

impl ResetFlow {
    pub fn new(expose_debug_codes: bool) -> Self {
        Self {
            email: String::new(),
            code: String::new(),
            step: ResetStep::Request,
            expose_debug_codes,
        }
    }

    pub fn step(&self) -> ResetStep {
        self.step
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    /// Step 1: validates the email locally, requests a reset code, and
    /// advances to `Verify` on success.
    pub async fn request_code<R, P>(
        &mut self,
        gateway: &ApiClient,
        session: &mut SessionStore<R>,
        presenter: &mut P,
        email: &str,
    ) -> ResetResult<()>
    where
        R: SessionRepository,
        P: Presenter,
    {
        self.expect_step(ResetStep::Request)?;
        let email = normalize_email(email);
        if !is_valid_email(&email) {
            return Err(CredentialError::InvalidEmail.into());
        }

        self.send_code(gateway, session, presenter, &email).await?;
        self.email = email;
        self.step = ResetStep::Verify;
        Ok(())
    }

    /// Re-requests a code for the stored email without moving the step.
    pub async fn resend_code<R, P>(
        &mut self,
        gateway: &ApiClient,
        session: &mut SessionStore<R>,
        presenter: &mut P,
    ) -> ResetResult<()>
    where
        R: SessionRepository,
        P: Presenter,
    {
        self.expect_step(ResetStep::Verify)?;
        let email = self.email.clone();
        self.send_code(gateway, session, presenter, &email).await
    }

    /// Step 2: validates code length only, verifies it with the server,
    /// and advances to `Complete` on success.
    pub async fn verify_code<R, P>(
        &mut self,
        gateway: &ApiClient,
        session: &mut SessionStore<R>,
        presenter: &mut P,
        code: &str,
    ) -> ResetResult<()>
    where
        R: SessionRepository,
        P: Presenter,
    {
        self.expect_step(ResetStep::Verify)?;
        let code = code.trim().to_string();
        if code.chars().count() != RESET_CODE_CHARS {
            return Err(ResetError::InvalidCode);
        }

        let envelope = gateway
            .call(
                session,
                presenter,
                ApiRequest::post(
                    "/api/verify-reset-code",
                    json!({ "email": self.email, "code": code }),
                ),
            )
            .await?;
        if !envelope.success {
            return Err(ResetError::Rejected(
                envelope.error_or("Invalid or expired code").to_string(),
            ));
        }

        self.code = code;
        self.step = ResetStep::Complete;
        Ok(())
    }

    /// Step 3: validates the new password locally, submits it with the
    /// verified code, and on success discards the flow and routes back to
    /// the login view.
    pub async fn set_password<R, P>(
        &mut self,
        gateway: &ApiClient,
        session: &mut SessionStore<R>,
        presenter: &mut P,
        new_password: &str,
        confirm_password: &str,
    ) -> ResetResult<()>
    where
        R: SessionRepository,
        P: Presenter,
    {
        self.expect_step(ResetStep::Complete)?;
        validate_new_password(new_password, confirm_password)?;

        let envelope = gateway
            .call(
                session,
                presenter,
                ApiRequest::post(
                    "/api/reset-password",
                    json!({
                        "email": self.email,
                        "code": self.code,
                        "newPassword": new_password,
                    }),
                ),
            )
            .await?;
        if !envelope.success {
            return Err(ResetError::Rejected(
                envelope.error_or("Failed to reset password").to_string(),
            ));
        }

        self.discard();
        presenter.show_login();
        Ok(())
    }

    /// Abandons the flow at any point and returns to the login view.
    pub fn exit<P: Presenter>(&mut self, presenter: &mut P) {
        self.discard();
        presenter.show_login();
    }

    async fn send_code<R, P>(
        &self,
        gateway: &ApiClient,
        session: &mut SessionStore<R>,
        presenter: &mut P,
        email: &str,
    ) -> ResetResult<()>
    where
        R: SessionRepository,
        P: Presenter,
    {
        let envelope = gateway
            .call(
                session,
                presenter,
                ApiRequest::post("/api/forgot-password", json!({ "email": email })),
            )
            .await?;
        if !envelope.success {
            return Err(ResetError::Rejected(
                envelope.error_or("Failed to send code").to_string(),
            ));
        }

        if let Some(code) = envelope.debug_code.as_deref() {
            if self.expose_debug_codes {
                presenter.notify(NoticeLevel::Info, &format!("Test code: {code}"));
            }
        }
        Ok(())
    }

    fn discard(&mut self) {
        self.email.clear();
        self.code.clear();
        self.step = ResetStep::Request;
    }

    fn expect_step(&self, expected: ResetStep) -> ResetResult<()> {
        if self.step == expected {
            Ok(())
        } else {
            Err(ResetError::StepMismatch {
                expected,
                actual: self.step,
            })
        }
    }
}
