//! Credential validation rules.
//!
//! # Responsibility
//! - Validate email, name and password input before any network call.
//! - Reject known disposable-mail domains at registration and reset time.
//!
//! # Invariants
//! - An email passes only when it has `local@domain.tld` shape and the
//!   domain is not in the disposable set.
//! - Validation never performs I/O.

use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Minimum accepted display-name length, in characters.
pub const NAME_MIN_CHARS: usize = 2;

/// Minimum accepted password length, in characters.
pub const PASSWORD_MIN_CHARS: usize = 6;

/// Required reset-code length, in characters.
pub const RESET_CODE_CHARS: usize = 6;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Domains known to hand out throwaway inboxes; rejected outright.
const DISPOSABLE_DOMAINS: &[&str] = &[
    "tempmail.com",
    "10minutemail.com",
    "guerrillamail.com",
    "mailinator.com",
    "yopmail.com",
    "getairmail.com",
    "temp-mail.org",
    "sharklasers.com",
    "trashmail.com",
    "fakeinbox.com",
    "dispostable.com",
    "mailnesia.com",
];

/// Validation error for auth form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    InvalidEmail,
    NameTooShort,
    PasswordTooShort,
    PasswordMismatch,
}

impl Display for CredentialError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEmail => write!(f, "Please enter a valid email address"),
            Self::NameTooShort => {
                write!(f, "Name must be at least {NAME_MIN_CHARS} characters")
            }
            Self::PasswordTooShort => {
                write!(f, "Password must be at least {PASSWORD_MIN_CHARS} characters")
            }
            Self::PasswordMismatch => write!(f, "Passwords do not match"),
        }
    }
}

impl Error for CredentialError {}

/// Lowercases and trims an email address for transmission and comparison.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Returns whether `email` has valid shape and a non-disposable domain.
pub fn is_valid_email(email: &str) -> bool {
    if !EMAIL_RE.is_match(email) {
        return false;
    }

    // The shape check guarantees exactly one `@`.
    let domain = match email.split('@').nth(1) {
        Some(domain) => domain.to_lowercase(),
        None => return false,
    };

    !DISPOSABLE_DOMAINS.contains(&domain.as_str())
}

/// Validates login form input.
pub fn validate_login(email: &str) -> Result<(), CredentialError> {
    if !is_valid_email(email) {
        return Err(CredentialError::InvalidEmail);
    }
    Ok(())
}

/// Validates registration form input.
///
/// Checks run in form order: name, email, password length, confirmation.
pub fn validate_registration(
    name: &str,
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), CredentialError> {
    if name.chars().count() < NAME_MIN_CHARS {
        return Err(CredentialError::NameTooShort);
    }
    if !is_valid_email(email) {
        return Err(CredentialError::InvalidEmail);
    }
    validate_new_password(password, confirm_password)
}

/// Validates a new password and its confirmation (registration and reset).
pub fn validate_new_password(
    password: &str,
    confirm_password: &str,
) -> Result<(), CredentialError> {
    if password.chars().count() < PASSWORD_MIN_CHARS {
        return Err(CredentialError::PasswordTooShort);
    }
    if password != confirm_password {
        return Err(CredentialError::PasswordMismatch);
    }
    Ok(())
}
