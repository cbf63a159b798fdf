//! Presentation signal seam.
//!
//! # Responsibility
//! - Define the only channel through which core logic reaches the user:
//!   notices and the routed-to-login signal.
//!
//! # Invariants
//! - Core code never renders; it only emits signals through this trait.
//! - The gateway emits at most one notice per failed call.

/// Severity of a user-visible notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
    Info,
}

/// Signals from core logic to whatever renders the application.
///
/// Implemented by the terminal front end; tests substitute a recording
/// implementation, so every core path stays testable without a UI.
pub trait Presenter {
    /// Shows a transient user-visible notice.
    fn notify(&mut self, level: NoticeLevel, message: &str);

    /// Routes the user to the unauthenticated (login) view.
    fn show_login(&mut self);
}
