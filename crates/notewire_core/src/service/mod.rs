//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate the gateway, session store and cache into the commands
//!   the presentation layer dispatches.
//! - Keep presentation fully decoupled behind the `Presenter` seam.

pub mod app;
pub mod note_service;
pub mod reset_flow;
