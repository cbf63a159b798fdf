//! Domain model for the NoteWire client.
//!
//! # Responsibility
//! - Define the data shapes mirrored from the notes API.
//! - Enforce every client-local validation rule before network dispatch.
//!
//! # Invariants
//! - Notes are identified by server-assigned string ids.
//! - Validation failures never leave this layer as raw strings; each rule
//!   has a typed error variant.

pub mod credentials;
pub mod note;
pub mod session;
