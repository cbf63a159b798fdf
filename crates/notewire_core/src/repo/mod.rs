//! Durable-persistence contracts and SQLite implementations.
//!
//! # Responsibility
//! - Define the storage contract for the session credential pair.
//! - Isolate SQL details from session/service orchestration.
//!
//! # Invariants
//! - Exactly two keys are ever persisted: the token and the serialized
//!   user profile; both are removed together on clear.

pub mod session_repo;
