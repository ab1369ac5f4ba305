//! Repository layer between callers and the workout store.
//!
//! # Responsibility
//! - Own the workout CRUD lifecycle and the cached, ordered workout list.
//! - Fan out the health sink side effect on creation.
//!
//! # Invariants
//! - Callers never talk to the store directly for mutations.
//! - Every operation returns a typed result in addition to logging.

pub mod workout_repo;
