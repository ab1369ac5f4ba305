//! Workout/exercise domain model.
//!
//! # Responsibility
//! - Define the entity graph persisted by the store.
//! - Define transient drafts used while planning a workout.
//!
//! # Invariants
//! - A workout exclusively owns its exercises.
//! - Sketch bytes are opaque to core.

pub mod draft;
pub mod sketch;
pub mod workout;
