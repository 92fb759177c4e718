//! Scheduling domain model.
//!
//! # Responsibility
//! - Define the event aggregate and the per-event member record.
//! - Own the fixed 24-hour slot grid type.
//!
//! # Invariants
//! - A slot grid always has exactly `HOURS_PER_DAY` entries.
//! - A member key is derived from member fields and never reassigned.

pub mod event;
pub mod member;
pub mod slots;
