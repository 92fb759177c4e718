//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate validation, repositories and change feeds into the
//!   operations clients call.
//! - Keep callers decoupled from storage details.

pub mod admin_gate;
pub mod event_store;
pub mod member_registry;
