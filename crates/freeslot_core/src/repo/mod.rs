//! Repository layer abstractions and SQLite implementations.
//!
//! # Responsibility
//! - Define storage contracts for events, members and admin accounts.
//! - Isolate SQL details from services.
//!
//! # Invariants
//! - Registration uniqueness is enforced by a storage constraint, not by a
//!   separate read.
//! - Slot toggles update exactly one stored slot.
//! - Read paths reject invalid persisted state instead of masking it.

pub mod admin_repo;
pub mod event_repo;
pub mod member_repo;

use crate::db::DbError;
use crate::model::event::EventId;
use crate::model::member::MemberKey;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by all storage contracts.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    EventNotFound(EventId),
    MemberNotFound(MemberKey),
    /// Another member of the event already holds this student id.
    DuplicateStudentId(String),
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::MemberNotFound(key) => write!(f, "member not found: {key}"),
            Self::DuplicateStudentId(_) => write!(f, "student id already registered"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}
