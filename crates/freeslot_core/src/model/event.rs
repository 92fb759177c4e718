//! Event aggregate.
//!
//! Events are immutable after creation. Members hang off an event through
//! the member registry, scoped by `EventId`.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Generated identifier of one event.
pub type EventId = Uuid;

/// Published scheduling event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,
    pub title: String,
    /// Free text; may be empty.
    pub description: String,
    /// Calendar date in `YYYY-MM-DD` form.
    pub date: String,
    /// Store-local epoch milliseconds, strictly increasing per store.
    pub created_at: i64,
}

/// Organizer input for creating an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: String,
}

impl NewEvent {
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            date: date.into(),
        }
    }
}
