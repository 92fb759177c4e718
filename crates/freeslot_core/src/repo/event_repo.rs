//! Event repository contracts and SQLite implementation.
//!
//! # Invariants
//! - `created_at` is assigned inside the insert as
//!   `max(now_ms, latest created_at + 1)`, so it strictly increases per store.
//! - Removing an event removes its members and slot rows in the same
//!   transaction.

use crate::model::event::{Event, EventId, NewEvent};
use crate::repo::member_repo::{load_members, StoredMember};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, Row};
use uuid::Uuid;

const EVENT_SELECT_SQL: &str = "SELECT id, title, description, date, created_at FROM events";

/// Event plus the members it owned at removal time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemovedEvent {
    pub event: Event,
    pub members: Vec<StoredMember>,
}

/// Repository interface for event metadata.
pub trait EventRepository {
    fn insert_event(&self, id: EventId, event: &NewEvent, now_ms: i64) -> RepoResult<Event>;
    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>>;
    /// All events ordered by creation time.
    fn list_events(&self) -> RepoResult<Vec<Event>>;
    fn delete_event(&self, id: EventId) -> RepoResult<RemovedEvent>;
}

/// SQLite-backed event repository.
pub struct SqliteEventRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteEventRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl EventRepository for SqliteEventRepository<'_> {
    fn insert_event(&self, id: EventId, event: &NewEvent, now_ms: i64) -> RepoResult<Event> {
        let created_at: i64 = self.conn.query_row(
            "INSERT INTO events (id, title, description, date, created_at)
             VALUES (
                ?1, ?2, ?3, ?4,
                MAX(?5, COALESCE((SELECT MAX(created_at) FROM events) + 1, ?5))
             )
             RETURNING created_at;",
            params![
                id.to_string(),
                event.title.as_str(),
                event.description.as_str(),
                event.date.as_str(),
                now_ms,
            ],
            |row| row.get(0),
        )?;

        Ok(Event {
            id,
            title: event.title.clone(),
            description: event.description.clone(),
            date: event.date.clone(),
            created_at,
        })
    }

    fn get_event(&self, id: EventId) -> RepoResult<Option<Event>> {
        load_event(self.conn, id)
    }

    fn list_events(&self) -> RepoResult<Vec<Event>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{EVENT_SELECT_SQL} ORDER BY created_at ASC, id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut events = Vec::new();
        while let Some(row) = rows.next()? {
            events.push(parse_event_row(row)?);
        }
        Ok(events)
    }

    fn delete_event(&self, id: EventId) -> RepoResult<RemovedEvent> {
        let tx = self.conn.unchecked_transaction()?;
        let event = load_event(&tx, id)?.ok_or(RepoError::EventNotFound(id))?;
        let members = load_members(&tx, id)?;
        tx.execute("DELETE FROM events WHERE id = ?1;", [id.to_string()])?;
        tx.commit()?;
        Ok(RemovedEvent { event, members })
    }
}

fn load_event(conn: &Connection, id: EventId) -> RepoResult<Option<Event>> {
    let mut stmt = conn.prepare(&format!("{EVENT_SELECT_SQL} WHERE id = ?1;"))?;
    let mut rows = stmt.query([id.to_string()])?;
    if let Some(row) = rows.next()? {
        return Ok(Some(parse_event_row(row)?));
    }
    Ok(None)
}

fn parse_event_row(row: &Row<'_>) -> RepoResult<Event> {
    let id_text: String = row.get("id")?;
    let id = Uuid::parse_str(&id_text).map_err(|_| {
        RepoError::InvalidData(format!("invalid uuid value `{id_text}` in events.id"))
    })?;

    Ok(Event {
        id,
        title: row.get("title")?,
        description: row.get("description")?,
        date: row.get("date")?,
        created_at: row.get("created_at")?,
    })
}

