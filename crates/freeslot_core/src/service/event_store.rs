//! Event use-case service.
//!
//! # Responsibility
//! - Read single events and the event list, including a live feed.
//! - Create and remove events behind the admin gate.
//!
//! # Invariants
//! - The admin gate accepts the credential before any write.
//! - `title` and `date` are non-empty after trimming; `date` is `YYYY-MM-DD`.
//! - Change notifications are published only after the write commits.

use crate::clock::Clock;
use crate::model::event::{Event, EventId, NewEvent};
use crate::repo::event_repo::EventRepository;
use crate::repo::RepoError;
use crate::service::admin_gate::{AdminCredential, AdminGate};
use crate::sync::change::{ChangeKind, EventChange, MemberChange};
use crate::sync::channel::Subscription;
use crate::sync::{SyncHub, EVENTS_SCOPE};
use crate::validation::parse_iso_date;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

/// Service error for event use-cases.
#[derive(Debug)]
pub enum EventStoreError {
    /// Username or password was empty.
    MissingCredential,
    /// The admin gate rejected the credential.
    InvalidAdminCredential,
    /// Required event field is empty.
    MissingField(&'static str),
    /// Event date is not a `YYYY-MM-DD` calendar date.
    InvalidEventDate(String),
    EventNotFound(EventId),
    Repo(RepoError),
}

impl EventStoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::InvalidAdminCredential => "invalid_admin_credential",
            Self::MissingField(_) => "missing_field",
            Self::InvalidEventDate(_) => "invalid_event_date",
            Self::EventNotFound(_) => "event_not_found",
            Self::Repo(_) => "storage_error",
        }
    }
}

impl Display for EventStoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingCredential => write!(f, "admin username and password are required"),
            Self::InvalidAdminCredential => write!(f, "admin credential rejected"),
            Self::MissingField(field) => write!(f, "missing required event field: {field}"),
            Self::InvalidEventDate(value) => {
                write!(f, "event date must be YYYY-MM-DD, got `{value}`")
            }
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for EventStoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for EventStoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::EventNotFound(id) => Self::EventNotFound(id),
            other => Self::Repo(other),
        }
    }
}

/// Event service facade over a repository and the admin gate.
pub struct EventStore<R: EventRepository, G: AdminGate> {
    repo: R,
    gate: G,
    clock: Arc<dyn Clock>,
    sync: SyncHub,
}

impl<R: EventRepository, G: AdminGate> EventStore<R, G> {
    pub fn new(repo: R, gate: G, clock: Arc<dyn Clock>, sync: SyncHub) -> Self {
        Self {
            repo,
            gate,
            clock,
            sync,
        }
    }

    pub fn get(&self, id: EventId) -> Result<Event, EventStoreError> {
        self.repo
            .get_event(id)?
            .ok_or(EventStoreError::EventNotFound(id))
    }

    /// All events ordered by creation time.
    pub fn list(&self) -> Result<Vec<Event>, EventStoreError> {
        Ok(self.repo.list_events()?)
    }

    /// Live event list: current events as `Added`, then diffs.
    pub fn subscribe(&self) -> Result<Subscription<EventChange>, EventStoreError> {
        let subscription = self.sync.events.subscribe(EVENTS_SCOPE);
        let snapshot = self.repo.list_events()?;
        subscription.seed(snapshot.into_iter().map(|event| EventChange {
            kind: ChangeKind::Added,
            event,
        }));
        Ok(subscription)
    }

    /// Creates one event after the admin gate accepts `credential`.
    pub fn create(
        &self,
        fields: &NewEvent,
        credential: &AdminCredential,
    ) -> Result<Event, EventStoreError> {
        self.authorize(credential, "event_create")?;

        let title = fields.title.trim();
        if title.is_empty() {
            return Err(EventStoreError::MissingField("title"));
        }
        let date = fields.date.trim();
        if date.is_empty() {
            return Err(EventStoreError::MissingField("date"));
        }
        if parse_iso_date(date).is_none() {
            return Err(EventStoreError::InvalidEventDate(date.to_string()));
        }

        let normalized = NewEvent::new(title, fields.description.as_str(), date);
        let event = self
            .repo
            .insert_event(Uuid::new_v4(), &normalized, self.clock.now_ms())?;
        info!(
            "event=event_create module=event_store status=ok event_id={} created_at={}",
            event.id, event.created_at
        );

        self.sync.events.publish(
            EVENTS_SCOPE,
            EventChange {
                kind: ChangeKind::Added,
                event: event.clone(),
            },
        );
        Ok(event)
    }

    /// Removes one event and every member record it owns.
    ///
    /// Subscribers of the event receive `Removed` for each member.
    pub fn remove(
        &self,
        id: EventId,
        credential: &AdminCredential,
    ) -> Result<Event, EventStoreError> {
        self.authorize(credential, "event_remove")?;

        let removed = self.repo.delete_event(id)?;
        info!(
            "event=event_remove module=event_store status=ok event_id={} member_count={}",
            id,
            removed.members.len()
        );

        let scope = id.to_string();
        for stored in removed.members {
            self.sync.members.publish(
                &scope,
                MemberChange::removed(stored.key, stored.member, stored.revision),
            );
        }
        self.sync.events.publish(
            EVENTS_SCOPE,
            EventChange {
                kind: ChangeKind::Removed,
                event: removed.event.clone(),
            },
        );
        Ok(removed.event)
    }

    fn authorize(
        &self,
        credential: &AdminCredential,
        operation: &str,
    ) -> Result<(), EventStoreError> {
        if !credential.is_complete() {
            return Err(EventStoreError::MissingCredential);
        }
        if !self.gate.verify(&credential.username, &credential.password) {
            warn!(
                "event={operation} module=event_store status=denied error_code=invalid_admin_credential"
            );
            return Err(EventStoreError::InvalidAdminCredential);
        }
        Ok(())
    }
}
