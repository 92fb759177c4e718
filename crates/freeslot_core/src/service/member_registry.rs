//! Member use-case service.
//!
//! # Responsibility
//! - Register participants into an event after validation.
//! - Apply single-hour slot toggles.
//! - Serve live member feeds and the common availability of an event.
//!
//! # Invariants
//! - Validation reads the clock once per registration.
//! - A student id is registered at most once per event; concurrent
//!   registrations race on a storage constraint and the loser gets
//!   `DuplicateStudentId`.
//! - A subscriber is registered before its snapshot is read, so no commit
//!   between the two is missed.

use crate::availability::AvailabilitySummary;
use crate::clock::Clock;
use crate::model::event::EventId;
use crate::model::member::{Member, MemberKey};
use crate::model::slots::check_hour;
use crate::repo::member_repo::{MemberRepository, StoredMember};
use crate::repo::RepoError;
use crate::sync::change::MemberChange;
use crate::sync::channel::{Subscription, SyncChannel};
use crate::validation::registration::{
    validate_registration, RegistrationCandidate, ValidationError,
};
use log::{debug, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use std::time::Instant;

/// Service error for member use-cases.
#[derive(Debug)]
pub enum RegistryError {
    Validation(ValidationError),
    DuplicateStudentId(String),
    EventNotFound(EventId),
    MemberNotFound(MemberKey),
    InvalidHour(usize),
    Repo(RepoError),
}

impl RegistryError {
    /// Stable reason code for callers that map errors to messages.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.code(),
            Self::DuplicateStudentId(_) => "duplicate_student_id",
            Self::EventNotFound(_) => "event_not_found",
            Self::MemberNotFound(_) => "member_not_found",
            Self::InvalidHour(_) => "invalid_hour",
            Self::Repo(_) => "storage_error",
        }
    }
}

impl Display for RegistryError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::DuplicateStudentId(_) => {
                write!(f, "student id is already registered for this event")
            }
            Self::EventNotFound(id) => write!(f, "event not found: {id}"),
            Self::MemberNotFound(key) => write!(f, "member not found: {key}"),
            Self::InvalidHour(hour) => write!(f, "hour index {hour} is out of range 0..24"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RegistryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ValidationError> for RegistryError {
    fn from(value: ValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for RegistryError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::EventNotFound(id) => Self::EventNotFound(id),
            RepoError::MemberNotFound(key) => Self::MemberNotFound(key),
            RepoError::DuplicateStudentId(student_id) => Self::DuplicateStudentId(student_id),
            other => Self::Repo(other),
        }
    }
}

/// Member service facade over a repository and the member change feed.
pub struct MemberRegistry<R: MemberRepository> {
    repo: R,
    clock: Arc<dyn Clock>,
    feed: Arc<dyn SyncChannel<MemberChange>>,
}

impl<R: MemberRepository> MemberRegistry<R> {
    pub fn new(repo: R, clock: Arc<dyn Clock>, feed: Arc<dyn SyncChannel<MemberChange>>) -> Self {
        Self { repo, clock, feed }
    }

    /// Opens a live member feed: current members as `Added`, then diffs.
    pub fn subscribe(
        &self,
        event_id: EventId,
    ) -> Result<Subscription<MemberChange>, RegistryError> {
        if !self.repo.event_exists(event_id)? {
            return Err(RegistryError::EventNotFound(event_id));
        }

        let subscription = self.feed.subscribe(&scope(event_id));
        let snapshot = self.repo.list_members(event_id)?;
        debug!(
            "event=member_subscribe module=registry status=ok event_id={} snapshot_size={}",
            event_id,
            snapshot.len()
        );
        subscription.seed(
            snapshot
                .into_iter()
                .map(|stored| MemberChange::added(stored.key, stored.member, stored.revision)),
        );
        Ok(subscription)
    }

    /// Validates `candidate` and creates its member record with no availability.
    pub fn register(
        &self,
        event_id: EventId,
        candidate: &RegistrationCandidate,
    ) -> Result<StoredMember, RegistryError> {
        let started_at = Instant::now();
        let today = self.clock.today();

        let validated = match validate_registration(candidate, today) {
            Ok(validated) => validated,
            Err(err) => {
                info!(
                    "event=member_register module=registry status=rejected event_id={} error_code={}",
                    event_id,
                    err.code()
                );
                return Err(err.into());
            }
        };

        // Fast path for the common conflict; the insert constraint covers races.
        if self
            .repo
            .find_by_student_id(event_id, &validated.student_id)?
            .is_some()
        {
            info!(
                "event=member_register module=registry status=rejected event_id={} error_code=duplicate_student_id",
                event_id
            );
            return Err(RegistryError::DuplicateStudentId(validated.student_id));
        }

        let member = Member::new(
            validated.name.as_str(),
            validated.student_id.as_str(),
            validated.dob_iso(),
        );
        let stored = self.repo.insert_member(event_id, &member)?;
        info!(
            "event=member_register module=registry status=ok event_id={} duration_ms={}",
            event_id,
            started_at.elapsed().as_millis()
        );

        self.feed.publish(
            &scope(event_id),
            MemberChange::added(stored.key.clone(), stored.member.clone(), stored.revision),
        );
        Ok(stored)
    }

    /// Flips one hour for one member and returns the updated record.
    pub fn toggle_slot(
        &self,
        event_id: EventId,
        key: &MemberKey,
        hour: usize,
    ) -> Result<StoredMember, RegistryError> {
        let hour = check_hour(hour).map_err(|err| RegistryError::InvalidHour(err.0))?;
        let stored = self.repo.toggle_slot(event_id, key, hour)?;
        debug!(
            "event=slot_toggle module=registry status=ok event_id={} hour={} revision={}",
            event_id, hour, stored.revision
        );

        self.feed.publish(
            &scope(event_id),
            MemberChange::changed(stored.key.clone(), stored.member.clone(), stored.revision),
        );
        Ok(stored)
    }

    pub fn get(&self, event_id: EventId, key: &MemberKey) -> Result<StoredMember, RegistryError> {
        self.repo
            .get_member(event_id, key)?
            .ok_or_else(|| RegistryError::MemberNotFound(key.clone()))
    }

    /// Members of one event ordered by key.
    pub fn members(&self, event_id: EventId) -> Result<Vec<StoredMember>, RegistryError> {
        if !self.repo.event_exists(event_id)? {
            return Err(RegistryError::EventNotFound(event_id));
        }
        Ok(self.repo.list_members(event_id)?)
    }

    /// Common availability of every member currently registered.
    pub fn common_availability(
        &self,
        event_id: EventId,
    ) -> Result<AvailabilitySummary, RegistryError> {
        let members = self.members(event_id)?;
        Ok(AvailabilitySummary::from_grids(
            members.iter().map(|stored| &stored.member.slots),
        ))
    }
}

fn scope(event_id: EventId) -> String {
    event_id.to_string()
}
