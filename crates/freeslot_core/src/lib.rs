//! Core domain logic for freeslot group scheduling.
//!
//! An organizer publishes an event, participants register and mark hourly
//! availability, and the core computes the hours everyone shares. This crate
//! is the single source of truth for those invariants.

pub mod availability;
pub mod clock;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod sync;
pub mod validation;

pub use availability::{common_intervals, AvailabilitySummary, HourInterval};
pub use clock::{Clock, FixedClock, SystemClock};
pub use logging::{default_log_level, init_logging, logging_status, LogConfig, LoggingError};
pub use model::event::{Event, EventId, NewEvent};
pub use model::member::{Member, MemberKey};
pub use model::slots::{InvalidHour, SlotGrid, HOURS_PER_DAY};
pub use repo::admin_repo::{AdminAccountRepository, SqliteAdminAccountRepository};
pub use repo::event_repo::{EventRepository, RemovedEvent, SqliteEventRepository};
pub use repo::member_repo::{MemberRepository, SqliteMemberRepository, StoredMember};
pub use repo::{RepoError, RepoResult};
pub use service::admin_gate::{AdminCredential, AdminGate, AdminGateError, PasswordAdminGate};
pub use service::event_store::{EventStore, EventStoreError};
pub use service::member_registry::{MemberRegistry, RegistryError};
pub use sync::change::{ChangeKind, EventChange, MemberChange};
pub use sync::channel::{InProcessSyncChannel, Subscription, SyncChannel};
pub use sync::view::LiveMemberView;
pub use sync::SyncHub;
pub use validation::registration::{
    validate_registration, RegistrationCandidate, RegistrationField, ValidatedRegistration,
    ValidationError,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
