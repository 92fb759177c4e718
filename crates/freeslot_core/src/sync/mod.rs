//! Realtime change propagation between participants' views.
//!
//! # Responsibility
//! - Define change notifications for events and members.
//! - Define the push transport contract and an in-process implementation.
//! - Provide a client-side state container that applies diffs.
//!
//! # Invariants
//! - A subscription starts with the full current state as `Added` changes,
//!   followed by incremental diffs.
//! - Notifications for one member carry a monotonically increasing revision,
//!   so stale deliveries can be detected and dropped by the receiver.

pub mod change;
pub mod channel;
pub mod view;

use crate::sync::change::{EventChange, MemberChange};
use crate::sync::channel::{InProcessSyncChannel, SyncChannel};
use std::sync::Arc;

/// Scope used for the event list feed.
pub const EVENTS_SCOPE: &str = "events";

/// Transport handles shared by the event store and member registry.
#[derive(Clone)]
pub struct SyncHub {
    pub events: Arc<dyn SyncChannel<EventChange>>,
    pub members: Arc<dyn SyncChannel<MemberChange>>,
}

impl SyncHub {
    pub fn new(
        events: Arc<dyn SyncChannel<EventChange>>,
        members: Arc<dyn SyncChannel<MemberChange>>,
    ) -> Self {
        Self { events, members }
    }

    /// Hub backed by in-process channels.
    pub fn in_process() -> Self {
        Self::new(
            Arc::new(InProcessSyncChannel::<EventChange>::new()),
            Arc::new(InProcessSyncChannel::<MemberChange>::new()),
        )
    }
}

impl Default for SyncHub {
    fn default() -> Self {
        Self::in_process()
    }
}
