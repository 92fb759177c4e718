//! Change notifications delivered to subscribers.

use crate::model::event::Event;
use crate::model::member::{Member, MemberKey};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Changed,
    Removed,
}

/// One member diff within an event.
///
/// `member` is the full record after the change; for `Removed` it is the last
/// known record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberChange {
    pub kind: ChangeKind,
    pub key: MemberKey,
    pub member: Member,
    /// Per-member write counter; starts at 0 on registration.
    pub revision: u64,
}

impl MemberChange {
    pub fn added(key: MemberKey, member: Member, revision: u64) -> Self {
        Self {
            kind: ChangeKind::Added,
            key,
            member,
            revision,
        }
    }

    pub fn changed(key: MemberKey, member: Member, revision: u64) -> Self {
        Self {
            kind: ChangeKind::Changed,
            key,
            member,
            revision,
        }
    }

    pub fn removed(key: MemberKey, member: Member, revision: u64) -> Self {
        Self {
            kind: ChangeKind::Removed,
            key,
            member,
            revision,
        }
    }
}

/// One event list diff.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventChange {
    pub kind: ChangeKind,
    pub event: Event,
}
