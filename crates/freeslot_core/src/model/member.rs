//! Member record owned by exactly one event.
//!
//! # Invariants
//! - `name` is already normalized (trimmed, single-spaced).
//! - `student_id` is 8 ASCII digits, unique within the owning event.
//! - The member key is `"<name>|<student_id>|<dob>"` and never changes.

use crate::model::slots::SlotGrid;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

const KEY_SEPARATOR: char = '|';

/// Deterministic composite key of one member within its event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MemberKey(String);

impl MemberKey {
    /// Derives the key from normalized member fields.
    pub fn derive(name: &str, student_id: &str, dob: &str) -> Self {
        Self(format!(
            "{name}{KEY_SEPARATOR}{student_id}{KEY_SEPARATOR}{dob}"
        ))
    }

    /// Wraps a key received from storage or a caller.
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for MemberKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registered participant and their hourly availability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub name: String,
    pub student_id: String,
    /// Date of birth in `YYYY-MM-DD` form.
    pub dob: String,
    pub slots: SlotGrid,
}

impl Member {
    /// Creates a member with every slot unavailable.
    pub fn new(
        name: impl Into<String>,
        student_id: impl Into<String>,
        dob: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            student_id: student_id.into(),
            dob: dob.into(),
            slots: SlotGrid::empty(),
        }
    }

    pub fn key(&self) -> MemberKey {
        MemberKey::derive(&self.name, &self.student_id, &self.dob)
    }

    /// Last whitespace-separated name token, used as a column header.
    pub fn short_name(&self) -> &str {
        self.name.split_whitespace().last().unwrap_or_default()
    }

    /// Student id with the middle digits hidden, e.g. `12xxx678`.
    pub fn masked_student_id(&self) -> String {
        let chars: Vec<char> = self.student_id.chars().collect();
        if chars.len() <= 5 {
            return "x".repeat(chars.len());
        }
        let head: String = chars[..2].iter().collect();
        let tail: String = chars[chars.len() - 3..].iter().collect();
        format!("{head}xxx{tail}")
    }
}
