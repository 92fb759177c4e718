//! Member repository contracts and SQLite implementation.
//!
//! # Invariants
//! - A member row and its 24 slot rows are written in one transaction.
//! - `(event_id, student_id)` is unique; a conflicting insert fails as a
//!   whole and maps to `RepoError::DuplicateStudentId` (first writer wins).
//! - A toggle flips one `member_slots` row and bumps the member revision in
//!   the same transaction; other hours are never rewritten.

use crate::db::is_uniqueness_violation;
use crate::model::event::EventId;
use crate::model::member::{Member, MemberKey};
use crate::model::slots::{SlotGrid, HOURS_PER_DAY};
use crate::repo::{RepoError, RepoResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::BTreeMap;

/// Member as persisted, with its key and write revision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMember {
    pub key: MemberKey,
    pub member: Member,
    pub revision: u64,
}

/// Repository interface for per-event member records.
pub trait MemberRepository {
    fn event_exists(&self, event_id: EventId) -> RepoResult<bool>;
    /// Inserts `member` under its derived key, failing if the student id is taken.
    fn insert_member(&self, event_id: EventId, member: &Member) -> RepoResult<StoredMember>;
    fn get_member(&self, event_id: EventId, key: &MemberKey) -> RepoResult<Option<StoredMember>>;
    /// Members of one event ordered by key.
    fn list_members(&self, event_id: EventId) -> RepoResult<Vec<StoredMember>>;
    fn find_by_student_id(&self, event_id: EventId, student_id: &str)
        -> RepoResult<Option<MemberKey>>;
    /// Flips one hour and returns the member after the write.
    fn toggle_slot(
        &self,
        event_id: EventId,
        key: &MemberKey,
        hour: usize,
    ) -> RepoResult<StoredMember>;
}

/// SQLite-backed member repository.
pub struct SqliteMemberRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMemberRepository<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl MemberRepository for SqliteMemberRepository<'_> {
    fn event_exists(&self, event_id: EventId) -> RepoResult<bool> {
        event_exists(self.conn, event_id)
    }

    fn insert_member(&self, event_id: EventId, member: &Member) -> RepoResult<StoredMember> {
        let key = member.key();
        let tx = self.conn.unchecked_transaction()?;

        if !event_exists(&tx, event_id)? {
            return Err(RepoError::EventNotFound(event_id));
        }

        tx.execute(
            "INSERT INTO members (event_id, member_key, name, student_id, dob, revision)
             VALUES (?1, ?2, ?3, ?4, ?5, 0);",
            params![
                event_id.to_string(),
                key.as_str(),
                member.name.as_str(),
                member.student_id.as_str(),
                member.dob.as_str(),
            ],
        )
        .map_err(|err| {
            if is_uniqueness_violation(&err) {
                RepoError::DuplicateStudentId(member.student_id.clone())
            } else {
                err.into()
            }
        })?;

        {
            let mut stmt = tx.prepare(
                "INSERT INTO member_slots (event_id, member_key, hour, available)
                 VALUES (?1, ?2, ?3, ?4);",
            )?;
            for (hour, available) in member.slots.iter().enumerate() {
                stmt.execute(params![
                    event_id.to_string(),
                    key.as_str(),
                    hour as i64,
                    bool_to_int(available),
                ])?;
            }
        }
        tx.commit()?;

        Ok(StoredMember {
            key,
            member: member.clone(),
            revision: 0,
        })
    }

    fn get_member(&self, event_id: EventId, key: &MemberKey) -> RepoResult<Option<StoredMember>> {
        load_member(self.conn, event_id, key)
    }

    fn list_members(&self, event_id: EventId) -> RepoResult<Vec<StoredMember>> {
        load_members(self.conn, event_id)
    }

    fn find_by_student_id(
        &self,
        event_id: EventId,
        student_id: &str,
    ) -> RepoResult<Option<MemberKey>> {
        let key = self
            .conn
            .query_row(
                "SELECT member_key FROM members WHERE event_id = ?1 AND student_id = ?2;",
                params![event_id.to_string(), student_id],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(key.map(MemberKey::from_raw))
    }

    fn toggle_slot(
        &self,
        event_id: EventId,
        key: &MemberKey,
        hour: usize,
    ) -> RepoResult<StoredMember> {
        let tx = self.conn.unchecked_transaction()?;

        let changed = tx.execute(
            "UPDATE member_slots
             SET available = 1 - available
             WHERE event_id = ?1 AND member_key = ?2 AND hour = ?3;",
            params![event_id.to_string(), key.as_str(), hour as i64],
        )?;
        if changed == 0 {
            if !event_exists(&tx, event_id)? {
                return Err(RepoError::EventNotFound(event_id));
            }
            return Err(RepoError::MemberNotFound(key.clone()));
        }

        tx.execute(
            "UPDATE members SET revision = revision + 1
             WHERE event_id = ?1 AND member_key = ?2;",
            params![event_id.to_string(), key.as_str()],
        )?;

        let stored = load_member(&tx, event_id, key)?
            .ok_or_else(|| RepoError::MemberNotFound(key.clone()))?;
        tx.commit()?;
        Ok(stored)
    }
}

pub(crate) fn event_exists(conn: &Connection, event_id: EventId) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM events WHERE id = ?1);",
        [event_id.to_string()],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

pub(crate) fn load_member(
    conn: &Connection,
    event_id: EventId,
    key: &MemberKey,
) -> RepoResult<Option<StoredMember>> {
    let row = conn
        .query_row(
            "SELECT name, student_id, dob, revision
             FROM members
             WHERE event_id = ?1 AND member_key = ?2;",
            params![event_id.to_string(), key.as_str()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            },
        )
        .optional()?;

    let Some((name, student_id, dob, revision)) = row else {
        return Ok(None);
    };

    let mut stmt = conn.prepare(
        "SELECT hour, available
         FROM member_slots
         WHERE event_id = ?1 AND member_key = ?2
         ORDER BY hour;",
    )?;
    let mut rows = stmt.query(params![event_id.to_string(), key.as_str()])?;
    let mut builder = GridBuilder::default();
    while let Some(row) = rows.next()? {
        builder.push(key, row.get(0)?, row.get(1)?)?;
    }

    Ok(Some(StoredMember {
        key: key.clone(),
        member: Member {
            name,
            student_id,
            dob,
            slots: builder.finish(key)?,
        },
        revision: parse_revision(revision)?,
    }))
}

pub(crate) fn load_members(conn: &Connection, event_id: EventId) -> RepoResult<Vec<StoredMember>> {
    let mut grids: BTreeMap<String, GridBuilder> = BTreeMap::new();
    {
        let mut stmt = conn.prepare(
            "SELECT member_key, hour, available
             FROM member_slots
             WHERE event_id = ?1
             ORDER BY member_key, hour;",
        )?;
        let mut rows = stmt.query([event_id.to_string()])?;
        while let Some(row) = rows.next()? {
            let key_text: String = row.get(0)?;
            let key = MemberKey::from_raw(key_text.clone());
            grids
                .entry(key_text)
                .or_default()
                .push(&key, row.get(1)?, row.get(2)?)?;
        }
    }

    let mut stmt = conn.prepare(
        "SELECT member_key, name, student_id, dob, revision
         FROM members
         WHERE event_id = ?1
         ORDER BY member_key;",
    )?;
    let mut rows = stmt.query([event_id.to_string()])?;
    let mut members = Vec::new();
    while let Some(row) = rows.next()? {
        let key_text: String = row.get(0)?;
        let key = MemberKey::from_raw(key_text.as_str());
        let slots = grids.remove(&key_text).unwrap_or_default().finish(&key)?;
        members.push(StoredMember {
            member: Member {
                name: row.get(1)?,
                student_id: row.get(2)?,
                dob: row.get(3)?,
                slots,
            },
            revision: parse_revision(row.get(4)?)?,
            key,
        });
    }

    Ok(members)
}

/// Assembles a grid from slot rows, requiring every hour exactly once.
#[derive(Default)]
struct GridBuilder {
    grid: SlotGrid,
    seen: [bool; HOURS_PER_DAY],
}

impl GridBuilder {
    fn push(&mut self, key: &MemberKey, hour: i64, available: i64) -> RepoResult<()> {
        let index = usize::try_from(hour)
            .ok()
            .filter(|index| *index < HOURS_PER_DAY)
            .ok_or_else(|| {
                RepoError::InvalidData(format!("invalid hour `{hour}` for member `{key}`"))
            })?;
        let available = match available {
            0 => false,
            1 => true,
            other => {
                return Err(RepoError::InvalidData(format!(
                    "invalid available value `{other}` in member_slots.available"
                )));
            }
        };
        if self.seen[index] {
            return Err(RepoError::InvalidData(format!(
                "duplicate hour `{hour}` for member `{key}`"
            )));
        }
        self.seen[index] = true;
        self.grid
            .set(index, available)
            .map_err(|err| RepoError::InvalidData(err.to_string()))
    }

    fn finish(self, key: &MemberKey) -> RepoResult<SlotGrid> {
        let present = self.seen.iter().filter(|seen| **seen).count();
        if present != HOURS_PER_DAY {
            return Err(RepoError::InvalidData(format!(
                "member `{key}` has {present} slot rows, expected {HOURS_PER_DAY}"
            )));
        }
        Ok(self.grid)
    }
}

fn parse_revision(value: i64) -> RepoResult<u64> {
    u64::try_from(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid revision `{value}` in members")))
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
