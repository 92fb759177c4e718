//! Client-side live member state.
//!
//! # Invariants
//! - State changes only through `apply`.
//! - A notification older than the revision already seen for its key
//!   (including a removal) is ignored, so a snapshot read before a later
//!   write cannot roll the view back.

use crate::availability::{common_intervals, AvailabilitySummary, HourInterval};
use crate::model::member::{Member, MemberKey};
use crate::sync::change::{ChangeKind, MemberChange};
use crate::sync::channel::Subscription;
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
struct Entry {
    member: Member,
    revision: u64,
}

/// Member map for one event, fed by a change subscription.
#[derive(Debug, Default, Clone)]
pub struct LiveMemberView {
    members: BTreeMap<MemberKey, Entry>,
    removed: BTreeMap<MemberKey, u64>,
}

impl LiveMemberView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one diff. Returns whether visible state changed.
    pub fn apply(&mut self, change: MemberChange) -> bool {
        let MemberChange {
            kind,
            key,
            member,
            revision,
        } = change;

        if self
            .removed
            .get(&key)
            .is_some_and(|removed_at| revision <= *removed_at)
        {
            return false;
        }

        match kind {
            ChangeKind::Added | ChangeKind::Changed => {
                if let Some(existing) = self.members.get(&key) {
                    if revision < existing.revision
                        || (revision == existing.revision && existing.member == member)
                    {
                        return false;
                    }
                }
                self.members.insert(key, Entry { member, revision });
                true
            }
            ChangeKind::Removed => {
                self.removed.insert(key.clone(), revision);
                self.members.remove(&key).is_some()
            }
        }
    }

    /// Applies every notification already queued on `subscription`.
    ///
    /// Returns the number of notifications that changed visible state.
    pub fn apply_pending(&mut self, subscription: &Subscription<MemberChange>) -> usize {
        subscription
            .drain()
            .into_iter()
            .map(|change| self.apply(change))
            .filter(|changed| *changed)
            .count()
    }

    pub fn get(&self, key: &MemberKey) -> Option<&Member> {
        self.members.get(key).map(|entry| &entry.member)
    }

    /// Members ordered by key.
    pub fn members(&self) -> impl Iterator<Item = (&MemberKey, &Member)> {
        self.members.iter().map(|(key, entry)| (key, &entry.member))
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    pub fn common_intervals(&self) -> Vec<HourInterval> {
        common_intervals(self.members.values().map(|entry| &entry.member.slots))
    }

    pub fn summary(&self) -> AvailabilitySummary {
        AvailabilitySummary::from_grids(self.members.values().map(|entry| &entry.member.slots))
    }
}

#[cfg(test)]
mod tests {
    use super::LiveMemberView;
    use crate::availability::{AvailabilitySummary, HourInterval};
    use crate::model::member::Member;
    use crate::sync::change::MemberChange;

    fn member(name: &str, student_id: &str, hours: &[usize]) -> Member {
        let mut member = Member::new(name, student_id, "2000-01-01");
        for hour in hours {
            member.slots.set(*hour, true).expect("hour in range");
        }
        member
    }

    #[test]
    fn applies_added_changed_and_removed() {
        let mut view = LiveMemberView::new();
        let an = member("An Nguyen", "11111111", &[1, 2]);
        let key = an.key();

        assert!(view.apply(MemberChange::added(key.clone(), an.clone(), 0)));
        assert_eq!(view.len(), 1);

        let updated = member("An Nguyen", "11111111", &[1]);
        assert!(view.apply(MemberChange::changed(key.clone(), updated.clone(), 1)));
        assert_eq!(view.get(&key), Some(&updated));

        assert!(view.apply(MemberChange::removed(key.clone(), updated, 1)));
        assert!(view.is_empty());
        assert_eq!(view.summary(), AvailabilitySummary::NoMembers);
    }

    #[test]
    fn ignores_stale_revisions() {
        let mut view = LiveMemberView::new();
        let fresh = member("An Nguyen", "11111111", &[5]);
        let key = fresh.key();
        let stale = member("An Nguyen", "11111111", &[]);

        assert!(view.apply(MemberChange::changed(key.clone(), fresh.clone(), 3)));
        assert!(!view.apply(MemberChange::added(key.clone(), stale, 2)));
        assert_eq!(view.get(&key), Some(&fresh));

        assert!(!view.apply(MemberChange::changed(key.clone(), fresh, 3)));
    }

    #[test]
    fn removal_is_not_undone_by_older_snapshot_entries() {
        let mut view = LiveMemberView::new();
        let an = member("An Nguyen", "11111111", &[]);
        let key = an.key();

        assert!(!view.apply(MemberChange::removed(key.clone(), an.clone(), 4)));
        assert!(!view.apply(MemberChange::added(key, an, 4)));
        assert!(view.is_empty());
    }

    #[test]
    fn recomputes_common_intervals_from_current_state() {
        let mut view = LiveMemberView::new();
        let an = member("An Nguyen", "11111111", &[8, 9, 10]);
        let binh = member("Binh Tran", "22222222", &[9, 10, 11]);
        view.apply(MemberChange::added(an.key(), an, 0));
        view.apply(MemberChange::added(binh.key(), binh, 0));

        assert_eq!(view.common_intervals(), vec![HourInterval::new(9, 10)]);
    }
}
