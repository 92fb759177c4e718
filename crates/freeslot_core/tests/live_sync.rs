use chrono::NaiveDate;
use freeslot_core::db::open_db_in_memory;
use freeslot_core::{
    ChangeKind, Event, EventRepository, FixedClock, HourInterval, InProcessSyncChannel,
    LiveMemberView, MemberChange, MemberRegistry, NewEvent, RegistrationCandidate, RegistryError,
    SqliteEventRepository, SqliteMemberRepository, SyncChannel,
};
use rusqlite::Connection;
use std::sync::Arc;
use uuid::Uuid;

fn seed_event(conn: &Connection) -> Event {
    SqliteEventRepository::new(conn)
        .insert_event(
            Uuid::new_v4(),
            &NewEvent::new("Study group", "", "2026-10-20"),
            1_000,
        )
        .unwrap()
}

fn registry<'conn>(
    conn: &'conn Connection,
    feed: &Arc<InProcessSyncChannel<MemberChange>>,
) -> MemberRegistry<SqliteMemberRepository<'conn>> {
    let clock = FixedClock::new(NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(), 1_000);
    let feed: Arc<dyn SyncChannel<MemberChange>> = feed.clone();
    MemberRegistry::new(SqliteMemberRepository::new(conn), Arc::new(clock), feed)
}

#[test]
fn subscription_starts_with_snapshot_then_diffs() {
    let conn = open_db_in_memory().unwrap();
    let feed = Arc::new(InProcessSyncChannel::new());
    let registry = registry(&conn, &feed);
    let event = seed_event(&conn);

    let an = registry
        .register(
            event.id,
            &RegistrationCandidate::new("An Nguyen", "11111111", "2000-01-01"),
        )
        .unwrap();
    let subscription = registry.subscribe(event.id).unwrap();
    registry.toggle_slot(event.id, &an.key, 4).unwrap();

    let changes = subscription.drain();
    assert_eq!(changes.len(), 2);
    assert_eq!(changes[0].kind, ChangeKind::Added);
    assert_eq!(changes[0].revision, 0);
    assert_eq!(changes[1].kind, ChangeKind::Changed);
    assert_eq!(changes[1].key, an.key);
    assert_eq!(changes[1].member.slots.get(4), Some(true));
}

#[test]
fn subscribers_converge_on_the_same_state() {
    let conn = open_db_in_memory().unwrap();
    let feed = Arc::new(InProcessSyncChannel::new());
    let registry = registry(&conn, &feed);
    let event = seed_event(&conn);

    let early = registry.subscribe(event.id).unwrap();
    let an = registry
        .register(
            event.id,
            &RegistrationCandidate::new("An Nguyen", "11111111", "2000-01-01"),
        )
        .unwrap();
    for hour in [9, 10, 11] {
        registry.toggle_slot(event.id, &an.key, hour).unwrap();
    }
    let late = registry.subscribe(event.id).unwrap();
    let binh = registry
        .register(
            event.id,
            &RegistrationCandidate::new("Binh Tran", "22222222", "1999-12-31"),
        )
        .unwrap();
    for hour in [10, 11, 12] {
        registry.toggle_slot(event.id, &binh.key, hour).unwrap();
    }

    let mut early_view = LiveMemberView::new();
    let mut late_view = LiveMemberView::new();
    early_view.apply_pending(&early);
    late_view.apply_pending(&late);

    assert_eq!(early_view.len(), 2);
    assert_eq!(
        early_view.members().collect::<Vec<_>>(),
        late_view.members().collect::<Vec<_>>()
    );
    assert_eq!(early_view.common_intervals(), vec![HourInterval::new(10, 11)]);
    assert_eq!(late_view.common_intervals(), vec![HourInterval::new(10, 11)]);
}

#[test]
fn dropped_subscription_stops_delivery() {
    let conn = open_db_in_memory().unwrap();
    let feed = Arc::new(InProcessSyncChannel::new());
    let registry = registry(&conn, &feed);
    let event = seed_event(&conn);

    let subscription = registry.subscribe(event.id).unwrap();
    let scope = event.id.to_string();
    assert_eq!(feed.subscriber_count(&scope), 1);
    drop(subscription);

    registry
        .register(
            event.id,
            &RegistrationCandidate::new("An Nguyen", "11111111", "2000-01-01"),
        )
        .unwrap();
    assert_eq!(feed.subscriber_count(&scope), 0);
}

#[test]
fn subscribing_to_unknown_event_fails() {
    let conn = open_db_in_memory().unwrap();
    let feed = Arc::new(InProcessSyncChannel::new());
    let registry = registry(&conn, &feed);

    assert!(matches!(
        registry.subscribe(Uuid::new_v4()),
        Err(RegistryError::EventNotFound(_))
    ));
}

#[test]
fn subscriptions_are_scoped_per_event() {
    let conn = open_db_in_memory().unwrap();
    let feed = Arc::new(InProcessSyncChannel::new());
    let registry = registry(&conn, &feed);
    let watched = seed_event(&conn);
    let other = seed_event(&conn);

    let subscription = registry.subscribe(watched.id).unwrap();
    registry
        .register(
            other.id,
            &RegistrationCandidate::new("An Nguyen", "11111111", "2000-01-01"),
        )
        .unwrap();

    assert!(subscription.try_recv().is_none());
}
