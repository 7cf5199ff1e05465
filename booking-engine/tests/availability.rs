//! End-to-end availability engine tests against a real SQLite file
//! Run: cargo test -p booking-engine --test availability

use std::sync::Arc;

use booking_engine::{
    AvailabilityService, ClosureCreate, ClosureKind, ClosureRepository, ClosureScope, DbService,
    DiningTableCreate, DiningTableRepository, EngineConfig, EngineError, MealDefinition, Recurrence,
    ReservationRepository, ReservationRequest, RoomCreate, RoomRepository, SlotStatus, TableStatus,
    VenueSettings, WeekSchedule,
};
use chrono::{NaiveDate, NaiveTime};
use rand::Rng;
use rust_decimal::Decimal;

fn dinner() -> MealDefinition {
    MealDefinition {
        key: "dinner".to_string(),
        label: "Dinner".to_string(),
        schedule: WeekSchedule::parse("fri: 19:00-23:00"),
        slot_interval_min: 15,
        turnover_min: 120,
        buffer_before_min: 15,
        max_parallel: 8,
        capacity_override: None,
        price: Some(Decimal::new(2500, 2)),
        is_default: true,
    }
}

fn friday() -> NaiveDate {
    // 2026-09-04 is a Friday
    NaiveDate::from_ymd_opt(2026, 9, 4).unwrap()
}

fn at(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn request(time: NaiveTime, party_size: u32) -> ReservationRequest {
    ReservationRequest {
        date: friday(),
        time,
        party_size,
        meal_key: "dinner".to_string(),
        customer_ref: "customer:1".to_string(),
    }
}

async fn setup(use_tables: bool) -> (AvailabilityService, DbService, tempfile::TempDir) {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("engine.db");
    let db = DbService::new(db_path.to_str().unwrap()).await.unwrap();
    let config = EngineConfig::new(
        VenueSettings {
            use_tables,
            default_parallel: 10,
            low_availability_threshold: None,
        },
        vec![dinner()],
    )
    .unwrap();
    let service = AvailabilityService::new(db.clone(), Arc::new(config));
    (service, db, tmp)
}

async fn seed_room(db: &DbService, name: &str) -> i64 {
    RoomRepository::new(db.pool.clone())
        .create(RoomCreate {
            name: name.to_string(),
            capacity: None,
            sort_order: None,
        })
        .await
        .unwrap()
        .id
}

async fn seed_table(db: &DbService, room_id: i64, code: &str, max: i64) -> i64 {
    DiningTableRepository::new(db.pool.clone())
        .create(DiningTableCreate {
            room_id,
            code: code.to_string(),
            min_covers: 1,
            standard_covers: 4.min(max),
            max_covers: Some(max),
            join_group: None,
        })
        .await
        .unwrap()
        .id
}

/// One room with two 4-cover tables
async fn seed_two_tables(db: &DbService) -> (i64, Vec<i64>) {
    let room = seed_room(db, "Main Hall").await;
    let t1 = seed_table(db, room, "T1", 4).await;
    let t2 = seed_table(db, room, "T2", 4).await;
    (room, vec![t1, t2])
}

#[tokio::test]
async fn dinner_day_yields_sixteen_open_slots() {
    let (service, db, _tmp) = setup(true).await;
    let (_room, table_ids) = seed_two_tables(&db).await;

    let slots = service.query_slots(friday(), 2, "dinner").await.unwrap();
    assert_eq!(slots.len(), 16);
    assert_eq!(slots[0].time, at(19, 0));
    assert_eq!(slots[15].time, at(22, 45));
    for slot in &slots {
        assert_eq!(slot.status, SlotStatus::Open);
        assert_eq!(slot.remaining_capacity, 8);
        assert_eq!(slot.price, Some(Decimal::new(2500, 2)));
        // Lowest-id table wins the tie between two identical tables
        assert_eq!(slot.suggested_tables, Some(vec![table_ids[0]]));
    }
}

#[tokio::test]
async fn committed_reservation_occupies_buffer_plus_turnover() {
    let (service, db, _tmp) = setup(true).await;
    let (_room, table_ids) = seed_two_tables(&db).await;

    let reservation = service
        .commit_reservation(request(at(19, 30), 4))
        .await
        .unwrap();
    assert_eq!(reservation.table_ids, vec![table_ids[0]]);

    let slots = service.query_slots(friday(), 2, "dinner").await.unwrap();
    assert_eq!(slots.len(), 16);
    for slot in &slots {
        // Occupancy window [19:15, 21:30) touches slot windows starting
        // before 21:30; one 4-cover table always stays free
        assert_ne!(slot.status, SlotStatus::Full);
        if slot.time < at(21, 30) {
            assert_eq!(slot.remaining_capacity, 4, "slot {}", slot.time);
            assert_eq!(slot.suggested_tables, Some(vec![table_ids[1]]));
        } else {
            assert_eq!(slot.remaining_capacity, 8, "slot {}", slot.time);
        }
    }
}

#[tokio::test]
async fn weekday_without_service_yields_empty_list() {
    let (service, db, _tmp) = setup(true).await;
    seed_two_tables(&db).await;

    // 2026-09-07 is a Monday; dinner only runs on Fridays
    let monday = NaiveDate::from_ymd_opt(2026, 9, 7).unwrap();
    let slots = service.query_slots(monday, 2, "dinner").await.unwrap();
    assert!(slots.is_empty());
}

#[tokio::test]
async fn invalid_inputs_are_rejected() {
    let (service, db, _tmp) = setup(true).await;
    seed_two_tables(&db).await;

    assert!(matches!(
        service.query_slots(friday(), 0, "dinner").await,
        Err(EngineError::InvalidInput(_))
    ));
    assert!(matches!(
        service.query_slots(friday(), 2, "brunch").await,
        Err(EngineError::InvalidInput(_))
    ));
    // Commit at a time that is not a slot point
    assert!(matches!(
        service.commit_reservation(request(at(19, 7), 2)).await,
        Err(EngineError::InvalidInput(_))
    ));
    // Empty meal key falls back to the default meal
    assert_eq!(
        service.query_slots(friday(), 2, "").await.unwrap().len(),
        16
    );
}

#[tokio::test]
async fn queries_are_idempotent_without_writes() {
    let (service, db, _tmp) = setup(true).await;
    seed_two_tables(&db).await;
    service
        .commit_reservation(request(at(20, 0), 3))
        .await
        .unwrap();

    let party = rand::thread_rng().gen_range(1..=4);
    let first = service.query_slots(friday(), party, "dinner").await.unwrap();
    let second = service.query_slots(friday(), party, "dinner").await.unwrap();
    assert_eq!(first, second);
}

#[tokio::test]
async fn table_closure_blocks_only_that_table() {
    let (service, db, _tmp) = setup(true).await;
    let (_room, table_ids) = seed_two_tables(&db).await;

    ClosureRepository::new(db.pool.clone())
        .create(ClosureCreate {
            scope: ClosureScope::Table,
            room_id: None,
            table_id: Some(table_ids[0]),
            kind: ClosureKind::Full,
            starts_at: friday().and_hms_opt(0, 0, 0).unwrap(),
            ends_at: friday().and_hms_opt(23, 59, 0).unwrap(),
            recurrence: Recurrence::None,
            capacity_pct: None,
        })
        .await
        .unwrap();

    let slots = service.query_slots(friday(), 2, "dinner").await.unwrap();
    for slot in &slots {
        assert_eq!(slot.remaining_capacity, 4);
        assert_eq!(slot.suggested_tables, Some(vec![table_ids[1]]));
    }
}

#[tokio::test]
async fn room_reduction_leaves_sibling_rooms_untouched() {
    let (service, db, _tmp) = setup(true).await;
    let room_a = seed_room(&db, "Hall A").await;
    let room_b = seed_room(&db, "Hall B").await;
    seed_table(&db, room_a, "A1", 4).await;
    seed_table(&db, room_a, "A2", 4).await;
    seed_table(&db, room_b, "B1", 4).await;

    ClosureRepository::new(db.pool.clone())
        .create(ClosureCreate {
            scope: ClosureScope::Room,
            room_id: Some(room_a),
            table_id: None,
            kind: ClosureKind::Reduced,
            starts_at: friday().and_hms_opt(0, 0, 0).unwrap(),
            ends_at: friday().and_hms_opt(23, 59, 0).unwrap(),
            recurrence: Recurrence::Weekly {
                weekday: 4,
                interval_weeks: 1,
            },
            capacity_pct: Some(50),
        })
        .await
        .unwrap();

    // Room A: two tables at floor(4 * 0.5) = 2 each; room B untouched
    let slots = service.query_slots(friday(), 2, "dinner").await.unwrap();
    for slot in &slots {
        assert_eq!(slot.remaining_capacity, 2 + 2 + 4);
    }
}

#[tokio::test]
async fn recurring_venue_closure_closes_every_slot() {
    let (service, db, _tmp) = setup(true).await;
    seed_two_tables(&db).await;

    // Authored a month earlier, recurring every Friday evening
    let origin = NaiveDate::from_ymd_opt(2026, 8, 7).unwrap();
    ClosureRepository::new(db.pool.clone())
        .create(ClosureCreate {
            scope: ClosureScope::Venue,
            room_id: None,
            table_id: None,
            kind: ClosureKind::Full,
            starts_at: origin.and_hms_opt(19, 0, 0).unwrap(),
            ends_at: origin.and_hms_opt(23, 0, 0).unwrap(),
            recurrence: Recurrence::Weekly {
                weekday: 4,
                interval_weeks: 1,
            },
            capacity_pct: None,
        })
        .await
        .unwrap();

    let slots = service.query_slots(friday(), 2, "dinner").await.unwrap();
    assert_eq!(slots.len(), 16);
    for slot in &slots {
        assert_eq!(slot.status, SlotStatus::Closed);
        assert_eq!(slot.remaining_capacity, 0);
    }

    // The commit path re-reads closures and refuses too
    assert!(matches!(
        service.commit_reservation(request(at(20, 0), 2)).await,
        Err(EngineError::Conflict(_))
    ));
}

#[tokio::test]
async fn flat_mode_books_against_parallel_limit() {
    let (service, _db, _tmp) = setup(false).await;

    let slots = service.query_slots(friday(), 2, "dinner").await.unwrap();
    assert_eq!(slots.len(), 16);
    assert!(slots.iter().all(|s| s.remaining_capacity == 8));
    assert!(slots.iter().all(|s| s.suggested_tables.is_none()));

    let reservation = service
        .commit_reservation(request(at(20, 0), 7))
        .await
        .unwrap();
    assert!(reservation.table_ids.is_empty());

    let slots = service.query_slots(friday(), 1, "dinner").await.unwrap();
    let touched = slots.iter().find(|s| s.time == at(20, 0)).unwrap();
    // One cover left, below the flat-mode threshold
    assert_eq!(touched.remaining_capacity, 1);
    assert_eq!(touched.status, SlotStatus::Limited);
    let late = slots.iter().find(|s| s.time == at(22, 15)).unwrap();
    assert_eq!(late.remaining_capacity, 8);
    assert_eq!(late.status, SlotStatus::Open);
}

#[tokio::test]
async fn full_slot_rejects_followup_commit() {
    let (service, db, _tmp) = setup(true).await;
    let room = seed_room(&db, "Main Hall").await;
    seed_table(&db, room, "T1", 2).await;

    service
        .commit_reservation(request(at(20, 0), 2))
        .await
        .unwrap();
    let err = service
        .commit_reservation(request(at(20, 0), 2))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Conflict(_)));

    let slots = service.query_slots(friday(), 2, "dinner").await.unwrap();
    let slot = slots.iter().find(|s| s.time == at(20, 0)).unwrap();
    assert_eq!(slot.status, SlotStatus::Full);
    assert_eq!(slot.remaining_capacity, 0);
}

#[tokio::test]
async fn out_of_service_table_is_excluded_everywhere() {
    let (service, db, _tmp) = setup(true).await;
    let (room, table_ids) = seed_two_tables(&db).await;

    let tables = DiningTableRepository::new(db.pool.clone());
    assert!(
        tables
            .set_status(table_ids[0], TableStatus::OutOfService)
            .await
            .unwrap()
    );
    // The row stays listed in its room, it just takes no bookings
    assert_eq!(tables.find_by_room(room).await.unwrap().len(), 2);

    let slots = service.query_slots(friday(), 2, "dinner").await.unwrap();
    for slot in &slots {
        assert_eq!(slot.remaining_capacity, 4);
        assert_eq!(slot.suggested_tables, Some(vec![table_ids[1]]));
    }
}

#[tokio::test]
async fn deactivated_room_drops_out_of_inventory() {
    let (service, db, _tmp) = setup(true).await;
    let room_a = seed_room(&db, "Hall A").await;
    let room_b = seed_room(&db, "Hall B").await;
    let a1 = seed_table(&db, room_a, "A1", 4).await;
    seed_table(&db, room_b, "B1", 4).await;

    let rooms = RoomRepository::new(db.pool.clone());
    assert!(rooms.deactivate(room_b).await.unwrap());
    assert!(!rooms.find_by_id(room_b).await.unwrap().unwrap().is_active);

    let slots = service.query_slots(friday(), 2, "dinner").await.unwrap();
    for slot in &slots {
        assert_eq!(slot.remaining_capacity, 4);
        assert_eq!(slot.suggested_tables, Some(vec![a1]));
    }
}

#[tokio::test]
async fn deactivated_closure_stops_applying() {
    let (service, db, _tmp) = setup(true).await;
    seed_two_tables(&db).await;

    let closures = ClosureRepository::new(db.pool.clone());
    let closure = closures
        .create(ClosureCreate {
            scope: ClosureScope::Venue,
            room_id: None,
            table_id: None,
            kind: ClosureKind::Full,
            starts_at: friday().and_hms_opt(0, 0, 0).unwrap(),
            ends_at: friday().and_hms_opt(23, 59, 0).unwrap(),
            recurrence: Recurrence::None,
            capacity_pct: None,
        })
        .await
        .unwrap();

    let slots = service.query_slots(friday(), 2, "dinner").await.unwrap();
    assert!(slots.iter().all(|s| s.status == SlotStatus::Closed));

    assert!(closures.deactivate(closure.id).await.unwrap());
    let slots = service.query_slots(friday(), 2, "dinner").await.unwrap();
    assert!(slots.iter().all(|s| s.status == SlotStatus::Open));
}

#[tokio::test]
async fn committed_reservation_is_readable_by_id() {
    let (service, db, _tmp) = setup(true).await;
    let (_room, table_ids) = seed_two_tables(&db).await;

    let committed = service
        .commit_reservation(request(at(19, 30), 4))
        .await
        .unwrap();
    let fetched = ReservationRepository::new(db.pool.clone())
        .find_by_id(committed.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(fetched.time, at(19, 30));
    assert_eq!(fetched.party_size, 4);
    assert_eq!(fetched.table_ids, vec![table_ids[0]]);
}

#[tokio::test]
async fn rejected_commits_leave_pooled_connections_clean() {
    let (service, db, _tmp) = setup(true).await;
    let room = seed_room(&db, "Main Hall").await;
    seed_table(&db, room, "T1", 2).await;

    service
        .commit_reservation(request(at(20, 0), 2))
        .await
        .unwrap();

    // More rejected commits than the pool holds connections; every rollback
    // has to leave its connection reusable for the next transaction
    for _ in 0..8 {
        let err = service
            .commit_reservation(request(at(20, 0), 2))
            .await
            .unwrap_err();
        assert!(matches!(err, EngineError::Conflict(_)));
    }

    // A slot outside the occupancy window still books normally
    service
        .commit_reservation(request(at(22, 30), 2))
        .await
        .unwrap();
}

#[tokio::test]
async fn abandoned_commit_releases_the_write_lock() {
    let (service, db, _tmp) = setup(true).await;
    seed_two_tables(&db).await;

    // Drop a commit future mid-flight; however far it got, no open
    // transaction may stay behind on the pooled connection
    let cancelled = tokio::time::timeout(
        std::time::Duration::from_micros(1),
        service.commit_reservation(request(at(19, 30), 2)),
    )
    .await;
    drop(cancelled);

    service
        .commit_reservation(request(at(20, 0), 2))
        .await
        .unwrap();
    let slots = service.query_slots(friday(), 2, "dinner").await.unwrap();
    assert_eq!(slots.len(), 16);
}

#[tokio::test]
async fn concurrent_commits_admit_exactly_one_party() {
    let (service, db, _tmp) = setup(true).await;
    let room = seed_room(&db, "Main Hall").await;
    seed_table(&db, room, "T1", 2).await;

    let a = service.clone();
    let b = service.clone();
    let (first, second) = tokio::join!(
        a.commit_reservation(request(at(20, 0), 2)),
        b.commit_reservation(request(at(20, 0), 2)),
    );

    let outcomes = [first, second];
    let won = outcomes.iter().filter(|r| r.is_ok()).count();
    assert_eq!(won, 1, "exactly one concurrent commit must win");
    let lost = outcomes
        .iter()
        .filter(|r| matches!(r, Err(EngineError::Conflict(_))))
        .count();
    assert_eq!(lost, 1, "the loser must see a conflict, not a storage error");
}
