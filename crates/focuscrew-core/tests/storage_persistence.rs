//! File-backed database tests.

use chrono::{Duration, NaiveDate, Utc};
use focuscrew_core::storage::migrations::{get_schema_version, SCHEMA_VERSION};
use focuscrew_core::{Database, FriendshipStatus, Profile, UserId};
use tempfile::TempDir;

#[test]
fn data_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("focuscrew.db");
    let ana = UserId::new("ana");
    let ben = UserId::new("ben");

    {
        let db = Database::open_at(&path).unwrap();
        db.create_profile(&Profile::new(ana.clone(), "Ana").unwrap())
            .unwrap();
        db.create_profile(&Profile::new(ben.clone(), "Ben").unwrap())
            .unwrap();
        db.send_friend_request(&ana, &ben).unwrap();
        let end = Utc::now();
        db.record_session(&ana, "focus", 1_500, end - Duration::seconds(1_500), end)
            .unwrap();
        db.add_streak_day(&ana, NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
            .unwrap();
    }

    let db = Database::open_at(&path).unwrap();
    assert_eq!(get_schema_version(db.conn()), SCHEMA_VERSION);

    let profile = db.profile(&ana).unwrap();
    assert_eq!(profile.total_work_secs, Some(1_500));
    assert!(profile
        .streak_days
        .unwrap()
        .contains(&"2024-05-01".to_string()));

    let pending = db.friendship(&ben, &ana).unwrap().unwrap();
    assert_eq!(pending.status, FriendshipStatus::Pending);
    assert_eq!(db.sessions(&ana, 10).unwrap().len(), 1);
}

#[test]
fn reopening_does_not_rerun_migrations() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("focuscrew.db");
    drop(Database::open_at(&path).unwrap());
    let db = Database::open_at(&path).unwrap();
    assert_eq!(get_schema_version(db.conn()), SCHEMA_VERSION);
}
