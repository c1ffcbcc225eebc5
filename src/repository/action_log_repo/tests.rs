use super::ActionLogRepository;
use crate::domain::action_log::{ActionLog, ActionType};
use chrono::Duration;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};

fn setup_test_db() -> Arc<Mutex<Connection>> {
    let conn = Connection::open_in_memory().unwrap();
    crate::db::configure_sqlite_connection(&conn).unwrap();
    crate::db::ensure_schema(&conn).unwrap();
    Arc::new(Mutex::new(conn))
}

fn make_test_log(action_type: ActionType, target: &str, minutes: i64) -> ActionLog {
    let mut log = ActionLog::new(action_type, Some("clerk-a"), target)
        .with_payload(serde_json::json!({ "supplier_id": "S1" }))
        .with_detail("test log");
    log.action_ts = crate::db::now_timestamp() + Duration::minutes(minutes);
    log
}

#[test]
fn test_insert_and_find_by_id() {
    let repo = ActionLogRepository::new(setup_test_db());

    let log = make_test_log(ActionType::CreateCounting, "c1", 0);
    let id = repo.insert(&log).unwrap();
    assert_eq!(id, log.action_id);

    let found = repo.find_by_id(&id).unwrap().unwrap();
    assert_eq!(found, log);
    assert!(repo.find_by_id("missing").unwrap().is_none());
}

#[test]
fn test_find_by_target_newest_first() {
    let repo = ActionLogRepository::new(setup_test_db());

    repo.insert(&make_test_log(ActionType::CreateCounting, "c1", 0)).unwrap();
    repo.insert(&make_test_log(ActionType::ReconcileRejection, "c1", 5)).unwrap();
    repo.insert(&make_test_log(ActionType::CreateCounting, "c2", 1)).unwrap();

    let logs = repo.find_by_target("c1").unwrap();
    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].action_type_enum(), Some(ActionType::ReconcileRejection));
    assert_eq!(logs[1].action_type_enum(), Some(ActionType::CreateCounting));
}

#[test]
fn test_find_recent() {
    let repo = ActionLogRepository::new(setup_test_db());

    for i in 0..5 {
        repo.insert(&make_test_log(ActionType::DeleteCounting, &format!("c{}", i), i))
            .unwrap();
    }

    let logs = repo.find_recent(3).unwrap();
    assert_eq!(logs.len(), 3);
    assert_eq!(logs[0].target_id.as_deref(), Some("c4"));
}
