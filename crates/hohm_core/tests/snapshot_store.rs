use hohm_core::db::open_db_in_memory;
use hohm_core::{
    DraftError, HouseholdDraft, SnapshotStore, SqliteSnapshotStore, DRAFT_SCHEMA_VERSION,
    MEMBERS_KEY,
};

#[test]
fn set_overwrites_and_get_reads_back() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteSnapshotStore::new(&conn, "default");

    assert_eq!(store.get(MEMBERS_KEY).unwrap(), None);
    store.set(MEMBERS_KEY, "[]".to_string()).unwrap();
    store.set(MEMBERS_KEY, "[1]".to_string()).unwrap();
    assert_eq!(store.get(MEMBERS_KEY).unwrap().as_deref(), Some("[1]"));
}

#[test]
fn sessions_are_isolated() {
    let conn = open_db_in_memory().unwrap();
    let mut first = SqliteSnapshotStore::new(&conn, "first");
    let second = SqliteSnapshotStore::new(&conn, "second");

    first.set(MEMBERS_KEY, "[]".to_string()).unwrap();
    assert_eq!(second.get(MEMBERS_KEY).unwrap(), None);

    assert!(first.clear().unwrap() > 0);
    assert_eq!(first.get(MEMBERS_KEY).unwrap(), None);
}

#[test]
fn draft_survives_reopening_the_database() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("hohm.db");

    let mut draft = HouseholdDraft::new();
    draft.add_member("Ava", "a@x.com").unwrap();
    draft.add_task("Dishes", "2024-06-01", "18:00", "Ava").unwrap();
    {
        let conn = hohm_core::db::open_db(&path).unwrap();
        let mut store = SqliteSnapshotStore::new(&conn, "default");
        draft.save(&mut store).unwrap();
    }

    let conn = hohm_core::db::open_db(&path).unwrap();
    let mut store = SqliteSnapshotStore::new(&conn, "default");
    let loaded = HouseholdDraft::load(&mut store).unwrap().unwrap();
    assert_eq!(loaded, draft);
    assert_eq!(loaded.schema_version, DRAFT_SCHEMA_VERSION);
}

#[test]
fn draft_from_newer_schema_is_refused() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteSnapshotStore::new(&conn, "default");
    store.set("householdDraftVersion", "9".to_string()).unwrap();

    assert!(matches!(
        HouseholdDraft::load(&mut store).unwrap_err(),
        DraftError::UnsupportedSchemaVersion { found: 9, .. }
    ));
}

#[test]
fn legacy_tasks_keep_their_ids_across_loads() {
    let conn = open_db_in_memory().unwrap();
    let mut store = SqliteSnapshotStore::new(&conn, "default");
    store
        .set(
            MEMBERS_KEY,
            r##"[{"name":"Ava","email":"a@x.com","color":"#12ab34"}]"##.to_string(),
        )
        .unwrap();
    store
        .set(
            "householdTasks",
            r#"[{"title":"Dishes","date":"2024-06-01","time":"18:00","assignedTo":"Ava"}]"#
                .to_string(),
        )
        .unwrap();

    let first = HouseholdDraft::load(&mut store).unwrap().unwrap();
    let second = HouseholdDraft::load(&mut SqliteSnapshotStore::new(&conn, "default"))
        .unwrap()
        .unwrap();
    assert_eq!(first.tasks[0].id, second.tasks[0].id);
}
