use hohm_core::db::open_db_in_memory;
use hohm_core::{
    DraftError, HouseholdDraft, HouseholdRepository, HouseholdService, HouseholdServiceError,
    Rating, SqliteHouseholdRepository,
};

#[test]
fn create_household_returns_persisted_record() {
    let conn = open_db_in_memory().unwrap();
    let service = HouseholdService::new(SqliteHouseholdRepository::new(&conn));

    let household = service.create_household(Some("Maple St")).unwrap();
    assert!(household.id > 0);
    assert_eq!(household.name, "Maple St");

    let loaded = service.get_household(household.id).unwrap();
    assert_eq!(loaded, household);

    let json = serde_json::to_value(&household).unwrap();
    assert_eq!(json["name"], "Maple St");
    assert!(json["createdAt"].is_string());
}

#[test]
fn create_household_without_name_writes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteHouseholdRepository::new(&conn);
    let service = HouseholdService::new(SqliteHouseholdRepository::new(&conn));

    for name in [None, Some(""), Some("   ")] {
        let err = service.create_household(name).unwrap_err();
        assert!(matches!(err, HouseholdServiceError::NameRequired));
        assert_eq!(err.to_string(), "Name is required");
    }
    assert_eq!(repo.count_households().unwrap(), 0);
}

#[test]
fn get_missing_household_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = HouseholdService::new(SqliteHouseholdRepository::new(&conn));
    assert!(matches!(
        service.get_household(42).unwrap_err(),
        HouseholdServiceError::NotFound(42)
    ));
}

#[test]
fn commit_draft_round_trips_roster() {
    let conn = open_db_in_memory().unwrap();
    let service = HouseholdService::new(SqliteHouseholdRepository::new(&conn));
    let household = service.create_household(Some("Maple St")).unwrap();

    let mut draft = HouseholdDraft::new();
    draft.add_member("Ava", "a@x.com").unwrap();
    draft.add_member("Ben", "b@x.com").unwrap();
    draft.add_task("Dishes", "2024-06-01", "18:00", "Ava").unwrap();
    draft.add_task("Trash", "2024-06-02", "07:30", "Ben").unwrap();
    draft.tasks[0].completed = true;
    draft.tasks[0].rating = Some(Rating::new(4).unwrap());
    draft.tasks[0].comments = vec!["first".to_string(), "second".to_string()];

    let summary = service.commit_draft(household.id, &draft).unwrap();
    assert_eq!(summary.members, 2);
    assert_eq!(summary.tasks, 2);

    let loaded = service.load_draft(household.id).unwrap();
    assert_eq!(loaded, draft);
}

#[test]
fn recommit_replaces_previous_roster() {
    let conn = open_db_in_memory().unwrap();
    let service = HouseholdService::new(SqliteHouseholdRepository::new(&conn));
    let household = service.create_household(Some("Maple St")).unwrap();

    let mut draft = HouseholdDraft::new();
    draft.add_member("Ava", "a@x.com").unwrap();
    draft.add_task("Dishes", "2024-06-01", "18:00", "Ava").unwrap();
    service.commit_draft(household.id, &draft).unwrap();

    draft.tasks.clear();
    draft.add_task("Vacuum", "2024-06-03", "11:00", "Ava").unwrap();
    service.commit_draft(household.id, &draft).unwrap();

    let loaded = service.load_draft(household.id).unwrap();
    assert_eq!(loaded.tasks.len(), 1);
    assert_eq!(loaded.tasks[0].title, "Vacuum");
}

#[test]
fn commit_to_unknown_household_is_not_found() {
    let conn = open_db_in_memory().unwrap();
    let service = HouseholdService::new(SqliteHouseholdRepository::new(&conn));
    let mut draft = HouseholdDraft::new();
    draft.add_member("Ava", "a@x.com").unwrap();

    assert!(matches!(
        service.commit_draft(7, &draft).unwrap_err(),
        HouseholdServiceError::NotFound(7)
    ));
}

#[test]
fn invalid_draft_is_rejected_before_writing() {
    let conn = open_db_in_memory().unwrap();
    let service = HouseholdService::new(SqliteHouseholdRepository::new(&conn));
    let household = service.create_household(Some("Maple St")).unwrap();

    let mut draft = HouseholdDraft::new();
    draft.add_member("Ava", "a@x.com").unwrap();
    draft.add_task("Dishes", "2024-06-01", "18:00", "Ava").unwrap();
    service.commit_draft(household.id, &draft).unwrap();

    let mut broken = draft.clone();
    broken.tasks[0].assigned_to = "Nobody".to_string();
    assert!(matches!(
        service.commit_draft(household.id, &broken).unwrap_err(),
        HouseholdServiceError::InvalidDraft(_)
    ));

    let loaded = service.load_draft(household.id).unwrap();
    assert_eq!(loaded, draft);
}

#[test]
fn draft_with_repeated_task_id_is_invalid_not_a_storage_failure() {
    let conn = open_db_in_memory().unwrap();
    let service = HouseholdService::new(SqliteHouseholdRepository::new(&conn));
    let household = service.create_household(Some("Maple St")).unwrap();

    let id = "8f14e45f-ceea-4e6a-9f6b-2d1c7a3b5e90";
    let json = format!(
        r##"{{
            "members": [{{"name":"Ava","email":"a@x.com","color":"#12ab34"}}],
            "tasks": [
                {{"id":"{id}","title":"Dishes","date":"2024-06-01","time":"18:00","assignedTo":"Ava"}},
                {{"id":"{id}","title":"Trash","date":"2024-06-02","time":"07:30","assignedTo":"Ava"}}
            ]
        }}"##
    );
    let draft: HouseholdDraft = serde_json::from_str(&json).unwrap();

    let err = service.commit_draft(household.id, &draft).unwrap_err();
    assert!(matches!(
        err,
        HouseholdServiceError::InvalidDraft(DraftError::DuplicateTaskId(_))
    ));
    assert!(service.load_draft(household.id).unwrap().tasks.is_empty());
}
