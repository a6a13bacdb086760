use rusqlite::Connection;
use studytrack_core::db::open_db_in_memory;
use studytrack_core::{
    Lab, LabInput, LabMutation, LabRecordsManager, LabStatus, LabsViewState, RepoError,
    SqliteLabRepository, SqliteSubjectRepository, SubjectId, SubjectRepository,
};

type Manager<'conn> =
    LabRecordsManager<SqliteLabRepository<'conn>, SqliteSubjectRepository<'conn>>;

fn manager(conn: &Connection) -> Manager<'_> {
    LabRecordsManager::new(
        SqliteLabRepository::new(conn),
        SqliteSubjectRepository::new(conn),
    )
}

fn seeded_subject(conn: &Connection, title: &str) -> SubjectId {
    SqliteSubjectRepository::new(conn)
        .create_subject(title)
        .unwrap()
        .id
}

fn applied(outcome: LabMutation) -> Vec<Lab> {
    outcome.into_labs().expect("mutation should apply")
}

#[test]
fn list_is_empty_for_subject_without_labs() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");
    assert!(manager(&conn).list_labs(subject_id).unwrap().is_empty());
}

#[test]
fn add_trims_input_and_keeps_requested_status() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");
    let manager = manager(&conn);

    let labs = applied(
        manager
            .add_lab(
                subject_id,
                &LabInput::new("  Matrix Algebra  ")
                    .description("")
                    .comment("")
                    .status(LabStatus::InProgress),
            )
            .unwrap(),
    );

    assert_eq!(labs.len(), 1);
    assert_eq!(labs[0].title, "Matrix Algebra");
    assert_eq!(labs[0].status, LabStatus::InProgress);
    assert_eq!(labs[0].subject_id, subject_id);
}

#[test]
fn add_defaults_status_and_trims_description_and_comment() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");

    let labs = applied(
        manager(&conn)
            .add_lab(
                subject_id,
                &LabInput::new("Eigenvalues")
                    .description("  power method ")
                    .comment("\n due friday\t"),
            )
            .unwrap(),
    );

    assert_eq!(labs[0].status, LabStatus::NotStarted);
    assert_eq!(labs[0].description, "power method");
    assert_eq!(labs[0].comment, "due friday");
}

#[test]
fn add_with_blank_title_changes_nothing() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");
    let manager = manager(&conn);
    manager
        .add_lab(subject_id, &LabInput::new("Existing"))
        .unwrap();
    let before = manager.list_labs(subject_id).unwrap();

    for blank in ["", "   ", "\t\n"] {
        let outcome = manager
            .add_lab(subject_id, &LabInput::new(blank).comment("kept?"))
            .unwrap();
        assert_eq!(outcome, LabMutation::Rejected);
    }

    assert_eq!(manager.list_labs(subject_id).unwrap(), before);
}

#[test]
fn update_replaces_fields_and_keeps_identity() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");
    let manager = manager(&conn);
    let original = applied(
        manager
            .add_lab(subject_id, &LabInput::new("Old").comment("first pass"))
            .unwrap(),
    )
    .remove(0);

    let labs = applied(
        manager
            .update_lab(
                &original,
                &LabInput::new(" New Title ")
                    .description(" proofs ")
                    .status(LabStatus::Completed),
            )
            .unwrap(),
    );

    let updated = &labs[0];
    assert_eq!(updated.id, original.id);
    assert_eq!(updated.subject_id, original.subject_id);
    assert_eq!(updated.title, "New Title");
    assert_eq!(updated.description, "proofs");
    assert_eq!(updated.comment, "");
    assert_eq!(updated.status, LabStatus::Completed);
}

#[test]
fn update_with_blank_title_leaves_lab_unchanged() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");
    let manager = manager(&conn);
    let original = applied(manager.add_lab(subject_id, &LabInput::new("Keep me")).unwrap())
        .remove(0);

    let outcome = manager
        .update_lab(
            &original,
            &LabInput::new("  ").status(LabStatus::Completed),
        )
        .unwrap();

    assert!(!outcome.is_applied());
    assert_eq!(manager.list_labs(subject_id).unwrap(), vec![original]);
}

#[test]
fn update_of_deleted_lab_reports_not_found() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");
    let manager = manager(&conn);
    let lab = applied(manager.add_lab(subject_id, &LabInput::new("Gone")).unwrap()).remove(0);
    manager.delete_lab(&lab).unwrap();

    let err = manager
        .update_lab(&lab, &LabInput::new("Still gone"))
        .unwrap_err();
    assert!(matches!(err, RepoError::LabNotFound(id) if id == lab.id));
}

#[test]
fn delete_removes_only_the_target() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");
    let other_subject = seeded_subject(&conn, "Physics");
    let manager = manager(&conn);
    manager.add_lab(subject_id, &LabInput::new("One")).unwrap();
    let labs = applied(manager.add_lab(subject_id, &LabInput::new("Two")).unwrap());
    manager
        .add_lab(other_subject, &LabInput::new("Elsewhere"))
        .unwrap();

    let target = labs[1].clone();
    let remaining = applied(manager.delete_lab(&target).unwrap());

    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].title, "One");
    assert!(manager
        .list_labs(subject_id)
        .unwrap()
        .iter()
        .all(|lab| lab.id != target.id));
    assert_eq!(manager.list_labs(other_subject).unwrap().len(), 1);
}

#[test]
fn view_state_loads_subject_and_labs() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");
    let manager = manager(&conn);
    manager.add_lab(subject_id, &LabInput::new("Loaded")).unwrap();

    let state = LabsViewState::load(&manager, subject_id).unwrap();

    assert_eq!(state.subject.as_ref().map(|s| s.title.as_str()), Some("Algebra"));
    assert_eq!(state.labs.len(), 1);
    assert!(state.add_dialog.is_none());
}

#[test]
fn view_state_add_dialog_closes_only_on_success() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");
    let manager = manager(&conn);
    let mut state = LabsViewState::load(&manager, subject_id).unwrap();

    state.open_add_dialog();
    if let Some(form) = state.add_dialog.as_mut() {
        form.title = "   ".to_string();
        form.comment = "draft".to_string();
    }
    assert!(!state.submit_add(&manager).unwrap());
    assert_eq!(
        state.add_dialog.as_ref().map(|form| form.comment.as_str()),
        Some("draft")
    );
    assert!(state.labs.is_empty());

    if let Some(form) = state.add_dialog.as_mut() {
        form.title = "Determinants".to_string();
        form.status = LabStatus::InProgress;
    }
    assert!(state.submit_add(&manager).unwrap());
    assert!(state.add_dialog.is_none());
    assert_eq!(state.labs.len(), 1);
    assert_eq!(state.labs[0].status, LabStatus::InProgress);

    state.open_add_dialog();
    assert_eq!(state.add_dialog.as_ref().map(|form| form.title.as_str()), Some(""));
}

#[test]
fn view_state_edit_prefills_from_lab_and_applies() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");
    let manager = manager(&conn);
    manager
        .add_lab(
            subject_id,
            &LabInput::new("Rank").status(LabStatus::InProgress),
        )
        .unwrap();
    let mut state = LabsViewState::load(&manager, subject_id).unwrap();
    let lab = state.labs[0].clone();

    state.begin_edit(&lab);
    let session = state.edit_dialog.as_mut().unwrap();
    assert_eq!(session.form.title, "Rank");
    assert_eq!(session.form.status, LabStatus::InProgress);
    session.form.title = "Rank and nullity".to_string();

    assert!(state.submit_edit(&manager).unwrap());
    assert!(state.edit_dialog.is_none());
    assert_eq!(state.labs[0].id, lab.id);
    assert_eq!(state.labs[0].title, "Rank and nullity");
    assert_eq!(state.labs[0].status, LabStatus::InProgress);
}

#[test]
fn view_state_delete_requires_confirmation() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");
    let manager = manager(&conn);
    manager.add_lab(subject_id, &LabInput::new("Doomed")).unwrap();
    let mut state = LabsViewState::load(&manager, subject_id).unwrap();
    let lab = state.labs[0].clone();

    assert!(!state.confirm_delete(&manager).unwrap());

    state.request_delete(&lab);
    state.cancel_delete();
    assert!(!state.confirm_delete(&manager).unwrap());
    assert_eq!(manager.list_labs(subject_id).unwrap().len(), 1);

    state.request_delete(&lab);
    assert!(state.confirm_delete(&manager).unwrap());
    assert!(state.pending_delete.is_none());
    assert!(state.labs.is_empty());
}

#[test]
fn view_state_edit_reject_keeps_session_open() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");
    let manager = manager(&conn);
    manager.add_lab(subject_id, &LabInput::new("Basis")).unwrap();
    let mut state = LabsViewState::load(&manager, subject_id).unwrap();
    let lab = state.labs[0].clone();

    state.begin_edit(&lab);
    if let Some(session) = state.edit_dialog.as_mut() {
        session.form.title = "  ".to_string();
        session.form.description = "spanning sets".to_string();
    }

    assert!(!state.submit_edit(&manager).unwrap());
    let session = state.edit_dialog.as_ref().expect("session should stay open");
    assert_eq!(session.lab, lab);
    assert_eq!(session.form.description, "spanning sets");
    assert_eq!(state.labs, vec![lab.clone()]);
    assert_eq!(manager.list_labs(subject_id).unwrap(), vec![lab]);
}

#[test]
fn view_state_cancel_and_missing_dialog_are_side_effect_free() {
    let conn = open_db_in_memory().unwrap();
    let subject_id = seeded_subject(&conn, "Algebra");
    let manager = manager(&conn);
    manager.add_lab(subject_id, &LabInput::new("Kernel")).unwrap();
    let mut state = LabsViewState::load(&manager, subject_id).unwrap();
    let loaded = state.clone();
    let lab = state.labs[0].clone();

    assert!(!state.submit_add(&manager).unwrap());
    assert!(!state.submit_edit(&manager).unwrap());
    assert_eq!(state, loaded);

    state.open_add_dialog();
    if let Some(form) = state.add_dialog.as_mut() {
        form.title = "Image".to_string();
    }
    state.cancel_add();
    assert!(state.add_dialog.is_none());
    assert!(!state.submit_add(&manager).unwrap());

    state.begin_edit(&lab);
    if let Some(session) = state.edit_dialog.as_mut() {
        session.form.title = "Null space".to_string();
    }
    state.cancel_edit();
    assert!(state.edit_dialog.is_none());
    assert!(!state.submit_edit(&manager).unwrap());

    assert_eq!(state, loaded);
    assert_eq!(manager.list_labs(subject_id).unwrap(), vec![lab]);
}
