use rusqlite::Connection;
use std::collections::HashSet;
use zenboard_core::db::migrations::latest_version;
use zenboard_core::db::open_db_in_memory;
use zenboard_core::{
    NoteDraft, NoteFields, NoteId, NoteListQuery, NoteRepository, NoteValidationError, RepoError,
    SqliteNoteRepository,
};

fn repo() -> SqliteNoteRepository {
    SqliteNoteRepository::open_in_memory().unwrap()
}

fn create_with_content(repo: &SqliteNoteRepository, content: &str) -> NoteId {
    repo.create_note(&NoteDraft::new().content(content)).unwrap().id
}

#[test]
fn create_and_get_roundtrip() {
    let repo = repo();

    let draft = NoteDraft::new()
        .content("first note")
        .position(12.5, -3.0)
        .color("#ff0000");
    let created = repo.create_note(&draft).unwrap();

    assert_eq!(created.id, NoteId::new(1));
    assert_eq!(created.content, "first note");
    assert_eq!(created.x, 12.5);
    assert_eq!(created.y, -3.0);
    assert_eq!(created.color, "#ff0000");

    let loaded = repo.get_note(created.id).unwrap().unwrap();
    assert_eq!(loaded, created);
}

#[test]
fn create_applies_defaults_for_omitted_fields() {
    let repo = repo();

    let created = repo.create_note(&NoteDraft::new()).unwrap();
    assert_eq!(created.fields(), NoteFields::default());
    assert_eq!(created.color, "#ffffff");
}

#[test]
fn get_missing_note_returns_none() {
    let repo = repo();
    assert!(repo.get_note(NoteId::new(42)).unwrap().is_none());
}

#[test]
fn ids_are_unique_and_never_reused_after_delete() {
    let repo = repo();

    let first = create_with_content(&repo, "a");
    let second = create_with_content(&repo, "b");
    let third = create_with_content(&repo, "c");
    repo.delete_note(third).unwrap();

    let fourth = create_with_content(&repo, "d");
    let ids: HashSet<_> = [first, second, third, fourth].into_iter().collect();
    assert_eq!(ids.len(), 4);
    assert!(fourth > third);
}

#[test]
fn update_overwrites_all_fields() {
    let repo = repo();
    let created = repo
        .create_note(&NoteDraft::new().content("draft").position(1.0, 1.0).color("red"))
        .unwrap();

    let fields = NoteFields::new("", 0.0, 9.0, "blue");
    let updated = repo.update_note(created.id, &fields).unwrap();
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.fields(), fields);

    let loaded = repo.get_note(created.id).unwrap().unwrap();
    assert_eq!(loaded.fields(), fields);
}

#[test]
fn update_not_found_returns_not_found_and_leaves_store_unchanged() {
    let repo = repo();
    let existing = create_with_content(&repo, "keep");

    let err = repo
        .update_note(NoteId::new(99), &NoteFields::new("x", 1.0, 1.0, "#000000"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(id) if id == NoteId::new(99)));

    assert_eq!(repo.count_notes().unwrap(), 1);
    assert_eq!(repo.get_note(existing).unwrap().unwrap().content, "keep");
}

#[test]
fn delete_removes_note_and_second_delete_is_not_found() {
    let repo = repo();
    let id = create_with_content(&repo, "gone soon");

    repo.delete_note(id).unwrap();
    assert!(repo.get_note(id).unwrap().is_none());

    let err = repo.delete_note(id).unwrap_err();
    assert!(matches!(err, RepoError::NotFound(missing) if missing == id));

    let err = repo
        .update_note(id, &NoteFields::new("back", 0.0, 0.0, "#ffffff"))
        .unwrap_err();
    assert!(matches!(err, RepoError::NotFound(_)));
    assert_eq!(repo.count_notes().unwrap(), 0);
}

#[test]
fn validation_failure_blocks_create_and_update() {
    let repo = repo();

    let err = repo
        .create_note(&NoteDraft::new().position(f64::NAN, 0.0))
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Validation(NoteValidationError::NonFiniteCoordinate("x"))
    ));
    assert_eq!(repo.count_notes().unwrap(), 0);

    let id = create_with_content(&repo, "valid");
    let err = repo
        .update_note(id, &NoteFields::new("bad", 0.0, f64::INFINITY, "#ffffff"))
        .unwrap_err();
    assert!(matches!(err, RepoError::Validation(_)));
    assert_eq!(repo.get_note(id).unwrap().unwrap().content, "valid");
}

#[test]
fn list_on_empty_store_returns_empty() {
    let repo = repo();
    assert!(repo.list_notes(&NoteListQuery::default()).unwrap().is_empty());
}

#[test]
fn list_uses_insertion_order_with_skip_and_limit() {
    let repo = repo();
    let first = create_with_content(&repo, "first");
    let second = create_with_content(&repo, "second");
    let third = create_with_content(&repo, "third");

    let all = repo.list_notes(&NoteListQuery::default()).unwrap();
    let ids: Vec<_> = all.iter().map(|note| note.id).collect();
    assert_eq!(ids, vec![first, second, third]);

    let page = repo
        .list_notes(&NoteListQuery { skip: 1, limit: 1 })
        .unwrap();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, second);
    assert_eq!(page[0].content, "second");

    let tail = repo
        .list_notes(&NoteListQuery { skip: 1, limit: 50 })
        .unwrap();
    assert_eq!(tail.len(), 2);
    assert_eq!(tail[1].id, third);
}

#[test]
fn list_tolerates_oversized_skip_and_zero_limit() {
    let repo = repo();
    create_with_content(&repo, "only");

    let beyond = repo
        .list_notes(&NoteListQuery {
            skip: 10,
            limit: 10,
        })
        .unwrap();
    assert!(beyond.is_empty());

    let zero = repo.list_notes(&NoteListQuery { skip: 0, limit: 0 }).unwrap();
    assert!(zero.is_empty());

    let everything = repo
        .list_notes(&NoteListQuery {
            skip: 0,
            limit: u32::MAX,
        })
        .unwrap();
    assert_eq!(everything.len(), 1);
}

#[test]
fn file_backed_store_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("board.db");

    let id = {
        let repo = SqliteNoteRepository::open(&path).unwrap();
        repo.create_note(&NoteDraft::new().content("durable"))
            .unwrap()
            .id
    };

    let reopened = SqliteNoteRepository::open(&path).unwrap();
    let loaded = reopened.get_note(id).unwrap().unwrap();
    assert_eq!(loaded.content, "durable");
}

#[test]
fn repository_rejects_uninitialized_connection() {
    let conn = Connection::open_in_memory().unwrap();

    match SqliteNoteRepository::try_new(conn) {
        Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version: 0,
        }) => assert_eq!(expected_version, latest_version()),
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected uninitialized connection error"),
    }
}

#[test]
fn repository_rejects_connection_without_notes_table() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteNoteRepository::try_new(conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredTable("notes"))
    ));
}

#[test]
fn repository_rejects_connection_missing_required_column() {
    let conn = Connection::open_in_memory().unwrap();
    conn.execute_batch(
        "CREATE TABLE notes (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            content TEXT NOT NULL DEFAULT '',
            x REAL NOT NULL DEFAULT 0.0,
            y REAL NOT NULL DEFAULT 0.0
        );",
    )
    .unwrap();
    conn.execute_batch(&format!("PRAGMA user_version = {};", latest_version()))
        .unwrap();

    let result = SqliteNoteRepository::try_new(conn);
    assert!(matches!(
        result,
        Err(RepoError::MissingRequiredColumn {
            table: "notes",
            column: "color"
        })
    ));
}

#[test]
fn try_new_accepts_connection_from_open_db() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteNoteRepository::try_new(conn).unwrap();
    assert_eq!(repo.count_notes().unwrap(), 0);
}
