//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide create/get/list/update/delete over the `notes` table.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every mutation runs in its own `IMMEDIATE` transaction and either fully
//!   commits or rolls back.
//! - The connection lock is held for one operation only and released on every
//!   exit path.
//! - Ids come from `AUTOINCREMENT` and are never reused after deletion.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::model::note::{Note, NoteDraft, NoteFields, NoteId, NoteValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// Page size applied when callers do not ask for one.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

const NOTE_SELECT_SQL: &str = "SELECT
    id,
    content,
    x,
    y,
    color
FROM notes";

const REQUIRED_COLUMNS: [&str; 5] = ["id", "content", "x", "y", "color"];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for note persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(NoteValidationError),
    Db(DbError),
    NotFound(NoteId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
    LockPoisoned,
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "note not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted note data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; open it with open_db first"
            ),
            Self::MissingRequiredTable(table) => write!(f, "missing required table `{table}`"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "missing required column `{table}.{column}`")
            }
            Self::LockPoisoned => write!(f, "note store connection lock is poisoned"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<NoteValidationError> for RepoError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Pagination window for listing notes in insertion order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteListQuery {
    /// Number of leading notes to skip.
    pub skip: u32,
    /// Maximum notes to return. Zero yields an empty page.
    pub limit: u32,
}

impl Default for NoteListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Repository interface for note CRUD operations.
pub trait NoteRepository {
    /// Persists a new note, applying defaults, and returns the stored record.
    fn create_note(&self, draft: &NoteDraft) -> RepoResult<Note>;
    /// Finds one note by id. Absence is `Ok(None)`.
    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>>;
    /// Lists notes ordered by id ascending.
    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>>;
    /// Overwrites all mutable fields of an existing note.
    fn update_note(&self, id: NoteId, fields: &NoteFields) -> RepoResult<Note>;
    /// Permanently removes a note.
    fn delete_note(&self, id: NoteId) -> RepoResult<()>;
    /// Returns the number of stored notes.
    fn count_notes(&self) -> RepoResult<u64>;
}

/// SQLite-backed note repository.
///
/// Owns a single connection; the type is `Send + Sync` and can be shared
/// between threads behind an `Arc`.
pub struct SqliteNoteRepository {
    conn: Mutex<Connection>,
}

impl SqliteNoteRepository {
    /// Wraps a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations have not been applied.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema is
    ///   not the one this crate writes.
    pub fn try_new(conn: Connection) -> RepoResult<Self> {
        ensure_connection_ready(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens (or creates) a database file and wraps it.
    pub fn open(path: impl AsRef<Path>) -> RepoResult<Self> {
        Self::try_new(open_db(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> RepoResult<Self> {
        Self::try_new(open_db_in_memory()?)
    }

    fn lock(&self) -> RepoResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| RepoError::LockPoisoned)
    }
}

impl NoteRepository for SqliteNoteRepository {
    fn create_note(&self, draft: &NoteDraft) -> RepoResult<Note> {
        let fields = draft.clone().into_fields();
        fields.validate()?;

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO notes (content, x, y, color) VALUES (?1, ?2, ?3, ?4);",
            params![
                fields.content.as_str(),
                fields.x,
                fields.y,
                fields.color.as_str()
            ],
        )?;
        let id = NoteId::new(tx.last_insert_rowid());
        let note = find_note(&tx, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("note {id} missing in read-back after insert"))
        })?;
        tx.commit()?;

        Ok(note)
    }

    fn get_note(&self, id: NoteId) -> RepoResult<Option<Note>> {
        let conn = self.lock()?;
        find_note(&conn, id)
    }

    fn list_notes(&self, query: &NoteListQuery) -> RepoResult<Vec<Note>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "{NOTE_SELECT_SQL}
             ORDER BY id ASC
             LIMIT ?1 OFFSET ?2;"
        ))?;

        let mut rows = stmt.query(params![i64::from(query.limit), i64::from(query.skip)])?;
        let mut notes = Vec::new();
        while let Some(row) = rows.next()? {
            notes.push(parse_note_row(row)?);
        }

        Ok(notes)
    }

    fn update_note(&self, id: NoteId, fields: &NoteFields) -> RepoResult<Note> {
        fields.validate()?;

        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute(
            "UPDATE notes
             SET
                content = ?2,
                x = ?3,
                y = ?4,
                color = ?5
             WHERE id = ?1;",
            params![
                id.get(),
                fields.content.as_str(),
                fields.x,
                fields.y,
                fields.color.as_str()
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        let note = find_note(&tx, id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("note {id} missing in read-back after update"))
        })?;
        tx.commit()?;

        Ok(note)
    }

    fn delete_note(&self, id: NoteId) -> RepoResult<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let changed = tx.execute("DELETE FROM notes WHERE id = ?1;", [id.get()])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        tx.commit()?;
        Ok(())
    }

    fn count_notes(&self) -> RepoResult<u64> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))?;
        u64::try_from(count)
            .map_err(|_| RepoError::InvalidData(format!("negative note count `{count}`")))
    }
}

fn find_note(conn: &Connection, id: NoteId) -> RepoResult<Option<Note>> {
    let mut stmt = conn.prepare(&format!("{NOTE_SELECT_SQL} WHERE id = ?1;"))?;
    let row = stmt
        .query_row([id.get()], |row| Ok(parse_note_row(row)))
        .optional()?;
    row.transpose()
}

fn parse_note_row(row: &Row<'_>) -> RepoResult<Note> {
    let id = NoteId::new(row.get("id")?);
    let fields = NoteFields {
        content: row.get("content")?,
        x: row.get("x")?,
        y: row.get("y")?,
        color: row.get("color")?,
    };
    fields
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("note {id}: {err}")))?;
    Ok(Note::from_fields(id, fields))
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version < expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "notes")? {
        return Err(RepoError::MissingRequiredTable("notes"));
    }

    for column in REQUIRED_COLUMNS {
        if !table_has_column(conn, "notes", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "notes",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
