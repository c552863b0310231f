//! Note use-case service.
//!
//! # Responsibility
//! - Validate incoming note payloads before the store is touched.
//! - Provide list/create/get/update/delete entry points over a note store.
//! - Classify failures so callers can tell validation, not-found and storage
//!   problems apart.
//!
//! # Invariants
//! - Create and update require all four fields; nothing is merged on update.
//! - List defaults to `skip = 0`, `limit = 100`.
//! - Log lines carry ids and counts only, never note content.

use crate::model::note::{Note, NoteDraft, NoteFields, NoteId, NoteValidationError};
use crate::repo::note_repo::{NoteListQuery, NoteRepository, RepoError, DEFAULT_LIST_LIMIT};
use log::{debug, info, warn};
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Coarse failure class for mapping onto transport status codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    StorageUnavailable,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::NotFound => "not_found",
            Self::StorageUnavailable => "storage_unavailable",
        }
    }
}

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Payload is malformed or misses a required field.
    Validation(NoteValidationError),
    /// Target note does not exist.
    NotFound(NoteId),
    /// The store could not be reached or written.
    StorageUnavailable(RepoError),
}

impl NoteServiceError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation(_) => ErrorKind::Validation,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::StorageUnavailable(_) => ErrorKind::StorageUnavailable,
        }
    }
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::NotFound(_) => write!(f, "Note not found"),
            Self::StorageUnavailable(err) => write!(f, "note storage unavailable: {err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::NotFound(_) => None,
            Self::StorageUnavailable(err) => Some(err),
        }
    }
}

impl From<RepoError> for NoteServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::Validation(err),
            other => Self::StorageUnavailable(other),
        }
    }
}

impl From<NoteValidationError> for NoteServiceError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Incoming note payload for create and update.
///
/// Fields are optional here so that absence can be reported as a validation
/// failure. JSON payloads go through `from_json_value` only.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteInput {
    pub content: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub color: Option<String>,
}

impl NoteInput {
    /// Builds a complete payload.
    pub fn new(content: impl Into<String>, x: f64, y: f64, color: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            x: Some(x),
            y: Some(y),
            color: Some(color.into()),
        }
    }

    /// Parses a JSON document, checking the type of every known field.
    pub fn from_json_str(payload: &str) -> Result<Self, NoteValidationError> {
        let value: Value = serde_json::from_str(payload)
            .map_err(|err| NoteValidationError::MalformedJson(err.to_string()))?;
        Self::from_json_value(&value)
    }

    /// Reads the note fields out of a JSON object.
    ///
    /// Unknown keys are ignored. `null` counts as a type mismatch, not as an
    /// omitted field. Integers are accepted for `x` and `y`.
    pub fn from_json_value(value: &Value) -> Result<Self, NoteValidationError> {
        let object = value.as_object().ok_or(NoteValidationError::NotAnObject)?;

        let text_field = |field: &'static str| match object.get(field) {
            None => Ok(None),
            Some(Value::String(text)) => Ok(Some(text.clone())),
            Some(_) => Err(NoteValidationError::InvalidType {
                field,
                expected: "string",
            }),
        };
        let number_field = |field: &'static str| match object.get(field) {
            None => Ok(None),
            Some(Value::Number(number)) => number.as_f64().map(Some).ok_or(
                NoteValidationError::InvalidType {
                    field,
                    expected: "number",
                },
            ),
            Some(_) => Err(NoteValidationError::InvalidType {
                field,
                expected: "number",
            }),
        };

        Ok(Self {
            content: text_field("content")?,
            x: number_field("x")?,
            y: number_field("y")?,
            color: text_field("color")?,
        })
    }

    /// Checks presence of all required fields and their values.
    pub fn validate(&self) -> Result<NoteFields, NoteValidationError> {
        let content = self
            .content
            .clone()
            .ok_or(NoteValidationError::MissingField("content"))?;
        let x = self.x.ok_or(NoteValidationError::MissingField("x"))?;
        let y = self.y.ok_or(NoteValidationError::MissingField("y"))?;
        let color = self
            .color
            .clone()
            .ok_or(NoteValidationError::MissingField("color"))?;

        let fields = NoteFields::new(content, x, y, color);
        fields.validate()?;
        Ok(fields)
    }
}

impl From<NoteFields> for NoteInput {
    fn from(fields: NoteFields) -> Self {
        Self::new(fields.content, fields.x, fields.y, fields.color)
    }
}

/// Pagination input for listing notes; unset values use defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListParams {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl ListParams {
    pub fn new(skip: u32, limit: u32) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
        }
    }

    fn to_query(self) -> NoteListQuery {
        NoteListQuery {
            skip: self.skip.unwrap_or(0),
            limit: self.limit.unwrap_or(DEFAULT_LIST_LIMIT),
        }
    }
}

/// Acknowledgement returned by a successful delete.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeleteAck {
    pub ok: bool,
}

impl DeleteAck {
    pub fn acknowledged() -> Self {
        Self { ok: true }
    }
}

/// Note service facade over a note store.
pub struct NoteService<R: NoteRepository> {
    repo: R,
}

impl<R: NoteRepository> NoteService<R> {
    /// Creates a service that owns the provided store.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Returns the underlying store.
    pub fn repository(&self) -> &R {
        &self.repo
    }

    /// Lists notes in insertion order.
    pub fn list_notes(&self, params: ListParams) -> Result<Vec<Note>, NoteServiceError> {
        let query = params.to_query();
        let notes = self
            .repo
            .list_notes(&query)
            .map_err(|err| failure("note_list", None, err.into()))?;
        debug!(
            "event=note_list module=service status=ok skip={} limit={} count={}",
            query.skip,
            query.limit,
            notes.len()
        );
        Ok(notes)
    }

    /// Validates the payload and creates a note.
    pub fn create_note(&self, input: &NoteInput) -> Result<Note, NoteServiceError> {
        let fields = input
            .validate()
            .map_err(|err| failure("note_create", None, err.into()))?;
        let note = self
            .repo
            .create_note(&NoteDraft::from(fields))
            .map_err(|err| failure("note_create", None, err.into()))?;
        info!(
            "event=note_create module=service status=ok note_id={}",
            note.id
        );
        Ok(note)
    }

    /// Gets one note by id.
    pub fn get_note(&self, id: NoteId) -> Result<Note, NoteServiceError> {
        self.repo
            .get_note(id)
            .map_err(|err| failure("note_get", Some(id), err.into()))?
            .ok_or_else(|| failure("note_get", Some(id), NoteServiceError::NotFound(id)))
    }

    /// Validates the payload and overwrites every field of the note.
    pub fn update_note(&self, id: NoteId, input: &NoteInput) -> Result<Note, NoteServiceError> {
        let fields = input
            .validate()
            .map_err(|err| failure("note_update", Some(id), err.into()))?;
        let note = self
            .repo
            .update_note(id, &fields)
            .map_err(|err| failure("note_update", Some(id), err.into()))?;
        info!("event=note_update module=service status=ok note_id={id}");
        Ok(note)
    }

    /// Permanently deletes a note.
    pub fn delete_note(&self, id: NoteId) -> Result<DeleteAck, NoteServiceError> {
        self.repo
            .delete_note(id)
            .map_err(|err| failure("note_delete", Some(id), err.into()))?;
        info!("event=note_delete module=service status=ok note_id={id}");
        Ok(DeleteAck::acknowledged())
    }
}

fn failure(event: &str, id: Option<NoteId>, err: NoteServiceError) -> NoteServiceError {
    let note_id = id.map_or_else(|| "-".to_string(), |id| id.to_string());
    warn!(
        "event={event} module=service status=error note_id={note_id} error_code={} error={}",
        err.kind().as_str(),
        err
    );
    err
}
