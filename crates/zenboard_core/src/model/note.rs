//! Note domain model.
//!
//! # Responsibility
//! - Define `Note`, the only persisted entity.
//! - Apply documented defaults for omitted create fields.
//!
//! # Invariants
//! - `id` is assigned by the store exactly once and never reused.
//! - `content`, `x`, `y` and `color` are always present on a stored note.
//! - Coordinates are finite numbers.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Content stored when a create request omits it.
pub const DEFAULT_CONTENT: &str = "";
/// Coordinate stored when a create request omits `x` or `y`.
pub const DEFAULT_COORDINATE: f64 = 0.0;
/// Color stored when a create request omits it.
pub const DEFAULT_COLOR: &str = "#ffffff";

/// Store-assigned note identifier.
///
/// Serialized as a bare integer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(i64);

impl NoteId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for NoteId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Validation error for note field values and incoming payloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NoteValidationError {
    /// Payload text is not valid JSON.
    MalformedJson(String),
    /// Payload is valid JSON but not an object.
    NotAnObject,
    /// A required field is absent.
    MissingField(&'static str),
    /// A field is present with the wrong JSON type.
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
    /// `x` or `y` is NaN or infinite.
    NonFiniteCoordinate(&'static str),
}

impl Display for NoteValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MalformedJson(details) => write!(f, "malformed note payload: {details}"),
            Self::NotAnObject => write!(f, "note payload must be a JSON object"),
            Self::MissingField(field) => write!(f, "missing required field `{field}`"),
            Self::InvalidType { field, expected } => {
                write!(f, "field `{field}` must be a {expected}")
            }
            Self::NonFiniteCoordinate(field) => {
                write!(f, "field `{field}` must be a finite number")
            }
        }
    }
}

impl Error for NoteValidationError {}

/// Full desired state of a note's mutable fields.
///
/// Used as the update payload: every field is overwritten, nothing is merged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NoteFields {
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub color: String,
}

impl NoteFields {
    pub fn new(content: impl Into<String>, x: f64, y: f64, color: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            x,
            y,
            color: color.into(),
        }
    }

    /// Checks field values that storage cannot represent.
    pub fn validate(&self) -> Result<(), NoteValidationError> {
        if !self.x.is_finite() {
            return Err(NoteValidationError::NonFiniteCoordinate("x"));
        }
        if !self.y.is_finite() {
            return Err(NoteValidationError::NonFiniteCoordinate("y"));
        }
        Ok(())
    }
}

impl Default for NoteFields {
    fn default() -> Self {
        Self::new(
            DEFAULT_CONTENT,
            DEFAULT_COORDINATE,
            DEFAULT_COORDINATE,
            DEFAULT_COLOR,
        )
    }
}

/// Create input where any field may be omitted.
///
/// Omitted fields fall back to `DEFAULT_CONTENT`, `DEFAULT_COORDINATE` and
/// `DEFAULT_COLOR` when the draft is resolved.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NoteDraft {
    pub content: Option<String>,
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub color: Option<String>,
}

impl NoteDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn position(mut self, x: f64, y: f64) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Resolves omitted fields to their defaults.
    pub fn into_fields(self) -> NoteFields {
        let defaults = NoteFields::default();
        NoteFields {
            content: self.content.unwrap_or(defaults.content),
            x: self.x.unwrap_or(defaults.x),
            y: self.y.unwrap_or(defaults.y),
            color: self.color.unwrap_or(defaults.color),
        }
    }
}

impl From<NoteFields> for NoteDraft {
    fn from(fields: NoteFields) -> Self {
        Self {
            content: Some(fields.content),
            x: Some(fields.x),
            y: Some(fields.y),
            color: Some(fields.color),
        }
    }
}

/// A stored sticky note.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    pub content: String,
    pub x: f64,
    pub y: f64,
    pub color: String,
}

impl Note {
    pub fn from_fields(id: NoteId, fields: NoteFields) -> Self {
        Self {
            id,
            content: fields.content,
            x: fields.x,
            y: fields.y,
            color: fields.color,
        }
    }

    /// Returns a copy of the mutable fields without the id.
    pub fn fields(&self) -> NoteFields {
        NoteFields::new(self.content.clone(), self.x, self.y, self.color.clone())
    }
}
