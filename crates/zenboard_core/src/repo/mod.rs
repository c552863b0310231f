//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the note store contract used by the service layer.
//! - Isolate SQLite query details from request/response handling.
//!
//! # Invariants
//! - Repository writes must enforce `NoteFields::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`) in addition to DB
//!   transport errors.

pub mod note_repo;
