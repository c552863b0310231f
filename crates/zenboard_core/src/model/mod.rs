//! Domain model for canvas notes.
//!
//! # Responsibility
//! - Define the canonical note record and its create/update input shapes.
//! - Own field defaults and field-level validation rules.
//!
//! # Invariants
//! - Every persisted note is identified by a store-assigned `NoteId`.
//! - Deletion is permanent; there are no tombstones.

pub mod note;
