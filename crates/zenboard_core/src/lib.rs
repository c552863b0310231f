//! Core domain logic for Zenboard sticky notes.
//! This crate owns note identity, defaults and the CRUD contract.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::ZenboardConfig;
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteDraft, NoteFields, NoteId, NoteValidationError};
pub use repo::note_repo::{
    NoteListQuery, NoteRepository, RepoError, RepoResult, SqliteNoteRepository,
    DEFAULT_LIST_LIMIT,
};
pub use service::note_service::{
    DeleteAck, ErrorKind, ListParams, NoteInput, NoteService, NoteServiceError,
};

/// Minimal health-check API for adapter smoke tests.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
