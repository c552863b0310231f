//! Core use-case services.
//!
//! # Responsibility
//! - Turn note store calls into a transport-independent request/response
//!   contract.
//! - Keep CLI or HTTP adapters decoupled from storage details.

pub mod note_service;
