//! Record identifiers and sharded-path utilities.
//!
//! Every clinic, doctor, patient and booking is keyed by a [`RecordId`]: a v4 UUID held in a
//! *canonical* textual form of **32 lowercase hexadecimal characters** with no hyphens.
//!
//! Canonical form is required for identifiers supplied from outside the core (REST paths, CLI
//! arguments, request bodies). Use [`RecordId::parse`] to validate such input; hyphenated,
//! uppercase, wrong-length or non-hex values are rejected rather than normalised.
//!
//! ## Sharded directory layout
//! The file-backed store places the record for id `u` under
//! `parent_dir/<u[0..2]>/<u[2..4]>/<u>/`, which keeps any single directory from growing large.

mod record_id;

pub use record_id::{RecordId, Uuid};

/// Error type for identifier operations.
#[derive(Debug, thiserror::Error)]
pub enum UuidError {
    /// Input was not a canonical identifier.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type for identifier operations.
pub type UuidResult<T> = Result<T, UuidError>;
