//! Studio error types

use thiserror::Error;

/// Errors surfaced by the studio core
#[derive(Debug, Error)]
pub enum StudioError {
    /// The transcript was empty or blank; no generation call was made
    #[error("empty instruction: speak before generating")]
    EmptyInstruction,

    /// The generation service answered, but no JSON object could be parsed out
    #[error("unparsable generation response")]
    UnparsableResponse,

    /// The generation collaborator failed (transport, auth, quota)
    #[error("generation service failure: {0}")]
    ExternalServiceFailure(String),

    /// No snapshot with the requested id exists
    #[error("snapshot not found: {0}")]
    SnapshotNotFound(u64),

    /// Persisted version history could not be deserialized
    #[error("persisted history corrupt: {0}")]
    PersistenceCorrupt(String),
}
