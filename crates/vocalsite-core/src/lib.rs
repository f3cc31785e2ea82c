//! Vocalsite Core - Shared library for the voice-driven website studio
//!
//! This crate provides the core functionality behind the Vocalsite shell:
//! - Deterministic composition of markup/style/script buffers into one document
//! - Sandboxed preview control (device width, zoom, outline debug, auto-refresh)
//! - Capped, persisted version-snapshot history with restore
//! - The spoken-instruction → generation → partial-buffer-update workflow

pub mod buffers;
pub mod compose;
pub mod constants;
pub mod error;
pub mod events;
pub mod export;
pub mod generation;
pub mod preview;
pub mod session;
pub mod storage;
pub mod versions;

// Re-exports for convenience
pub use buffers::{BufferKind, SourceBuffers};
pub use compose::compose;
pub use error::StudioError;
pub use events::{ChangeEvent, EventBus};
pub use export::{export, ExportArtifacts};
pub use generation::{
    parse_response, GenerationClient, GenerationOrchestrator, GenerationPatch, GenerationRequest,
    HttpGenerationClient,
};
pub use preview::{ExternalViewer, PreviewConfig, PreviewController, RenderSandbox};
pub use session::{SpeechSource, Studio};
pub use storage::{MemoryStore, Persistence, SqliteStore};
pub use versions::{Snapshot, VersionStore};
