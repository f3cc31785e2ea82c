//! Export surface
//!
//! Builds the three string artifacts the host saves locally: the composed
//! document as the index file plus the raw style and script buffers. No
//! filesystem or archive work happens here.

use crate::buffers::SourceBuffers;
use crate::compose::compose;

/// File name the host is expected to save the composed document under
pub const INDEX_FILE: &str = "index.html";
pub const STYLE_FILE: &str = "style.css";
pub const SCRIPT_FILE: &str = "script.js";

/// The three exportable artifacts
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportArtifacts {
    /// Fully composed document, outline overlay off
    pub index_document: String,
    /// Raw style buffer
    pub style_sheet: String,
    /// Raw script buffer
    pub script_file: String,
}

/// Build the export artifacts from the current buffers
pub fn export(buffers: &SourceBuffers) -> ExportArtifacts {
    ExportArtifacts {
        index_document: compose(&buffers.markup, &buffers.style, &buffers.script, false),
        style_sheet: buffers.style.clone(),
        script_file: buffers.script.clone(),
    }
}
