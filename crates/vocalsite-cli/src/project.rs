//! Project files on disk
//!
//! The shell keeps the three source buffers as plain files next to each other
//! (`markup.html`, `style.css`, `script.js`) and session data (preview output,
//! version history) under a `.vocalsite/` directory inside the project.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use tracing::warn;

use vocalsite_core::{ExternalViewer, RenderSandbox, SourceBuffers};

pub const MARKUP_FILE: &str = "markup.html";
pub const STYLE_FILE: &str = "style.css";
pub const SCRIPT_FILE: &str = "script.js";

const DATA_DIR: &str = ".vocalsite";

/// One project directory
pub struct Project {
    root: PathBuf,
}

impl Project {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn data_dir(&self) -> PathBuf {
        self.root.join(DATA_DIR)
    }

    /// SQLite file holding the version history
    pub fn history_db(&self) -> PathBuf {
        self.data_dir().join("versions.db")
    }

    /// File the preview sandbox renders into
    pub fn preview_file(&self) -> PathBuf {
        self.data_dir().join("preview.html")
    }

    /// Project label for snapshot names, taken from the directory name
    pub fn label(&self) -> String {
        self.root
            .canonicalize()
            .ok()
            .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
            .unwrap_or_else(|| "My Voice Site".to_string())
    }

    /// Seed the three buffer files with defaults, leaving existing files alone
    pub fn init(&self) -> Result<()> {
        std::fs::create_dir_all(&self.root)?;
        let defaults = SourceBuffers::default();
        for (name, content) in [
            (MARKUP_FILE, defaults.markup.as_str()),
            (STYLE_FILE, defaults.style.as_str()),
            (SCRIPT_FILE, defaults.script.as_str()),
        ] {
            let path = self.root.join(name);
            if !path.exists() {
                std::fs::write(&path, content)
                    .with_context(|| format!("writing {}", path.display()))?;
            }
        }
        Ok(())
    }

    /// Read the three buffer files
    pub fn load_buffers(&self) -> Result<SourceBuffers> {
        let read = |name: &str| -> Result<String> {
            let path = self.root.join(name);
            if !path.exists() {
                bail!(
                    "missing {}: run `vocalsite init` in the project directory first",
                    path.display()
                );
            }
            std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
        };

        Ok(SourceBuffers {
            markup: read(MARKUP_FILE)?,
            style: read(STYLE_FILE)?,
            script: read(SCRIPT_FILE)?,
        })
    }

    /// Write the three buffer files back
    pub fn write_buffers(&self, buffers: &SourceBuffers) -> Result<()> {
        for (name, content) in [
            (MARKUP_FILE, buffers.markup.as_str()),
            (STYLE_FILE, buffers.style.as_str()),
            (SCRIPT_FILE, buffers.script.as_str()),
        ] {
            let path = self.root.join(name);
            std::fs::write(&path, content).with_context(|| format!("writing {}", path.display()))?;
        }
        Ok(())
    }
}

/// Preview sandbox that renders into a file.
///
/// Full-content replacement on every refresh; write failures are logged and
/// never interrupt the session.
pub struct FileSandbox {
    path: PathBuf,
}

impl FileSandbox {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl RenderSandbox for FileSandbox {
    fn replace_content(&mut self, document: &str) {
        if let Some(parent) = self.path.parent() {
            if let Err(e) = std::fs::create_dir_all(parent) {
                warn!("preview dir create failed: {}", e);
                return;
            }
        }
        if let Err(e) = std::fs::write(&self.path, document) {
            warn!("preview write failed: {}", e);
        }
    }
}

/// External view: write the document next to the preview and open it in the
/// system browser
pub struct BrowserViewer {
    path: PathBuf,
}

impl BrowserViewer {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl ExternalViewer for BrowserViewer {
    fn open(&mut self, document: &str) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, document)?;
        open::that(&self.path)?;
        Ok(())
    }
}
