//! Preview controller
//!
//! Owns the viewport simulation state (device width, zoom, outline debug,
//! auto-refresh) and drives composed documents into the rendering sandbox.
//! Every refresh is a full-content replacement; the sandbox is never patched
//! incrementally.

use tracing::debug;

use crate::buffers::SourceBuffers;
use crate::compose::compose;
use crate::events::ChangeEvent;

/// Fixed device-width presets, px
pub const DEVICE_PRESETS: [u32; 3] = [375, 768, 1366];

pub const MIN_DEVICE_WIDTH: u32 = 320;
pub const MAX_DEVICE_WIDTH: u32 = 1920;
pub const MIN_ZOOM: u32 = 50;
pub const MAX_ZOOM: u32 = 150;

/// Viewport simulation settings.
///
/// `full_width` and an explicit device width are mutually exclusive display
/// modes; `full_width`, when set, overrides the stored width.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PreviewConfig {
    pub device_width_px: u32,
    pub full_width: bool,
    pub zoom_percent: u32,
    pub auto_refresh: bool,
    pub show_outlines: bool,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            device_width_px: 1366,
            full_width: false,
            zoom_percent: 100,
            auto_refresh: true,
            show_outlines: false,
        }
    }
}

/// Isolated rendering context fed by full-content replacement.
///
/// The host implementation is expected to permit scripts and form submission
/// while denying top-level navigation and host storage access.
pub trait RenderSandbox: Send {
    /// Replace the sandbox's entire content with the given document
    fn replace_content(&mut self, document: &str);
}

/// Host capability that opens a document outside the sandbox
pub trait ExternalViewer {
    fn open(&mut self, document: &str) -> anyhow::Result<()>;
}

/// Drives viewport state and rendering.
///
/// All config operations are total and never fail. Width and zoom setters
/// clamp to their global ranges rather than rejecting values.
pub struct PreviewController {
    config: PreviewConfig,
    sandbox: Box<dyn RenderSandbox>,
}

impl PreviewController {
    pub fn new(sandbox: Box<dyn RenderSandbox>) -> Self {
        Self {
            config: PreviewConfig::default(),
            sandbox,
        }
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Switch to one of the fixed device presets
    pub fn set_device_preset(&mut self, width_px: u32) {
        self.config.full_width = false;
        self.config.device_width_px = width_px.clamp(MIN_DEVICE_WIDTH, MAX_DEVICE_WIDTH);
    }

    /// Let the preview span the whole available width
    pub fn set_full_width(&mut self) {
        self.config.full_width = true;
    }

    /// Set an explicit device width, clamped to [320, 1920]
    pub fn set_width(&mut self, px: u32) {
        self.config.full_width = false;
        self.config.device_width_px = px.clamp(MIN_DEVICE_WIDTH, MAX_DEVICE_WIDTH);
    }

    /// Set the zoom level, clamped to [50, 150]
    pub fn set_zoom(&mut self, pct: u32) {
        self.config.zoom_percent = pct.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn toggle_outlines(&mut self) {
        self.config.show_outlines = !self.config.show_outlines;
    }

    pub fn toggle_auto_refresh(&mut self) {
        self.config.auto_refresh = !self.config.auto_refresh;
    }

    /// Recompose from the current buffers and replace the sandbox content.
    ///
    /// Callers that must repaint regardless of `auto_refresh` (the generation
    /// workflow after a successful update) call this directly; policy-gated
    /// repaints go through [`PreviewController::handle_change`].
    pub fn refresh(&mut self, buffers: &SourceBuffers) {
        let document = compose(
            &buffers.markup,
            &buffers.style,
            &buffers.script,
            self.config.show_outlines,
        );
        debug!("preview refresh ({} bytes)", document.len());
        self.sandbox.replace_content(&document);
    }

    /// Apply the auto-refresh policy to one change event.
    ///
    /// Buffer edits and outline toggles repaint only when `auto_refresh` is
    /// on; layout-only changes never recompose.
    pub fn handle_change(&mut self, event: ChangeEvent, buffers: &SourceBuffers) {
        match event {
            ChangeEvent::BufferEdited(_) | ChangeEvent::OutlinesToggled => {
                if self.config.auto_refresh {
                    self.refresh(buffers);
                }
            }
            ChangeEvent::LayoutChanged => {}
        }
    }

    /// Compose for the external unsandboxed view.
    ///
    /// The outline overlay is preview-only and never applied on this path,
    /// even while enabled in the config.
    pub fn open_external(
        &self,
        buffers: &SourceBuffers,
        viewer: &mut dyn ExternalViewer,
    ) -> anyhow::Result<()> {
        let document = compose(&buffers.markup, &buffers.style, &buffers.script, false);
        viewer.open(&document)
    }
}
