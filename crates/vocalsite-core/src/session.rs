//! Studio session
//!
//! Wires buffers, event bus, preview controller, version store and generation
//! orchestrator into one single-threaded session, and routes change events
//! between them. This is the surface a shell (CLI, editor widget) talks to.

use chrono::Local;
use tracing::info;

use crate::buffers::{BufferKind, SourceBuffers};
use crate::error::StudioError;
use crate::events::{ChangeEvent, EventBus};
use crate::export::{export, ExportArtifacts};
use crate::generation::{GenerationClient, GenerationOrchestrator};
use crate::preview::{ExternalViewer, PreviewConfig, PreviewController, RenderSandbox};
use crate::storage::Persistence;
use crate::versions::{Snapshot, VersionStore};

/// Live speech-capture collaborator.
///
/// The core only consumes the transcript and listening flag; the capture
/// device itself is managed by the host.
pub trait SpeechSource {
    /// Current live transcript
    fn transcript(&self) -> String;

    /// Whether the capture device is currently listening
    fn is_listening(&self) -> bool;

    /// Clear the transcript (after a successful generation)
    fn reset(&mut self);
}

/// One editing session: three buffers plus the collaborators around them
pub struct Studio {
    project_label: String,
    buffers: SourceBuffers,
    bus: EventBus,
    preview: PreviewController,
    versions: VersionStore,
    orchestrator: GenerationOrchestrator,
}

impl Studio {
    /// Open a session with seed buffers and a history loaded from persistence
    pub fn new(
        project_label: impl Into<String>,
        sandbox: Box<dyn RenderSandbox>,
        persistence: Box<dyn Persistence>,
        client: Box<dyn GenerationClient>,
    ) -> Self {
        Self::with_buffers(
            project_label,
            SourceBuffers::default(),
            sandbox,
            persistence,
            client,
        )
    }

    /// Open a session around existing buffers (e.g. loaded from disk)
    pub fn with_buffers(
        project_label: impl Into<String>,
        buffers: SourceBuffers,
        sandbox: Box<dyn RenderSandbox>,
        persistence: Box<dyn Persistence>,
        client: Box<dyn GenerationClient>,
    ) -> Self {
        Self {
            project_label: project_label.into(),
            buffers,
            bus: EventBus::new(),
            preview: PreviewController::new(sandbox),
            versions: VersionStore::load(persistence),
            orchestrator: GenerationOrchestrator::new(client),
        }
    }

    pub fn project_label(&self) -> &str {
        &self.project_label
    }

    pub fn set_project_label(&mut self, label: impl Into<String>) {
        self.project_label = label.into();
    }

    pub fn buffers(&self) -> &SourceBuffers {
        &self.buffers
    }

    pub fn preview_config(&self) -> &PreviewConfig {
        self.preview.config()
    }

    pub fn versions(&self) -> &[Snapshot] {
        self.versions.list()
    }

    /// Replace one buffer from the editing surface
    pub fn edit_buffer(&mut self, kind: BufferKind, text: impl Into<String>) {
        self.buffers.set(kind, text.into());
        self.bus.publish(ChangeEvent::BufferEdited(kind));
        self.pump();
    }

    pub fn set_device_preset(&mut self, width_px: u32) {
        self.preview.set_device_preset(width_px);
        self.bus.publish(ChangeEvent::LayoutChanged);
        self.pump();
    }

    pub fn set_full_width(&mut self) {
        self.preview.set_full_width();
        self.bus.publish(ChangeEvent::LayoutChanged);
        self.pump();
    }

    pub fn set_width(&mut self, px: u32) {
        self.preview.set_width(px);
        self.bus.publish(ChangeEvent::LayoutChanged);
        self.pump();
    }

    pub fn set_zoom(&mut self, pct: u32) {
        self.preview.set_zoom(pct);
        self.bus.publish(ChangeEvent::LayoutChanged);
        self.pump();
    }

    pub fn toggle_outlines(&mut self) {
        self.preview.toggle_outlines();
        self.bus.publish(ChangeEvent::OutlinesToggled);
        self.pump();
    }

    pub fn toggle_auto_refresh(&mut self) {
        self.preview.toggle_auto_refresh();
    }

    /// Force a preview repaint regardless of the auto-refresh setting
    pub fn refresh_preview(&mut self) {
        self.preview.refresh(&self.buffers);
    }

    /// Drain queued change events into the preview controller
    fn pump(&mut self) {
        for event in self.bus.drain() {
            self.preview.handle_change(event, &self.buffers);
        }
    }

    fn version_label(&self) -> String {
        format!(
            "{} @ {}",
            self.project_label,
            Local::now().format("%Y-%m-%d %H:%M:%S")
        )
    }

    /// Manually snapshot the current buffers
    pub fn save_version(&mut self) -> Snapshot {
        let label = self.version_label();
        self.versions.snapshot(&self.buffers, &label)
    }

    /// Overwrite the buffers from a stored snapshot.
    ///
    /// The restored buffers go through the ordinary change-event path, so the
    /// auto-refresh policy decides whether the preview repaints.
    pub fn restore_version(&mut self, id: u64) -> Result<(), StudioError> {
        let restored = self.versions.restore(id)?;
        self.buffers = restored;
        for kind in [BufferKind::Markup, BufferKind::Style, BufferKind::Script] {
            self.bus.publish(ChangeEvent::BufferEdited(kind));
        }
        self.pump();
        Ok(())
    }

    /// Serialize one snapshot to JSON (for the host clipboard)
    pub fn snapshot_json(&self, id: u64) -> Result<String, StudioError> {
        let snap = self
            .versions
            .get(id)
            .ok_or(StudioError::SnapshotNotFound(id))?;
        serde_json::to_string(snap).map_err(|e| StudioError::PersistenceCorrupt(e.to_string()))
    }

    /// Build the export artifacts from the current buffers
    pub fn export(&self) -> ExportArtifacts {
        export(&self.buffers)
    }

    /// Hand the overlay-free document to the external view collaborator
    pub fn open_external(&mut self, viewer: &mut dyn ExternalViewer) -> anyhow::Result<()> {
        self.preview.open_external(&self.buffers, viewer)
    }

    /// Run one generation call from an instruction.
    ///
    /// Atomic: on failure nothing changes. On success the patch is applied to
    /// the buffers as they are NOW (they may have drifted since the call went
    /// out), a snapshot is recorded, and the preview repaints regardless of
    /// the auto-refresh setting.
    pub async fn generate(&mut self, instruction: &str) -> Result<Snapshot, StudioError> {
        let patch = self.orchestrator.generate(instruction, &self.buffers).await?;

        patch.apply(&mut self.buffers);
        let snap = self.save_version();
        info!("generation applied, snapshot {} ({})", snap.id, snap.label);
        self.preview.refresh(&self.buffers);
        Ok(snap)
    }

    /// Run one generation call from the speech collaborator's transcript,
    /// clearing the transcript on success.
    pub async fn generate_from_speech(
        &mut self,
        speech: &mut dyn SpeechSource,
    ) -> Result<Snapshot, StudioError> {
        let transcript = speech.transcript();
        let snap = self.generate(&transcript).await?;
        speech.reset();
        Ok(snap)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::generation::GenerationRequest;
    use crate::storage::MemoryStore;

    struct RecordingSandbox(Arc<Mutex<Vec<String>>>);

    impl RenderSandbox for RecordingSandbox {
        fn replace_content(&mut self, document: &str) {
            self.0.lock().unwrap().push(document.to_string());
        }
    }

    struct StaticClient(Option<String>);

    #[async_trait::async_trait]
    impl GenerationClient for StaticClient {
        async fn generate(&self, _request: &GenerationRequest) -> anyhow::Result<String> {
            match &self.0 {
                Some(reply) => Ok(reply.clone()),
                None => anyhow::bail!("service down"),
            }
        }
    }

    struct FakeSpeech {
        transcript: String,
        resets: usize,
    }

    impl SpeechSource for FakeSpeech {
        fn transcript(&self) -> String {
            self.transcript.clone()
        }
        fn is_listening(&self) -> bool {
            false
        }
        fn reset(&mut self) {
            self.transcript.clear();
            self.resets += 1;
        }
    }

    fn studio(reply: Option<&str>) -> (Studio, Arc<Mutex<Vec<String>>>) {
        let documents = Arc::new(Mutex::new(Vec::new()));
        let studio = Studio::new(
            "My Voice Site",
            Box::new(RecordingSandbox(documents.clone())),
            Box::new(MemoryStore::new()),
            Box::new(StaticClient(reply.map(str::to_string))),
        );
        (studio, documents)
    }

    #[test]
    fn test_edit_repaints_under_auto_refresh_only() {
        let (mut studio, documents) = studio(None);

        studio.edit_buffer(BufferKind::Style, "body { color: red }");
        assert_eq!(documents.lock().unwrap().len(), 1);

        studio.toggle_auto_refresh();
        studio.edit_buffer(BufferKind::Style, "body { color: green }");
        assert_eq!(documents.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_layout_changes_do_not_repaint() {
        let (mut studio, documents) = studio(None);
        studio.set_zoom(120);
        studio.set_width(700);
        studio.set_device_preset(375);
        studio.set_full_width();
        assert!(documents.lock().unwrap().is_empty());
        assert_eq!(studio.preview_config().zoom_percent, 120);
        assert!(studio.preview_config().full_width);
    }

    #[tokio::test]
    async fn test_generate_applies_patch_snapshots_and_repaints() {
        let (mut studio, documents) = studio(Some(r#"{"css":"body { margin: 0 }"}"#));
        studio.toggle_auto_refresh(); // off: the generation path must still repaint

        let markup_before = studio.buffers().markup.clone();
        let snap = studio.generate("tighten the layout").await.unwrap();

        assert_eq!(studio.buffers().style, "body { margin: 0 }");
        assert_eq!(studio.buffers().markup, markup_before);
        assert!(snap.label.starts_with("My Voice Site @ "));
        assert_eq!(studio.versions().len(), 1);
        assert_eq!(documents.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_generation_changes_nothing() {
        let (mut studio, documents) = studio(None);
        studio.toggle_auto_refresh();

        let before = studio.buffers().clone();
        let err = studio.generate("anything").await.unwrap_err();

        assert!(matches!(err, StudioError::ExternalServiceFailure(_)));
        assert_eq!(studio.buffers(), &before);
        assert!(studio.versions().is_empty());
        assert!(documents.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_unparsable_reply_changes_nothing() {
        let (mut studio, _) = studio(Some("sorry, can't help"));
        let before = studio.buffers().clone();
        let err = studio.generate("anything").await.unwrap_err();
        assert!(matches!(err, StudioError::UnparsableResponse));
        assert_eq!(studio.buffers(), &before);
        assert!(studio.versions().is_empty());
    }

    #[tokio::test]
    async fn test_speech_transcript_cleared_only_on_success() {
        let (mut studio, _) = studio(Some(r#"{"js":"alert(1)"}"#));
        let mut speech = FakeSpeech {
            transcript: "add an alert".to_string(),
            resets: 0,
        };

        studio.generate_from_speech(&mut speech).await.unwrap();
        assert!(speech.transcript.is_empty());
        assert_eq!(speech.resets, 1);

        // Empty transcript now fails and must not reset again
        let err = studio.generate_from_speech(&mut speech).await.unwrap_err();
        assert!(matches!(err, StudioError::EmptyInstruction));
        assert_eq!(speech.resets, 1);
    }

    #[test]
    fn test_restore_goes_through_auto_refresh_policy() {
        let (mut studio, documents) = studio(None);
        let snap = studio.save_version();

        studio.edit_buffer(BufferKind::Markup, "<p>drifted</p>");
        let paints_before = documents.lock().unwrap().len();

        studio.toggle_auto_refresh(); // off
        studio.restore_version(snap.id).unwrap();
        assert_eq!(studio.buffers().markup, SourceBuffers::default().markup);
        // No repaint while auto-refresh is off
        assert_eq!(documents.lock().unwrap().len(), paints_before);

        let err = studio.restore_version(999_999_999_999).unwrap_err();
        assert!(matches!(err, StudioError::SnapshotNotFound(_)));
    }

    #[test]
    fn test_snapshot_json_roundtrips() {
        let (mut studio, _) = studio(None);
        let snap = studio.save_version();
        let json = studio.snapshot_json(snap.id).unwrap();
        let parsed: crate::versions::Snapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snap);
    }
}
