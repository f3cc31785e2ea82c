//! Voice-driven generation workflow
//!
//! Turns a spoken instruction into partial buffer updates: build a request
//! around the instruction and the current code, call the generation service,
//! parse the JSON object out of whatever text comes back, and replace only
//! the fields the response actually carries. Failure at any step leaves the
//! caller's state completely untouched.

mod client;
mod parse;

pub use client::{GenerationClient, GenerationRequest, HttpGenerationClient};
pub use parse::parse_response;

use serde::Deserialize;

use crate::buffers::{BufferKind, SourceBuffers};
use crate::error::StudioError;

/// Partial buffer update parsed from a generation response.
///
/// Absent fields leave the matching buffer untouched. Present fields replace
/// the whole buffer; there is deliberately no structural merge.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct GenerationPatch {
    pub html: Option<String>,
    pub css: Option<String>,
    pub js: Option<String>,
}

impl GenerationPatch {
    /// Whole-field replace of every present field
    pub fn apply(&self, buffers: &mut SourceBuffers) {
        if let Some(html) = &self.html {
            buffers.markup = html.clone();
        }
        if let Some(css) = &self.css {
            buffers.style = css.clone();
        }
        if let Some(js) = &self.js {
            buffers.script = js.clone();
        }
    }

    /// Buffer kinds this patch would touch (for change events)
    pub fn touched(&self) -> Vec<BufferKind> {
        let mut kinds = Vec::new();
        if self.html.is_some() {
            kinds.push(BufferKind::Markup);
        }
        if self.css.is_some() {
            kinds.push(BufferKind::Style);
        }
        if self.js.is_some() {
            kinds.push(BufferKind::Script);
        }
        kinds
    }

    pub fn is_empty(&self) -> bool {
        self.html.is_none() && self.css.is_none() && self.js.is_none()
    }
}

/// Runs the spoken-instruction → generation → patch workflow.
///
/// The orchestrator itself is side-effect free: applying the patch, taking
/// the snapshot and refreshing the preview are the caller's job, and only
/// happen on `Ok`. The one await point of the whole session is the
/// collaborator call in here; edits made while it is in flight land normally
/// and the patch is applied on top of the response-time buffers.
pub struct GenerationOrchestrator {
    client: Box<dyn GenerationClient>,
}

impl GenerationOrchestrator {
    pub fn new(client: Box<dyn GenerationClient>) -> Self {
        Self { client }
    }

    /// Validate the transcript, call the generation service, parse the patch.
    ///
    /// A blank transcript fails with `EmptyInstruction` before any external
    /// call. Transport failures surface as `ExternalServiceFailure`; a reply
    /// without a parseable JSON object as `UnparsableResponse`.
    pub async fn generate(
        &self,
        transcript: &str,
        buffers: &SourceBuffers,
    ) -> Result<GenerationPatch, StudioError> {
        if transcript.trim().is_empty() {
            return Err(StudioError::EmptyInstruction);
        }

        let request = GenerationRequest {
            instruction: transcript.to_string(),
            current_markup: buffers.markup.clone(),
            current_style: buffers.style.clone(),
            current_script: buffers.script.clone(),
        };

        let text = self
            .client
            .generate(&request)
            .await
            .map_err(|e| StudioError::ExternalServiceFailure(e.to_string()))?;

        parse_response(&text)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    struct ScriptedClient {
        calls: Arc<AtomicUsize>,
        reply: anyhow::Result<String>,
    }

    impl ScriptedClient {
        fn ok(reply: &str) -> (Self, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    calls: calls.clone(),
                    reply: Ok(reply.to_string()),
                },
                calls,
            )
        }

        fn failing(message: &str) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                reply: Err(anyhow::anyhow!("{}", message.to_string())),
            }
        }
    }

    #[async_trait::async_trait]
    impl GenerationClient for ScriptedClient {
        async fn generate(&self, _request: &GenerationRequest) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err(e) => Err(anyhow::anyhow!("{e}")),
            }
        }
    }

    #[tokio::test]
    async fn test_blank_transcript_makes_zero_calls() {
        let (client, calls) = ScriptedClient::ok(r#"{"html":"x"}"#);
        let orchestrator = GenerationOrchestrator::new(Box::new(client));
        let buffers = SourceBuffers::default();

        for transcript in ["", "   ", "\n\t"] {
            let err = orchestrator.generate(transcript, &buffers).await.unwrap_err();
            assert!(matches!(err, StudioError::EmptyInstruction));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_surfaces_as_external_service_failure() {
        let orchestrator =
            GenerationOrchestrator::new(Box::new(ScriptedClient::failing("connection refused")));
        let err = orchestrator
            .generate("make it blue", &SourceBuffers::default())
            .await
            .unwrap_err();
        match err {
            StudioError::ExternalServiceFailure(msg) => assert!(msg.contains("connection refused")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_noise_wrapped_reply_yields_patch() {
        let (client, _) = ScriptedClient::ok(r#"Sure! {"css":"body { color: blue; }"} Enjoy."#);
        let orchestrator = GenerationOrchestrator::new(Box::new(client));
        let patch = orchestrator
            .generate("make it blue", &SourceBuffers::default())
            .await
            .unwrap();
        assert_eq!(patch.css.as_deref(), Some("body { color: blue; }"));
        assert!(patch.html.is_none());
        assert!(patch.js.is_none());
    }

    #[tokio::test]
    async fn test_prose_only_reply_is_unparsable() {
        let (client, _) = ScriptedClient::ok("I could not produce code for that.");
        let orchestrator = GenerationOrchestrator::new(Box::new(client));
        let err = orchestrator
            .generate("make it blue", &SourceBuffers::default())
            .await
            .unwrap_err();
        assert!(matches!(err, StudioError::UnparsableResponse));
    }

    #[test]
    fn test_css_only_patch_leaves_other_buffers_byte_identical() {
        let mut buffers = SourceBuffers::default();
        let markup_before = buffers.markup.clone();
        let script_before = buffers.script.clone();

        let patch = GenerationPatch {
            css: Some("body { margin: 0 }".to_string()),
            ..Default::default()
        };
        patch.apply(&mut buffers);

        assert_eq!(buffers.markup, markup_before);
        assert_eq!(buffers.script, script_before);
        assert_eq!(buffers.style, "body { margin: 0 }");
        assert_eq!(patch.touched(), vec![BufferKind::Style]);
    }
}
