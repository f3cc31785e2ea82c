//! Generation service client
//!
//! The orchestrator only sees the [`GenerationClient`] trait; the shipped
//! implementation speaks the OpenAI chat-completions format over HTTPS.
//! The core owns no retry logic for this call.

use anyhow::{anyhow, Result};
use serde_json::Value;
use tracing::debug;

use crate::constants::{generation, http};

/// Everything the generation service gets for one call.
///
/// Buffers are captured at call start; only the instruction stays bound to
/// the call once it is in flight.
#[derive(Clone, Debug)]
pub struct GenerationRequest {
    pub instruction: String,
    pub current_markup: String,
    pub current_style: String,
    pub current_script: String,
}

/// External generation service
#[async_trait::async_trait]
pub trait GenerationClient: Send + Sync {
    /// Send one request; returns the raw, possibly prose-wrapped response text
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;
}

const SYSTEM_PROMPT: &str =
    "You are a web developer that returns only a JSON object with html, css and js keys.";

/// Build the user prompt around the instruction and the current code
fn build_prompt(request: &GenerationRequest) -> String {
    format!(
        "You are a helpful web developer. The user wants to modify or create a website \
         based on the instruction below. Use the existing code as a base when appropriate. \
         Existing HTML:\n{}\nExisting CSS:\n{}\nExisting JS:\n{}\nUser instruction:\n{}\n\n\
         Return only a json object like: {{\"html\":\"<...>\",\"css\":\"...\",\"js\":\"...\"}} \
         without extra text.",
        request.current_markup, request.current_style, request.current_script, request.instruction
    )
}

/// Chat-completions client for the generation service
pub struct HttpGenerationClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl HttpGenerationClient {
    /// Client against the default endpoint and model
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_endpoint(
            generation::DEFAULT_API_URL,
            api_key,
            generation::DEFAULT_MODEL,
        )
    }

    /// Client against a custom endpoint/model (any chat-completions server)
    pub fn with_endpoint(
        api_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .connect_timeout(http::CONNECT_TIMEOUT)
            .timeout(http::REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http,
            api_url: api_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait::async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate(&self, request: &GenerationRequest) -> Result<String> {
        let body = serde_json::json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": SYSTEM_PROMPT},
                {"role": "user", "content": build_prompt(request)}
            ],
            "temperature": generation::TEMPERATURE,
            "max_tokens": generation::MAX_OUTPUT_TOKENS
        });

        debug!("generation call to model: {}", self.model);

        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let excerpt: String = response
                .text()
                .await
                .unwrap_or_default()
                .chars()
                .take(200)
                .collect();
            return Err(anyhow!("generation service returned {status}: {excerpt}"));
        }

        let json: Value = response.json().await?;

        // Extract text from the chat-completions response format
        let text = json
            .get("choices")
            .and_then(|c| c.as_array())
            .and_then(|arr| arr.first())
            .and_then(|choice| choice.get("message"))
            .and_then(|msg| msg.get("content"))
            .and_then(|t| t.as_str())
            .unwrap_or("")
            .trim()
            .to_string();

        Ok(text)
    }
}
