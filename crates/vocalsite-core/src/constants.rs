//! Core constants and configuration defaults
//!
//! Centralized location for magic numbers and default values

use std::time::Duration;

/// HTTP client configuration
pub mod http {
    use super::Duration;

    /// Connection timeout for HTTP requests
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);

    /// Whole-request timeout for a generation call
    pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);
}

/// Generation service configuration
pub mod generation {
    /// Default chat-completions endpoint
    pub const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";

    /// Default model ID
    pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

    /// Maximum output tokens per generation call
    pub const MAX_OUTPUT_TOKENS: usize = 1500;

    /// Low temperature keeps code output stable across retries
    pub const TEMPERATURE: f64 = 0.2;
}
