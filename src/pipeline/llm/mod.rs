pub mod client;

pub use client::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LlmError {
    #[error("No API key configured for the language model")]
    MissingApiKey,

    #[error("Language model endpoint unreachable: {0}")]
    Connection(String),

    #[error("Language model returned error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("Language model returned no content")]
    EmptyResponse,
}

/// Single-prompt text completion. Model and temperature are fixed per client.
pub trait LlmClient: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, LlmError>;

    /// Model identifier, for logging.
    fn model(&self) -> &str;
}
