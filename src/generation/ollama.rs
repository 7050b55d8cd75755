//! Ollama generation backend
//!
//! Streams `POST /api/generate` and concatenates the `response` fields of
//! the newline-delimited JSON frames until the server reports `done`.

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{Generator, Prompt};
use crate::errors::{RagError, Result};

/// Default Ollama API endpoint
pub const DEFAULT_OLLAMA_URL: &str = "http://127.0.0.1:11434";

/// Default model
pub const DEFAULT_MODEL: &str = "qwen2.5:7b-instruct";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

const BACKEND_NAME: &str = "ollama";

/// Ollama streaming client
#[derive(Debug, Clone)]
pub struct OllamaGenerator {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaGenerator {
    /// Create Ollama client with default settings
    pub fn new() -> Result<Self> {
        Self::with_config(
            DEFAULT_OLLAMA_URL,
            DEFAULT_MODEL,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    /// Create Ollama client with custom configuration
    pub fn with_config(base_url: &str, model: &str, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RagError::HttpError)?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/api/version", self.base_url);

        match self.client.get(&url).send().await {
            Ok(response) => response.status().is_success(),
            Err(_) => false,
        }
    }

    /// Get current model name
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn failure(message: impl Into<String>) -> RagError {
        RagError::generation(BACKEND_NAME, message)
    }
}

#[async_trait]
impl Generator for OllamaGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);

        let request = OllamaGenerateRequest {
            model: self.model.clone(),
            prompt: prompt.text.clone(),
            stream: true,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::failure(format!("Failed to send request: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::failure(format!("HTTP {}: {}", status, error_text)));
        }

        let mut answer = FrameAccumulator::default();
        let mut stream = response.bytes_stream();
        while let Some(bytes) = stream.next().await {
            let bytes = bytes.map_err(|e| Self::failure(format!("Stream interrupted: {}", e)))?;
            if answer.push(&bytes)? {
                break;
            }
        }

        let text = answer.finish()?;
        debug!(model = %self.model, chars = text.chars().count(), "Generation complete");
        Ok(text)
    }

    fn name(&self) -> &str {
        BACKEND_NAME
    }
}

/// Reassembles NDJSON frames split across network chunks
#[derive(Debug, Default)]
struct FrameAccumulator {
    pending: Vec<u8>,
    text: String,
    done: bool,
}

impl FrameAccumulator {
    /// Feed raw bytes. Returns true once the final frame has been seen.
    fn push(&mut self, bytes: &[u8]) -> Result<bool> {
        self.pending.extend_from_slice(bytes);
        while let Some(pos) = self.pending.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.pending.drain(..=pos).collect();
            self.apply(&line)?;
            if self.done {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn apply(&mut self, line: &[u8]) -> Result<()> {
        if line.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }

        let frame: GenerateFrame = serde_json::from_slice(line).map_err(|e| {
            OllamaGenerator::failure(format!("Malformed response frame: {}", e))
        })?;

        if let Some(error) = frame.error {
            return Err(OllamaGenerator::failure(error));
        }

        self.text.push_str(&frame.response);
        self.done |= frame.done;
        Ok(())
    }

    /// Flush any unterminated last frame and return the answer
    fn finish(mut self) -> Result<String> {
        if !self.done && !self.pending.is_empty() {
            let rest = std::mem::take(&mut self.pending);
            self.apply(&rest)?;
        }
        if !self.done {
            return Err(OllamaGenerator::failure(
                "Stream ended before the final frame",
            ));
        }
        Ok(self.text)
    }
}

/// Ollama generate request
#[derive(Debug, Clone, Serialize)]
struct OllamaGenerateRequest {
    model: String,
    prompt: String,
    stream: bool,
}

/// One streamed response frame
#[derive(Debug, Deserialize)]
struct GenerateFrame {
    #[serde(default)]
    response: String,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
}
