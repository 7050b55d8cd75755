//! Generation backends
//!
//! The answer composer only needs one call: turn a prompt into text. The
//! deterministic mock backend and the Ollama HTTP backend both implement
//! `Generator` and are interchangeable.

pub mod mock;
pub mod ollama;

use async_trait::async_trait;

use crate::errors::Result;
use crate::rag::types::Language;

pub use mock::MockGenerator;
pub use ollama::{OllamaGenerator, DEFAULT_MODEL, DEFAULT_OLLAMA_URL};

/// A rendered prompt together with the parts it was rendered from
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    /// Full instruction text sent to a model
    pub text: String,
    pub query: String,
    pub context: Vec<String>,
    pub language: Language,
}

impl Prompt {
    /// Context chunks joined the way they appear in `text`
    pub fn joined_context(&self) -> String {
        self.context.join("\n")
    }
}

/// Text generation backend
#[async_trait]
pub trait Generator: Send + Sync {
    /// Produce an answer for `prompt`
    async fn generate(&self, prompt: &Prompt) -> Result<String>;

    /// Short backend name used in logs and errors
    fn name(&self) -> &str;
}
