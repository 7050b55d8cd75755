// Deterministic generation backend for offline use and tests
use async_trait::async_trait;

use super::{Generator, Prompt};
use crate::errors::Result;
use crate::rag::types::Language;

/// Words ignored by the relevance check
const STOP_WORDS: &[&str] = &[
    "a", "an", "the", "is", "are", "was", "were", "what", "where", "when", "why", "how", "of",
    "in", "on", "for", "with", "and", "or", "but", "i", "you", "he", "she", "it", "we", "they",
    "me", "him", "her", "us", "them", "my", "your", "his", "our", "their", "france", "capital",
];

/// Characters of context quoted in a relevant answer
const PREVIEW_CHARS: usize = 150;

/// Answers from the prompt's own context without calling a model.
///
/// Output is a pure function of the prompt's query, context and language.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator;

impl MockGenerator {
    pub fn new() -> Self {
        Self
    }
}

/// Query words that survive stop-word filtering
pub fn content_terms(query: &str) -> Vec<String> {
    query
        .split_whitespace()
        .map(|word| {
            word.to_lowercase()
                .trim_matches(|c| matches!(c, '?' | '!' | '.' | ','))
                .to_string()
        })
        .filter(|word| !STOP_WORDS.contains(&word.as_str()))
        .collect()
}

/// True when any content term occurs in `context` (case-insensitive substring)
pub fn is_relevant(query: &str, context: &str) -> bool {
    let haystack = context.to_lowercase();
    content_terms(query)
        .iter()
        .any(|term| haystack.contains(term.as_str()))
}

#[async_trait]
impl Generator for MockGenerator {
    async fn generate(&self, prompt: &Prompt) -> Result<String> {
        let context = prompt.joined_context();

        if !is_relevant(&prompt.query, &context) {
            return Ok(match prompt.language {
                Language::En => {
                    "I found some context, but it's not directly answering the query.".to_string()
                }
                Language::Ar => "لقد وجدت بعض السياق، لكنه لا يجيب مباشرة على الاستعلام.".to_string(),
            });
        }

        let preview: String = context.chars().take(PREVIEW_CHARS).collect();
        Ok(match prompt.language {
            Language::En => format!(
                "Based on the documents, regarding '{}', some related information is: '{}...'",
                prompt.query, preview
            ),
            Language::Ar => format!(
                "بناءً على المستندات، بخصوص '{}'، بعض المعلومات ذات الصلة هي: '{}...'",
                prompt.query, preview
            ),
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
