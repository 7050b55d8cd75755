// Answer composition: refusal branch or backend call, marker-prefixed
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

use crate::errors::Result;
use crate::generation::Generator;
use crate::rag::context::ContextBuilder;
use crate::rag::types::{AnswerOutcome, Language};

/// Composed answer plus how long the backend took
#[derive(Debug, Clone)]
pub struct ComposedAnswer {
    /// Marker-prefixed answer text
    pub text: String,
    pub outcome: AnswerOutcome,
    pub latency_ms: f64,
}

/// Fixed answer when no context was retrieved
pub fn refusal(language: Language) -> &'static str {
    match language {
        Language::En => {
            "I cannot answer this question based on the provided documents. Please try another query."
        }
        Language::Ar => {
            "لا يمكنني الإجابة على هذا السؤال بناءً على المستندات المقدمة. يرجى تجربة استعلام آخر."
        }
    }
}

/// Turns retrieved chunk texts into a language-marked answer
pub struct AnswerComposer {
    generator: Arc<dyn Generator>,
    context_builder: ContextBuilder,
}

impl AnswerComposer {
    pub fn new(generator: Arc<dyn Generator>) -> Self {
        Self {
            generator,
            context_builder: ContextBuilder::new(),
        }
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    /// Compose an answer. Empty context never reaches the backend.
    pub async fn compose(
        &self,
        query: &str,
        context: &[String],
        language: Language,
    ) -> Result<ComposedAnswer> {
        let started = Instant::now();

        if context.is_empty() {
            return Ok(ComposedAnswer {
                text: format!("{}{}", language.marker(), refusal(language)),
                outcome: AnswerOutcome::Refused,
                latency_ms: elapsed_ms(started),
            });
        }

        let prompt = self.context_builder.build(query, context, language);
        let generated = self.generator.generate(&prompt).await?;
        let latency_ms = elapsed_ms(started);

        debug!(
            backend = self.generator.name(),
            latency_ms,
            chunks = context.len(),
            "Answer generated"
        );

        Ok(ComposedAnswer {
            text: format!("{}{}", language.marker(), generated),
            outcome: AnswerOutcome::Answered,
            latency_ms,
        })
    }
}

fn elapsed_ms(started: Instant) -> f64 {
    started.elapsed().as_secs_f64() * 1000.0
}
