//! Interactive question loop
//!
//! Reads questions with rustyline, answers them from a shared pipeline and
//! prints the answer, citations and report after each one.

pub mod display;
pub mod input;

use anyhow::Result;
use std::time::Instant;

use crate::rag::pipeline::RagPipeline;
use crate::rag::types::Language;
pub use crate::repl::display::RenderOptions;
use crate::repl::input::{Input, InputHandler};

/// Rendered outcome of one question
#[derive(Debug, Clone)]
pub struct Rendered {
    pub text: String,
    pub failed: bool,
}

/// Answer `question` and render it for the terminal
pub async fn answer_question(
    pipeline: &RagPipeline,
    question: &str,
    language: Language,
    top_k: usize,
    backend: &str,
    options: RenderOptions,
) -> Rendered {
    let started = Instant::now();
    match pipeline.query(question, language, top_k).await {
        Ok(result) => Rendered {
            text: display::answer(&result, started.elapsed(), backend, options),
            failed: false,
        },
        Err(e) => Rendered {
            text: display::error(&e, options),
            failed: true,
        },
    }
}

/// Question loop session
pub struct ReplSession<'a> {
    pipeline: &'a RagPipeline,
    input: InputHandler,
    language: Language,
    top_k: usize,
    backend: String,
    options: RenderOptions,
}

impl<'a> ReplSession<'a> {
    /// Create a session; history is kept in ~/.ragbuddy_history when possible
    pub fn new(
        pipeline: &'a RagPipeline,
        language: Language,
        top_k: usize,
        backend: &str,
        options: RenderOptions,
    ) -> Result<Self> {
        let input = match dirs::home_dir() {
            Some(home) => InputHandler::with_history(home.join(".ragbuddy_history"))?,
            None => InputHandler::new()?,
        };

        Ok(Self {
            pipeline,
            input,
            language,
            top_k,
            backend: backend.to_string(),
            options,
        })
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// Run until `exit`, Ctrl-C or Ctrl-D
    pub async fn run(&mut self) -> Result<()> {
        println!(
            "{}",
            display::banner(&self.pipeline.stats(), self.language, &self.backend)
        );

        loop {
            match self.input.read()? {
                Input::Exit => break,
                Input::Blank => continue,
                Input::SwitchLanguage(code) => match code.parse::<Language>() {
                    Ok(language) => {
                        self.language = language;
                        println!("Answer language: {}", language);
                    }
                    Err(e) => eprintln!("{}", e),
                },
                Input::Question(question) => {
                    let rendered = answer_question(
                        self.pipeline,
                        &question,
                        self.language,
                        self.top_k,
                        &self.backend,
                        self.options,
                    )
                    .await;
                    if rendered.failed {
                        eprintln!("{}", rendered.text);
                    } else {
                        println!("{}", rendered.text);
                    }
                }
            }
        }

        self.input.save_history()?;
        Ok(())
    }
}
