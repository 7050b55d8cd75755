//! Input handler for the question loop using rustyline
//!
//! Provides readline editing with optional persistent history.

use anyhow::Result;
use rustyline::error::ReadlineError;
use rustyline::history::History;
use rustyline::DefaultEditor;
use std::path::PathBuf;

/// One line of user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Question(String),
    /// `lang <code>` switches the answer language
    SwitchLanguage(String),
    Blank,
    Exit,
}

/// Classify a trimmed line
pub fn classify(line: &str) -> Input {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        Input::Blank
    } else if trimmed.eq_ignore_ascii_case("exit") {
        Input::Exit
    } else if let Some(code) = trimmed.strip_prefix("lang ") {
        Input::SwitchLanguage(code.trim().to_string())
    } else {
        Input::Question(trimmed.to_string())
    }
}

/// Readline interface and question history
pub struct InputHandler {
    editor: DefaultEditor,
    history_path: Option<PathBuf>,
    prompt: String,
}

impl InputHandler {
    /// Create new input handler
    pub fn new() -> Result<Self> {
        let editor = DefaultEditor::new()?;

        Ok(InputHandler {
            editor,
            history_path: None,
            prompt: "Enter your query: ".to_string(),
        })
    }

    /// Create input handler with persistent history
    pub fn with_history(history_file: PathBuf) -> Result<Self> {
        let mut handler = Self::new()?;

        if history_file.exists() {
            let _ = handler.editor.load_history(&history_file);
        }
        handler.history_path = Some(history_file);

        Ok(handler)
    }

    /// Read one line. Ctrl-C and Ctrl-D both end the loop.
    pub fn read(&mut self) -> Result<Input> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                let input = classify(&line);
                if let Input::Question(ref question) = input {
                    let _ = self.editor.add_history_entry(question.as_str());
                }
                Ok(input)
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => Ok(Input::Exit),
            Err(err) => Err(anyhow::anyhow!("Readline error: {}", err)),
        }
    }

    /// Save history to disk
    pub fn save_history(&mut self) -> Result<()> {
        if let Some(ref path) = self.history_path {
            self.editor.save_history(path)?;
        }
        Ok(())
    }

    /// Get history size
    pub fn history_len(&self) -> usize {
        self.editor.history().len()
    }
}
