//! RagBuddy - Bilingual retrieval-augmented question answering
//!
//! Loads local text documents, splits them into overlapping chunks, embeds
//! and indexes the chunks, then answers English or Arabic questions from
//! the nearest chunks with source citations.
//!
//! # Architecture
//!
//! - **rag**: chunking, embedding, vector index, retrieval and answer composition
//! - **generation**: answer backends (deterministic mock, Ollama)
//! - **cli** / **repl**: command line, configuration and the question loop

pub mod errors;
pub mod generation;
pub mod rag;

// Re-export commonly used types
pub use errors::{RagError, Result};
pub use rag::{Language, QueryResult, RagPipeline};

// Command line and interactive surface
pub mod cli;
pub mod logging;
pub mod repl;
