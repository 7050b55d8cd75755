// Core data model shared by the retrieval pipeline
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::errors::{RagError, Result};
use crate::rag::index::IndexMode;

/// Answer language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    En,
    Ar,
}

impl Language {
    /// ISO code used on the query interface
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ar => "ar",
        }
    }

    /// Prefix every answer in this language starts with
    pub fn marker(&self) -> &'static str {
        match self {
            Language::En => "English Answer: ",
            Language::Ar => "الإجابة العربية: ",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Language::En),
            "ar" => Ok(Language::Ar),
            other => Err(RagError::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Chunk identifier, `"{source}_chunk_{ordinal}"`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ChunkId(String);

const CHUNK_ID_INFIX: &str = "_chunk_";

impl ChunkId {
    pub fn new(source: &str, ordinal: usize) -> Self {
        ChunkId(format!("{}{}{}", source, CHUNK_ID_INFIX, ordinal))
    }

    /// Split back into `(source, ordinal)`
    pub fn parts(&self) -> Result<(&str, usize)> {
        let (source, ordinal) = self
            .0
            .rsplit_once(CHUNK_ID_INFIX)
            .ok_or_else(|| RagError::InvalidChunkId(self.0.clone()))?;
        let ordinal = ordinal
            .parse::<usize>()
            .map_err(|_| RagError::InvalidChunkId(self.0.clone()))?;
        Ok((source, ordinal))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ChunkId {
    type Err = RagError;

    fn from_str(s: &str) -> Result<Self> {
        let id = ChunkId(s.to_string());
        id.parts()?;
        Ok(id)
    }
}

/// A bounded slice of one document, the unit that gets indexed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: ChunkId,
    pub source: String,
    pub text: String,
    /// Byte offset of the slice in the source document
    pub start: usize,
    /// Exclusive end byte offset
    pub end: usize,
}

/// How a query ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerOutcome {
    /// The generation backend produced the answer
    Answered,
    /// No context was retrieved; the fixed refusal was returned
    Refused,
}

/// Result of one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResult {
    pub answer: String,
    pub citations: BTreeSet<String>,
    pub retrieved_chunks: Vec<String>,
    /// Distances aligned with `retrieved_chunks`
    pub distances: Vec<f32>,
    pub latency_ms: f64,
    pub cost_usd: f64,
    pub outcome: AnswerOutcome,
    pub index_mode: IndexMode,
}

impl QueryResult {
    pub fn is_refusal(&self) -> bool {
        self.outcome == AnswerOutcome::Refused
    }
}
