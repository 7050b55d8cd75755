// End-to-end RAG pipeline: ingest -> chunk -> embed -> index, then query
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

use crate::errors::{RagError, Result};
use crate::generation::Generator;
use crate::rag::chunker::{ChunkerConfig, TextChunker};
use crate::rag::composer::AnswerComposer;
use crate::rag::embedding::{Embedder, HashEmbedder, EMBEDDING_DIM};
use crate::rag::index::{IndexBackend, IndexMode};
use crate::rag::ingest::load_documents;
use crate::rag::retrieval::{IndexSnapshot, RetrievalEngine};
use crate::rag::types::{AnswerOutcome, ChunkId, Language, QueryResult};

/// Embedding configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Vector width of the placeholder embedder
    pub dimension: usize,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            dimension: EMBEDDING_DIM,
        }
    }
}

/// Vector index configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexConfig {
    /// Search backend to use
    #[serde(default)]
    pub backend: IndexBackend,
    /// Seed for degraded-mode picks (random when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_seed: Option<u64>,
}

/// Query defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Chunks retrieved per query when the caller does not say
    pub default_top_k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { default_top_k: 3 }
    }
}

/// Per-query cost estimate
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostConfig {
    /// USD charged per 1000 characters of query text
    pub usd_per_1k_query_chars: f64,
}

impl Default for CostConfig {
    fn default() -> Self {
        Self {
            usd_per_1k_query_chars: 0.001,
        }
    }
}

impl CostConfig {
    pub fn estimate(&self, query: &str) -> f64 {
        self.usd_per_1k_query_chars * query.chars().count() as f64 / 1000.0
    }
}

/// RAG pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RagConfig {
    #[serde(default)]
    pub chunking: ChunkerConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub cost: CostConfig,
}

impl RagConfig {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;
        if self.embedding.dimension == 0 {
            return Err(RagError::Config(
                "embedding dimension must be greater than 0".to_string(),
            ));
        }
        if self.retrieval.default_top_k == 0 {
            return Err(RagError::Config(
                "default_top_k must be at least 1".to_string(),
            ));
        }
        if !self.cost.usd_per_1k_query_chars.is_finite() || self.cost.usd_per_1k_query_chars < 0.0 {
            return Err(RagError::Config(
                "usd_per_1k_query_chars must be a non-negative number".to_string(),
            ));
        }
        Ok(())
    }
}

/// Size and mode of the live index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineStats {
    pub documents: usize,
    pub chunks: usize,
    pub dimension: usize,
    pub index_mode: IndexMode,
}

/// End-to-end RAG pipeline.
///
/// Construction does all ingestion and indexing; afterwards queries only
/// read. `rebuild` prepares a fresh snapshot and swaps it in whole, so a
/// shared pipeline can keep serving while it rebuilds.
pub struct RagPipeline {
    config: RagConfig,
    chunker: TextChunker,
    engine: RetrievalEngine,
    composer: AnswerComposer,
}

impl RagPipeline {
    /// Create pipeline with default configuration
    pub fn new<P: AsRef<Path>>(paths: &[P], generator: Arc<dyn Generator>) -> Result<Self> {
        Self::with_config(paths, RagConfig::default(), generator)
    }

    /// Create with custom configuration and the placeholder embedder
    pub fn with_config<P: AsRef<Path>>(
        paths: &[P],
        config: RagConfig,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        let embedder = Arc::new(HashEmbedder::with_dimension(config.embedding.dimension));
        Self::with_embedder(paths, config, embedder, generator)
    }

    /// Create with a caller-supplied embedder
    pub fn with_embedder<P: AsRef<Path>>(
        paths: &[P],
        config: RagConfig,
        embedder: Arc<dyn Embedder>,
        generator: Arc<dyn Generator>,
    ) -> Result<Self> {
        config.validate()?;
        let chunker = TextChunker::new(config.chunking.clone())?;

        let snapshot = build_snapshot(paths, &chunker, embedder.as_ref(), &config)?;

        let mut engine = RetrievalEngine::new(embedder, snapshot);
        if let Some(seed) = config.index.fallback_seed {
            engine = engine.with_fallback_seed(seed);
        }

        Ok(Self {
            config,
            chunker,
            engine,
            composer: AnswerComposer::new(generator),
        })
    }

    /// Re-ingest `paths` and atomically replace the live index
    pub fn rebuild<P: AsRef<Path>>(&self, paths: &[P]) -> Result<PipelineStats> {
        let snapshot = build_snapshot(
            paths,
            &self.chunker,
            self.engine.embedder().as_ref(),
            &self.config,
        )?;
        self.engine.swap(snapshot);
        Ok(self.stats())
    }

    /// Answer `query_text` in `language` from the `top_k` nearest chunks
    pub async fn query(
        &self,
        query_text: &str,
        language: Language,
        top_k: usize,
    ) -> Result<QueryResult> {
        let retrieved = self.engine.retrieve(query_text, top_k)?;
        let chunk_texts = retrieved.texts();

        let composed = match self
            .composer
            .compose(query_text, &chunk_texts, language)
            .await
        {
            Ok(composed) => composed,
            Err(e) => {
                warn!(
                    backend = self.composer.generator_name(),
                    error = %e,
                    "Generation failed after retrieval"
                );
                let citations = retrieved.citations.into_iter().collect();
                return Err(e.with_retrieval(citations, chunk_texts));
            }
        };

        let cost_usd = match composed.outcome {
            AnswerOutcome::Answered => self.config.cost.estimate(query_text),
            AnswerOutcome::Refused => 0.0,
        };

        Ok(QueryResult {
            answer: composed.text,
            citations: retrieved.citations,
            retrieved_chunks: chunk_texts,
            distances: retrieved.distances,
            latency_ms: composed.latency_ms,
            cost_usd,
            outcome: composed.outcome,
            index_mode: retrieved.mode,
        })
    }

    /// Query with the configured default `top_k`
    pub async fn ask(&self, query_text: &str, language: Language) -> Result<QueryResult> {
        self.query(query_text, language, self.config.retrieval.default_top_k)
            .await
    }

    /// Current document/chunk counts and index mode
    pub fn stats(&self) -> PipelineStats {
        let snapshot = self.engine.snapshot();
        PipelineStats {
            documents: snapshot.document_count(),
            chunks: snapshot.chunks().len(),
            dimension: self.engine.embedder().dimension(),
            index_mode: snapshot.index().mode(),
        }
    }

    /// Live snapshot, for inspection
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.engine.snapshot()
    }

    /// Source document of a chunk in the live snapshot
    pub fn source_of(&self, id: &ChunkId) -> Option<String> {
        self.engine.snapshot().source_of(id).map(str::to_string)
    }

    pub fn config(&self) -> &RagConfig {
        &self.config
    }
}

fn build_snapshot<P: AsRef<Path>>(
    paths: &[P],
    chunker: &TextChunker,
    embedder: &dyn Embedder,
    config: &RagConfig,
) -> Result<IndexSnapshot> {
    let started = Instant::now();

    let documents = load_documents(paths);
    if documents.is_empty() {
        warn!(requested = paths.len(), "No documents loaded; index will be empty");
    }

    let snapshot = IndexSnapshot::build(&documents, chunker, embedder, config.index.backend)?;
    let index = snapshot.index();

    if index.is_degraded() && !snapshot.chunks().is_empty() {
        warn!("Vector search unavailable; queries will use random fallback selection");
    }

    info!(
        documents = documents.len(),
        chunks = snapshot.chunks().len(),
        dimension = embedder.dimension(),
        mode = ?index.mode(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        "RAG index built"
    );

    Ok(snapshot)
}
