// Retrieval-augmented answering over a local document corpus
//
// Components:
// - Ingest: Load documents from disk
// - Chunker: Overlapping, boundary-aware text chunks
// - Embedding: Deterministic placeholder vectors
// - Index: Nearest-neighbor search with a degraded fallback
// - Retrieval: Immutable index snapshots and top-k lookup
// - Context / Composer: Prompt assembly and language-marked answers
// - Pipeline: End-to-end orchestration

pub mod chunker;
pub mod composer;
pub mod context;
pub mod embedding;
pub mod index;
pub mod ingest;
pub mod pipeline;
pub mod retrieval;
pub mod types;

// Re-export key types
pub use chunker::{ChunkerConfig, TextChunker};
pub use composer::AnswerComposer;
pub use context::ContextBuilder;
pub use embedding::{Embedder, HashEmbedder};
pub use index::{IndexBackend, IndexMode, VectorIndex};
pub use pipeline::{PipelineStats, RagConfig, RagPipeline};
pub use retrieval::{IndexSnapshot, RetrievalEngine};
pub use types::{AnswerOutcome, Chunk, ChunkId, Language, QueryResult};
