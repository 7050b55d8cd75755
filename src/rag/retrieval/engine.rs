// Retrieval engine over an atomically replaceable index snapshot
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tracing::debug;

use crate::errors::{RagError, Result};
use crate::rag::chunker::TextChunker;
use crate::rag::embedding::Embedder;
use crate::rag::index::{IndexBackend, IndexMode, VectorIndex};
use crate::rag::ingest::Document;
use crate::rag::types::{Chunk, ChunkId};

/// Chunks plus the index built over them.
///
/// Row `i` of the index is `chunks[i]`. A snapshot is never modified; a
/// rebuild produces a new one.
#[derive(Debug)]
pub struct IndexSnapshot {
    chunks: Vec<Chunk>,
    index: VectorIndex,
    document_count: usize,
    ordinals: HashMap<ChunkId, usize>,
}

impl IndexSnapshot {
    /// Chunk, embed and index `documents`
    pub fn build(
        documents: &[Document],
        chunker: &TextChunker,
        embedder: &dyn Embedder,
        backend: IndexBackend,
    ) -> Result<Self> {
        let chunks = chunk_documents(documents, chunker);

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        let embeddings = embedder.embed_batch(&texts);

        let index = if embeddings.is_empty() {
            VectorIndex::empty(backend)
        } else {
            VectorIndex::build(&embeddings, backend)?
        };

        let ordinals = chunks
            .iter()
            .enumerate()
            .map(|(ordinal, chunk)| (chunk.chunk_id.clone(), ordinal))
            .collect();

        Ok(Self {
            chunks,
            index,
            document_count: documents.len(),
            ordinals,
        })
    }

    /// Snapshot over no documents
    pub fn empty(backend: IndexBackend) -> Self {
        Self {
            chunks: Vec::new(),
            index: VectorIndex::empty(backend),
            document_count: 0,
            ordinals: HashMap::new(),
        }
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn index(&self) -> &VectorIndex {
        &self.index
    }

    pub fn document_count(&self) -> usize {
        self.document_count
    }

    pub fn chunk(&self, id: &ChunkId) -> Option<&Chunk> {
        self.ordinals.get(id).map(|&ordinal| &self.chunks[ordinal])
    }

    /// Source document of a chunk
    pub fn source_of(&self, id: &ChunkId) -> Option<&str> {
        self.chunk(id).map(|chunk| chunk.source.as_str())
    }
}

/// Split every document into chunks, numbering ordinals per document
pub fn chunk_documents(documents: &[Document], chunker: &TextChunker) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    for doc in documents {
        for (ordinal, span) in chunker.split_spans(&doc.text).into_iter().enumerate() {
            chunks.push(Chunk {
                chunk_id: ChunkId::new(&doc.source, ordinal),
                source: doc.source.clone(),
                text: span.slice(&doc.text).to_string(),
                start: span.start,
                end: span.end,
            });
        }
    }
    chunks
}

/// Chunks found for one query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievedContext {
    /// Hits in search order
    pub chunks: Vec<Chunk>,
    /// Distances aligned with `chunks`
    pub distances: Vec<f32>,
    /// Distinct sources of `chunks`
    pub citations: BTreeSet<String>,
    pub mode: IndexMode,
}

impl RetrievedContext {
    pub fn texts(&self) -> Vec<String> {
        self.chunks.iter().map(|c| c.text.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}

/// Retrieval engine for nearest-neighbour search over chunk embeddings
pub struct RetrievalEngine {
    embedder: Arc<dyn Embedder>,
    snapshot: RwLock<Arc<IndexSnapshot>>,
    fallback_rng: Option<Mutex<StdRng>>,
}

impl RetrievalEngine {
    /// Create engine serving `snapshot`
    pub fn new(embedder: Arc<dyn Embedder>, snapshot: IndexSnapshot) -> Self {
        Self {
            embedder,
            snapshot: RwLock::new(Arc::new(snapshot)),
            fallback_rng: None,
        }
    }

    /// Make degraded-mode picks reproducible
    pub fn with_fallback_seed(mut self, seed: u64) -> Self {
        self.fallback_rng = Some(Mutex::new(StdRng::seed_from_u64(seed)));
        self
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Current snapshot. Holding the `Arc` keeps it alive across a swap.
    pub fn snapshot(&self) -> Arc<IndexSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Replace the live snapshot, returning the previous one
    pub fn swap(&self, next: IndexSnapshot) -> Arc<IndexSnapshot> {
        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, Arc::new(next))
    }

    /// Retrieve up to `top_k` chunks for `query`
    pub fn retrieve(&self, query: &str, top_k: usize) -> Result<RetrievedContext> {
        if top_k == 0 {
            return Err(RagError::InvalidTopK);
        }

        let snapshot = self.snapshot();
        let index = snapshot.index();
        let query_embedding = self.embedder.embed(query);

        let neighbors = match &self.fallback_rng {
            Some(rng) if index.is_degraded() => {
                let mut rng = rng.lock().unwrap_or_else(PoisonError::into_inner);
                index.search_with_rng(&query_embedding, top_k, &mut *rng)
            }
            _ => index.search(&query_embedding, top_k),
        };

        let mut chunks = Vec::with_capacity(neighbors.len());
        let mut distances = Vec::with_capacity(neighbors.len());
        for hit in neighbors {
            if let Some(chunk) = snapshot.chunks().get(hit.ordinal) {
                chunks.push(chunk.clone());
                distances.push(hit.distance);
            }
        }

        let citations = chunks.iter().map(|c| c.source.clone()).collect();

        debug!(
            hits = chunks.len(),
            top_k,
            mode = ?index.mode(),
            "Retrieved context"
        );

        Ok(RetrievedContext {
            chunks,
            distances,
            citations,
            mode: index.mode(),
        })
    }
}
