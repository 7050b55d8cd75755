//! Vector index over chunk embeddings
//!
//! Built once from the full embedding set and never mutated afterwards.
//! When the nearest-neighbour backend is unavailable (compiled without the
//! `flat-index` feature, or disabled in configuration) the index still
//! builds, reports `IndexMode::Degraded`, and answers searches by picking a
//! single chunk at random.

#[cfg(feature = "flat-index")]
mod flat;

#[cfg(feature = "flat-index")]
pub use flat::{squared_l2, FlatL2Index};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::{RagError, Result};

/// Distance reported for fallback selections
pub const FALLBACK_DISTANCE: f32 = 0.0;

/// Whether searches are similarity-ranked or fallback picks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexMode {
    Indexed,
    Degraded,
}

/// Requested search backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum IndexBackend {
    /// Exact squared-L2 search
    #[default]
    Flat,
    /// Always use the fallback policy
    Disabled,
}

impl IndexBackend {
    /// True when this backend can actually run in this build
    pub fn is_available(&self) -> bool {
        match self {
            IndexBackend::Flat => cfg!(feature = "flat-index"),
            IndexBackend::Disabled => false,
        }
    }
}

/// One search hit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Neighbor {
    /// Position in the chunk list the index was built from
    pub ordinal: usize,
    /// Squared L2 distance, or `FALLBACK_DISTANCE` in degraded mode
    pub distance: f32,
}

#[derive(Debug, Clone)]
enum Backend {
    #[cfg(feature = "flat-index")]
    Flat(FlatL2Index),
    Fallback,
}

/// Immutable index handle
#[derive(Debug, Clone)]
pub struct VectorIndex {
    mode: IndexMode,
    rows: usize,
    dimension: usize,
    backend: Backend,
}

impl VectorIndex {
    /// Build over `embeddings`. Row count and width are fixed from here on.
    pub fn build(embeddings: &[Vec<f32>], requested: IndexBackend) -> Result<Self> {
        let dimension = embeddings.first().map(Vec::len).unwrap_or(0);
        for (row, embedding) in embeddings.iter().enumerate() {
            if embedding.len() != dimension {
                return Err(RagError::DimensionMismatch {
                    row,
                    expected: dimension,
                    actual: embedding.len(),
                });
            }
        }

        if !requested.is_available() {
            if requested == IndexBackend::Flat {
                warn!("Vector search backend not compiled in; using fallback selection");
            }
            return Ok(Self {
                mode: IndexMode::Degraded,
                rows: embeddings.len(),
                dimension,
                backend: Backend::Fallback,
            });
        }

        #[cfg(feature = "flat-index")]
        {
            Ok(Self {
                mode: IndexMode::Indexed,
                rows: embeddings.len(),
                dimension,
                backend: Backend::Flat(FlatL2Index::from_rows(dimension, embeddings)),
            })
        }

        #[cfg(not(feature = "flat-index"))]
        {
            Ok(Self {
                mode: IndexMode::Degraded,
                rows: embeddings.len(),
                dimension,
                backend: Backend::Fallback,
            })
        }
    }

    /// Index over zero chunks
    pub fn empty(requested: IndexBackend) -> Self {
        let mode = if requested.is_available() {
            IndexMode::Indexed
        } else {
            IndexMode::Degraded
        };
        Self {
            mode,
            rows: 0,
            dimension: 0,
            backend: Backend::Fallback,
        }
    }

    pub fn mode(&self) -> IndexMode {
        self.mode
    }

    pub fn is_degraded(&self) -> bool {
        self.mode == IndexMode::Degraded
    }

    /// Number of indexed rows
    pub fn len(&self) -> usize {
        self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows == 0
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Nearest neighbours of `query`, nearest first, at most `min(top_k, len)`
    pub fn search(&self, query: &[f32], top_k: usize) -> Vec<Neighbor> {
        self.search_with_rng(query, top_k, &mut rand::thread_rng())
    }

    /// Same as `search`, drawing fallback picks from `rng`
    pub fn search_with_rng<R: Rng + ?Sized>(
        &self,
        query: &[f32],
        top_k: usize,
        rng: &mut R,
    ) -> Vec<Neighbor> {
        if self.rows == 0 || top_k == 0 {
            return Vec::new();
        }

        match &self.backend {
            #[cfg(feature = "flat-index")]
            Backend::Flat(flat) => {
                if query.len() != self.dimension {
                    warn!(
                        expected = self.dimension,
                        actual = query.len(),
                        "Query vector width does not match index"
                    );
                    return Vec::new();
                }
                flat.search(query, top_k.min(self.rows))
            }
            Backend::Fallback => vec![Neighbor {
                ordinal: rng.gen_range(0..self.rows),
                distance: FALLBACK_DISTANCE,
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rows(n: usize, dim: usize) -> Vec<Vec<f32>> {
        (0..n)
            .map(|i| (0..dim).map(|j| ((i * 7 + j * 3) % 11) as f32).collect())
            .collect()
    }

    #[test]
    fn test_empty_build_returns_no_results() {
        let index = VectorIndex::build(&[], IndexBackend::Flat).unwrap();
        assert!(index.is_empty());
        assert!(index.search(&[0.0; 4], 3).is_empty());

        let degraded = VectorIndex::empty(IndexBackend::Disabled);
        assert!(degraded.search(&[0.0; 4], 3).is_empty());
    }

    #[test]
    fn test_dimension_mismatch_rejected() {
        let bad = vec![vec![0.0; 4], vec![0.0; 3]];
        let err = VectorIndex::build(&bad, IndexBackend::Flat).unwrap_err();
        assert!(matches!(
            err,
            RagError::DimensionMismatch {
                row: 1,
                expected: 4,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_disabled_backend_is_degraded() {
        let index = VectorIndex::build(&rows(5, 4), IndexBackend::Disabled).unwrap();
        assert_eq!(index.mode(), IndexMode::Degraded);
        assert_eq!(index.len(), 5);

        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let hits = index.search_with_rng(&[0.0; 4], 3, &mut rng);
            assert_eq!(hits.len(), 1);
            assert!(hits[0].ordinal < 5);
            assert_eq!(hits[0].distance, FALLBACK_DISTANCE);
        }
    }

    #[test]
    fn test_fallback_is_reproducible_with_seed() {
        let index = VectorIndex::build(&rows(9, 2), IndexBackend::Disabled).unwrap();
        let pick = |seed| {
            let mut rng = StdRng::seed_from_u64(seed);
            index.search_with_rng(&[0.0; 2], 1, &mut rng)[0].ordinal
        };
        assert_eq!(pick(42), pick(42));
    }

    #[cfg(feature = "flat-index")]
    #[test]
    fn test_flat_backend_is_indexed() {
        let index = VectorIndex::build(&rows(3, 4), IndexBackend::Flat).unwrap();
        assert_eq!(index.mode(), IndexMode::Indexed);
        assert_eq!(index.dimension(), 4);

        let query = rows(3, 4)[2].clone();
        let hits = index.search(&query, 1);
        assert_eq!(hits[0].ordinal, 2);
        assert_eq!(hits[0].distance, 0.0);
    }

    #[cfg(feature = "flat-index")]
    #[test]
    fn test_wrong_query_width_yields_nothing() {
        let index = VectorIndex::build(&rows(3, 4), IndexBackend::Flat).unwrap();
        assert!(index.search(&[0.0; 2], 3).is_empty());
    }

    #[cfg(feature = "flat-index")]
    #[quickcheck]
    fn prop_search_sorted_and_capped(n: u8, k: u8, seed: u16) -> bool {
        let n = n as usize % 40;
        let k = (k as usize % 50) + 1;
        let data: Vec<Vec<f32>> = (0..n)
            .map(|i| {
                (0..8)
                    .map(|j| ((i * 31 + j * 17 + seed as usize) % 97) as f32 / 97.0)
                    .collect()
            })
            .collect();
        let index = VectorIndex::build(&data, IndexBackend::Flat).unwrap();
        let query: Vec<f32> = (0..8).map(|j| ((seed as usize + j) % 13) as f32 / 13.0).collect();
        let hits = index.search(&query, k);

        hits.len() <= k.min(n)
            && hits.len() == k.min(n)
            && hits.windows(2).all(|w| w[0].distance <= w[1].distance)
    }
}
