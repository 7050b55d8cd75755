// Embedding providers: text -> fixed-width vector
use sha2::{Digest, Sha256};

/// Width of the placeholder embedding
pub const EMBEDDING_DIM: usize = 128;

/// Maps text to a fixed-length vector.
///
/// Implementations must be deterministic: the same text yields the same
/// vector for the lifetime of the process.
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    fn embed(&self, text: &str) -> Vec<f32>;

    /// Length of every vector this embedder returns
    fn dimension(&self) -> usize;

    /// Generate embeddings for multiple texts
    fn embed_batch(&self, texts: &[&str]) -> Vec<Vec<f32>> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

/// Hash-derived placeholder embedder.
///
/// Component `i` is `(h mod (i + 1)) / (i + 1)` where `h` is the SHA-256 of
/// the text read as a big-endian integer. Stable across processes, carries
/// no semantic meaning.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dimension: usize,
}

impl HashEmbedder {
    pub fn new() -> Self {
        Self::with_dimension(EMBEDDING_DIM)
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl Embedder for HashEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let digest = Sha256::digest(text.as_bytes());

        (0..self.dimension)
            .map(|i| {
                let modulus = (i + 1) as u64;
                (digest_mod(&digest, modulus) as f64 / modulus as f64) as f32
            })
            .collect()
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

/// Big-endian byte string reduced modulo `m`
fn digest_mod(bytes: &[u8], m: u64) -> u64 {
    bytes
        .iter()
        .fold(0u64, |acc, &b| (acc * 256 + b as u64) % m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck_macros::quickcheck;

    #[test]
    fn test_embedding_dimension() {
        let engine = HashEmbedder::new();
        assert_eq!(engine.dimension(), 128);
        assert_eq!(engine.embed("Hello world").len(), 128);
    }

    #[test]
    fn test_embedding_matches_reference_values() {
        let emb = HashEmbedder::new().embed("Fox is an animal.");
        let expected = [0.0, 0.5, 0.0, 0.25, 0.6, 0.5, 0.2857143, 0.625];
        for (i, (got, want)) in emb[..8].iter().zip(expected.iter()).enumerate() {
            assert!((got - want).abs() < 1e-6, "component {}: {} != {}", i, got, want);
        }
        assert!((emb[127] - 0.4765625).abs() < 1e-6);
    }

    #[test]
    fn test_first_component_is_zero() {
        // Everything is divisible by 1
        let engine = HashEmbedder::new();
        assert_eq!(engine.embed("anything")[0], 0.0);
    }

    #[test]
    fn test_components_in_unit_interval() {
        let engine = HashEmbedder::new();
        let v = engine.embed("The quick brown fox");
        assert!(v.iter().all(|x| (0.0..1.0).contains(x)));
    }

    #[test]
    fn test_digest_mod_matches_small_integer() {
        // 0x01_02 = 258
        assert_eq!(digest_mod(&[0x01, 0x02], 7), 258 % 7);
        assert_eq!(digest_mod(&[0xff; 32], 1), 0);
    }

    #[test]
    fn test_embed_batch() {
        let engine = HashEmbedder::new();
        let texts = vec!["Hello", "World", "Test"];
        let embeddings = engine.embed_batch(&texts);
        assert_eq!(embeddings.len(), 3);
        assert!(embeddings.iter().all(|e| e.len() == 128));
        assert_eq!(embeddings[1], engine.embed("World"));
    }

    #[test]
    fn test_embed_empty_batch() {
        let engine = HashEmbedder::new();
        assert!(engine.embed_batch(&[]).is_empty());
    }

    #[test]
    fn test_different_texts_differ() {
        let engine = HashEmbedder::new();
        assert_ne!(engine.embed("fox"), engine.embed("dog"));
    }

    #[quickcheck]
    fn prop_embedding_is_deterministic(text: String) -> bool {
        let engine = HashEmbedder::new();
        let a = engine.embed(&text);
        let b = HashEmbedder::new().embed(&text);
        a.len() == EMBEDDING_DIM
            && a.iter().zip(&b).all(|(x, y)| x.to_bits() == y.to_bits())
    }
}
