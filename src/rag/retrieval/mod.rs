// Retrieval: embed the query, search the live snapshot, map hits to chunks
pub mod engine;

pub use engine::{IndexSnapshot, RetrievalEngine, RetrievedContext};
