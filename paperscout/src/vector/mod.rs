mod qdrant;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::ScoredChunk;

pub use qdrant::QdrantIndex;

/// k-nearest-neighbor search against a named collection of chunk embeddings.
///
/// Implementations return hits ordered by the index's own ranking, best
/// first. That order is load-bearing: recommendation tie-breaks resolve to
/// the first-seen title.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: u32,
    ) -> Result<Vec<ScoredChunk>>;
}
