use serde::{Deserialize, Serialize};

/// One similarity-search hit: a document chunk with its relevance score and
/// the paper title carried in the chunk's payload metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredChunk {
    pub content: String,
    /// Title from the chunk's payload metadata. Chunks ingested without a
    /// title tag surface as `None` and are skipped by the recommender.
    pub title: Option<String>,
    pub score: f32,
}
