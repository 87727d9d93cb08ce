mod metadata;
mod s3;

use async_trait::async_trait;

use crate::error::Result;

pub use metadata::PaperCatalog;
pub use s3::S3Archive;

/// Read-only access to the object archive backing the corpus: the metadata
/// CSV and the per-page JPEG renders of each paper.
#[async_trait]
pub trait PaperArchive: Send + Sync {
    /// Fetch one object's bytes by key.
    async fn get_object(&self, key: &str) -> Result<Vec<u8>>;

    /// List every object key in the bucket, following pagination to the end.
    async fn list_keys(&self) -> Result<Vec<String>>;
}
