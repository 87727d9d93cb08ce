use std::path::Path;

use crate::archive::PaperArchive;
use crate::config::ArchiveConfig;
use crate::error::{PaperscoutError, Result};
use crate::models::PaperMetadata;

/// The paper metadata table, loaded once at startup and immutable for the
/// process lifetime.
#[derive(Debug, Clone)]
pub struct PaperCatalog {
    rows: Vec<PaperMetadata>,
}

impl PaperCatalog {
    /// Load the catalog CSV from the archive.
    pub async fn load(archive: &dyn PaperArchive, config: &ArchiveConfig) -> Result<Self> {
        let bytes = archive.get_object(&config.metadata_key).await?;
        Self::from_csv_bytes(&bytes)
    }

    /// Load the catalog from a local CSV file (development convenience).
    pub fn from_csv_path(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::from_csv_bytes(&bytes)
    }

    pub fn from_csv_bytes(bytes: &[u8]) -> Result<Self> {
        let mut reader = csv::Reader::from_reader(bytes);
        let rows = reader
            .deserialize()
            .collect::<std::result::Result<Vec<PaperMetadata>, _>>()?;

        if rows.is_empty() {
            return Err(PaperscoutError::Catalog(
                "Metadata CSV contained no paper rows".to_string(),
            ));
        }

        Ok(Self { rows })
    }

    /// Row for an exact title match, as produced by the recommender.
    pub fn by_title(&self, title: &str) -> Option<&PaperMetadata> {
        self.rows.iter().find(|row| row.title == title)
    }

    pub fn by_pmid(&self, pmid: &str) -> Option<&PaperMetadata> {
        self.rows.iter().find(|row| row.pmid == pmid)
    }

    pub fn papers(&self) -> &[PaperMetadata] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
