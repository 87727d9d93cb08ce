use serde::{Deserialize, Serialize};

/// One row of the paper metadata table, as stored in the archive CSV.
///
/// Column order and headers follow the archive file:
/// `Author,PMID,URL,Title`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PaperMetadata {
    #[serde(rename = "Author")]
    pub author: String,
    #[serde(rename = "PMID")]
    pub pmid: String,
    #[serde(rename = "URL")]
    pub url: String,
    #[serde(rename = "Title")]
    pub title: String,
}
