//! Paper catalog and page-image DTOs for the v1 API.

use serde::{Deserialize, Serialize};

use crate::models::PaperMetadata;

/// One catalog row.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaperDto {
    pub author: String,
    pub pmid: String,
    pub url: String,
    pub title: String,
}

impl From<&PaperMetadata> for PaperDto {
    fn from(paper: &PaperMetadata) -> Self {
        Self {
            author: paper.author.clone(),
            pmid: paper.pmid.clone(),
            url: paper.url.clone(),
            title: paper.title.clone(),
        }
    }
}

/// Response for `GET /v1/papers`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListPapersResponse {
    pub papers: Vec<PaperDto>,
}

/// Response for `GET /v1/papers/covers`: one first-page image key per paper,
/// for the browsing gallery.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CoversResponse {
    pub keys: Vec<String>,
}

/// Response for `GET /v1/papers/{pmid}/pages`.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaperPagesResponse {
    pub pmid: String,
    pub page_count: usize,
    /// Derived page-image keys, in page order.
    pub keys: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paper_dto_serializes_camel_case() {
        let paper = PaperMetadata {
            author: "Smith et al.".to_string(),
            pmid: "31209134".to_string(),
            url: "https://pubmed.ncbi.nlm.nih.gov/31209134/".to_string(),
            title: "Single-cell skin atlas".to_string(),
        };
        let dto = PaperDto::from(&paper);
        let json = serde_json::to_value(&dto).expect("serialize");
        assert_eq!(json["pmid"], "31209134");
        assert_eq!(json["title"], "Single-cell skin atlas");
    }

    #[test]
    fn pages_response_serializes_page_count() {
        let resp = PaperPagesResponse {
            pmid: "31209134".to_string(),
            page_count: 2,
            keys: vec!["data/pdf-images/PDF-IMG-31209134/page_1.jpg".to_string()],
        };
        let json = serde_json::to_value(&resp).expect("serialize");
        assert!(json.get("pageCount").is_some());
    }
}
