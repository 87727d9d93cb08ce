use std::time::Duration;

use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, CONTENT_TYPE},
    Client, StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::config::VectorConfig;
use crate::error::{PaperscoutError, Result};
use crate::models::ScoredChunk;
use crate::vector::VectorIndex;

/// Client for the Qdrant HTTP search API.
///
/// Payloads are expected in the shape the ingestion pipeline writes:
/// `{ "page_content": "...", "metadata": { "title": "..." } }`.
#[derive(Clone)]
pub struct QdrantIndex {
    client: Client,
    base_url: String,
    max_retries: u32,
}

impl QdrantIndex {
    pub fn new(config: &VectorConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        if let Some(ref api_key) = config.api_key {
            headers.insert(
                "api-key",
                HeaderValue::from_str(api_key).map_err(|e| {
                    PaperscoutError::VectorStore(format!("Invalid Qdrant API key header: {e}"))
                })?,
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                PaperscoutError::VectorStore(format!("Failed to create Qdrant HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            max_retries: config.max_retries,
        })
    }
}

#[derive(Debug, Serialize)]
struct SearchRequest<'a> {
    vector: &'a [f32],
    limit: u32,
    with_payload: bool,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    result: Vec<ScoredPoint>,
}

#[derive(Debug, Deserialize)]
struct ScoredPoint {
    score: f32,
    #[serde(default)]
    payload: Option<ChunkPayload>,
}

#[derive(Debug, Deserialize)]
struct ChunkPayload {
    #[serde(default)]
    page_content: Option<String>,
    #[serde(default)]
    metadata: Option<ChunkMetadata>,
}

#[derive(Debug, Deserialize)]
struct ChunkMetadata {
    #[serde(default)]
    title: Option<String>,
}

impl From<ScoredPoint> for ScoredChunk {
    fn from(point: ScoredPoint) -> Self {
        let (content, title) = match point.payload {
            Some(payload) => (
                payload.page_content.unwrap_or_default(),
                payload.metadata.and_then(|m| m.title),
            ),
            None => (String::new(), None),
        };

        Self {
            content,
            title,
            score: point.score,
        }
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn search(
        &self,
        collection: &str,
        vector: &[f32],
        limit: u32,
    ) -> Result<Vec<ScoredChunk>> {
        let url = format!("{}/collections/{collection}/points/search", self.base_url);
        let request = SearchRequest {
            vector,
            limit,
            with_payload: true,
        };

        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(100 * 2_u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
            }

            let response = self.client.post(&url).json(&request).send().await;

            match response {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        let body: SearchResponse = resp.json().await.map_err(|e| {
                            PaperscoutError::VectorStore(format!(
                                "Failed to parse Qdrant search response: {e}"
                            ))
                        })?;
                        return Ok(body.result.into_iter().map(Into::into).collect());
                    }

                    if status == StatusCode::NOT_FOUND {
                        return Err(PaperscoutError::VectorStore(format!(
                            "Collection not found: {collection}"
                        )));
                    }

                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(PaperscoutError::ApiAuth(body));
                    }

                    let body = resp.text().await.unwrap_or_default();
                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        last_error = Some(PaperscoutError::VectorStore(format!(
                            "Qdrant search failed ({status}): {body}"
                        )));
                        continue;
                    }

                    return Err(PaperscoutError::VectorStore(format!(
                        "Qdrant search failed ({status}): {body}"
                    )));
                }
                Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                    last_error = Some(PaperscoutError::VectorStore(format!(
                        "Qdrant request error: {e}"
                    )));
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            PaperscoutError::VectorStore("Qdrant search failed after retries".to_string())
        }))
    }
}
