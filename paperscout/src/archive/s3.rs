use std::time::Duration;

use async_trait::async_trait;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::{
    header::{HeaderMap, HeaderValue, AUTHORIZATION},
    Client, StatusCode,
};

use crate::archive::PaperArchive;
use crate::config::ArchiveConfig;
use crate::error::{PaperscoutError, Result};

/// S3-compatible REST client for the read-only corpus bucket.
///
/// Objects are fetched with plain `GET {endpoint}/{bucket}/{key}` and the
/// bucket is enumerated with ListObjectsV2. Access is anonymous or through a
/// bearer-token gateway; request signing is not implemented because the
/// archive is static, world-readable data.
#[derive(Clone)]
pub struct S3Archive {
    client: Client,
    endpoint: String,
    bucket: String,
    max_retries: u32,
}

impl S3Archive {
    pub fn new(config: &ArchiveConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();

        if let Some(ref token) = config.access_token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
                    PaperscoutError::Archive(format!("Invalid archive access token: {e}"))
                })?,
            );
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .default_headers(headers)
            .build()
            .map_err(|e| {
                PaperscoutError::Archive(format!("Failed to create archive HTTP client: {e}"))
            })?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
            bucket: config.bucket.clone(),
            max_retries: config.max_retries,
        })
    }

    async fn get_with_retry(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response> {
        let mut last_error = None;
        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = Duration::from_millis(100 * 2_u64.pow(attempt - 1));
                tokio::time::sleep(delay).await;
            }

            match self.client.get(url).query(query).send().await {
                Ok(resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        return Ok(resp);
                    }

                    if status == StatusCode::NOT_FOUND {
                        return Err(PaperscoutError::NotFound(format!(
                            "Archive object not found: {url}"
                        )));
                    }

                    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
                        let body = resp.text().await.unwrap_or_default();
                        return Err(PaperscoutError::ApiAuth(body));
                    }

                    let body = resp.text().await.unwrap_or_default();
                    if status == StatusCode::TOO_MANY_REQUESTS || status.is_server_error() {
                        last_error = Some(PaperscoutError::Archive(format!(
                            "Archive request failed ({status}): {body}"
                        )));
                        continue;
                    }

                    return Err(PaperscoutError::Archive(format!(
                        "Archive request failed ({status}): {body}"
                    )));
                }
                Err(e) if e.is_connect() || e.is_timeout() || e.is_request() => {
                    last_error =
                        Some(PaperscoutError::Archive(format!("Archive request error: {e}")));
                    continue;
                }
                Err(e) => return Err(e.into()),
            }
        }

        Err(last_error.unwrap_or_else(|| {
            PaperscoutError::Archive("Archive request failed after retries".to_string())
        }))
    }
}

#[async_trait]
impl PaperArchive for S3Archive {
    async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{}/{}", self.endpoint, self.bucket, key);
        let resp = self.get_with_retry(&url, &[]).await?;
        let bytes = resp
            .bytes()
            .await
            .map_err(|e| PaperscoutError::Archive(format!("Failed to read object body: {e}")))?;
        Ok(bytes.to_vec())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        let mut keys = Vec::new();
        let mut continuation: Option<String> = None;
        let url = format!("{}/{}", self.endpoint, self.bucket);

        loop {
            let mut query = vec![("list-type", "2")];
            if let Some(ref token) = continuation {
                query.push(("continuation-token", token.as_str()));
            }

            let resp = self.get_with_retry(&url, &query).await?;
            let body = resp.text().await.map_err(|e| {
                PaperscoutError::Archive(format!("Failed to read listing body: {e}"))
            })?;

            let page = parse_list_page(&body)?;
            keys.extend(page.keys);

            match page.next_token {
                Some(token) => continuation = Some(token),
                None => break,
            }
        }

        Ok(keys)
    }
}

struct ListPage {
    keys: Vec<String>,
    next_token: Option<String>,
}

/// Parse one ListObjectsV2 XML page into object keys and the continuation
/// token, if the listing is truncated.
fn parse_list_page(xml: &str) -> Result<ListPage> {
    let mut reader = Reader::from_str(xml);

    let mut keys = Vec::new();
    let mut next_token = None;
    let mut current = Vec::new();
    let mut buf = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                current = e.local_name().as_ref().to_vec();
                buf.clear();
            }
            Ok(Event::Text(e)) => {
                let decoded = e.decode().map_err(|e| {
                    PaperscoutError::Archive(format!("Invalid listing XML text: {e}"))
                })?;
                buf.push_str(&decoded);
            }
            Ok(Event::GeneralRef(e)) => {
                let name = e.decode().map_err(|e| {
                    PaperscoutError::Archive(format!("Invalid listing XML text: {e}"))
                })?;
                let entity = format!("&{name};");
                let resolved = quick_xml::escape::unescape(&entity).map_err(|e| {
                    PaperscoutError::Archive(format!("Invalid listing XML text: {e}"))
                })?;
                buf.push_str(&resolved);
            }
            Ok(Event::End(_)) => {
                let text = buf.trim();
                if !text.is_empty() {
                    match current.as_slice() {
                        b"Key" => keys.push(text.to_string()),
                        b"NextContinuationToken" => next_token = Some(text.to_string()),
                        _ => {}
                    }
                }
                current.clear();
                buf.clear();
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(PaperscoutError::Archive(format!(
                    "Invalid listing XML: {e}"
                )))
            }
        }
    }

    Ok(ListPage { keys, next_token })
}
