use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::archive::PaperArchive;
use crate::config::ArchiveConfig;
use crate::error::Result;

/// Explicit image cache keyed by (pmid, page): bounded LRU, cleared on
/// session reset. Replaces the original's implicit memoization decorator.
#[derive(Clone)]
pub struct PageCache {
    inner: Arc<Mutex<LruCache<(String, u32), Arc<Vec<u8>>>>>,
}

impl PageCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity.max(1)).expect("capacity is at least 1");
        Self {
            inner: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    fn get(&self, pmid: &str, page: u32) -> Option<Arc<Vec<u8>>> {
        let mut cache = self.inner.lock().expect("page cache lock poisoned");
        cache.get(&(pmid.to_string(), page)).cloned()
    }

    fn put(&self, pmid: &str, page: u32, bytes: Arc<Vec<u8>>) {
        let mut cache = self.inner.lock().expect("page cache lock poisoned");
        cache.put((pmid.to_string(), page), bytes);
    }

    pub fn clear(&self) {
        let mut cache = self.inner.lock().expect("page cache lock poisoned");
        cache.clear();
    }

    pub fn len(&self) -> usize {
        let cache = self.inner.lock().expect("page cache lock poisoned");
        cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Page-image access over the archive: gallery covers, per-paper page
/// counting, key derivation, and cached image fetch.
#[derive(Clone)]
pub struct PageService {
    archive: Arc<dyn PaperArchive>,
    image_prefix: String,
    cache: PageCache,
}

impl PageService {
    pub fn new(archive: Arc<dyn PaperArchive>, config: &ArchiveConfig, cache: PageCache) -> Self {
        Self {
            archive,
            image_prefix: config.image_prefix.clone(),
            cache,
        }
    }

    /// First-page image keys for every paper, for the browsing gallery.
    pub async fn first_page_keys(&self) -> Result<Vec<String>> {
        let keys = self.archive.list_keys().await?;
        Ok(keys
            .into_iter()
            .filter(|key| key.ends_with("page_1.jpg"))
            .collect())
    }

    /// Number of stored objects whose key contains the PMID substring.
    pub async fn page_count(&self, pmid: &str) -> Result<usize> {
        let keys = self.archive.list_keys().await?;
        Ok(count_pages(&keys, pmid))
    }

    /// Derived page-image keys for a paper, in page order.
    pub async fn page_keys(&self, pmid: &str) -> Result<Vec<String>> {
        let count = self.page_count(pmid).await?;
        Ok((1..=count as u32)
            .map(|page| page_key(&self.image_prefix, pmid, page))
            .collect())
    }

    /// One page image's bytes, served from the cache when possible.
    pub async fn fetch_page(&self, pmid: &str, page: u32) -> Result<Arc<Vec<u8>>> {
        if let Some(bytes) = self.cache.get(pmid, page) {
            return Ok(bytes);
        }

        let key = page_key(&self.image_prefix, pmid, page);
        let bytes = Arc::new(self.archive.get_object(&key).await?);
        self.cache.put(pmid, page, Arc::clone(&bytes));

        Ok(bytes)
    }

    pub fn cache(&self) -> &PageCache {
        &self.cache
    }
}

fn page_key(image_prefix: &str, pmid: &str, page: u32) -> String {
    format!("{image_prefix}/PDF-IMG-{pmid}/page_{page}.jpg")
}

fn count_pages(keys: &[String], pmid: &str) -> usize {
    keys.iter().filter(|key| key.contains(pmid)).count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;

    use crate::error::PaperscoutError;

    struct FakeArchive {
        objects: HashMap<String, Vec<u8>>,
        keys: Vec<String>,
    }

    #[async_trait]
    impl PaperArchive for FakeArchive {
        async fn get_object(&self, key: &str) -> Result<Vec<u8>> {
            self.objects
                .get(key)
                .cloned()
                .ok_or_else(|| PaperscoutError::NotFound(format!("missing: {key}")))
        }

        async fn list_keys(&self) -> Result<Vec<String>> {
            Ok(self.keys.clone())
        }
    }

    fn archive_config() -> ArchiveConfig {
        ArchiveConfig {
            endpoint: "http://localhost:9000".to_string(),
            bucket: "paper-archive".to_string(),
            access_token: None,
            metadata_key: "data/meta-data/Sources-Titles-Meta-Data.csv".to_string(),
            image_prefix: "data/pdf-images".to_string(),
            timeout_secs: 5,
            max_retries: 0,
        }
    }

    fn service_with_keys(keys: Vec<&str>) -> PageService {
        let archive = FakeArchive {
            objects: HashMap::new(),
            keys: keys.into_iter().map(String::from).collect(),
        };
        PageService::new(Arc::new(archive), &archive_config(), PageCache::new(8))
    }

    #[test]
    fn page_key_follows_archive_convention() {
        assert_eq!(
            page_key("data/pdf-images", "31209134", 3),
            "data/pdf-images/PDF-IMG-31209134/page_3.jpg"
        );
    }

    #[tokio::test]
    async fn page_count_matches_pmid_substring_keys() {
        let service = service_with_keys(vec![
            "data/pdf-images/PDF-IMG-31209134/page_1.jpg",
            "data/pdf-images/PDF-IMG-31209134/page_2.jpg",
            "data/pdf-images/PDF-IMG-32511387/page_1.jpg",
            "data/meta-data/Sources-Titles-Meta-Data.csv",
        ]);

        assert_eq!(service.page_count("31209134").await.unwrap(), 2);
        assert_eq!(service.page_count("32511387").await.unwrap(), 1);
        assert_eq!(service.page_count("99999999").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn first_page_keys_are_one_per_paper() {
        let service = service_with_keys(vec![
            "data/pdf-images/PDF-IMG-31209134/page_1.jpg",
            "data/pdf-images/PDF-IMG-31209134/page_2.jpg",
            "data/pdf-images/PDF-IMG-32511387/page_1.jpg",
        ]);

        let covers = service.first_page_keys().await.unwrap();
        assert_eq!(
            covers,
            vec![
                "data/pdf-images/PDF-IMG-31209134/page_1.jpg",
                "data/pdf-images/PDF-IMG-32511387/page_1.jpg",
            ]
        );
    }

    #[tokio::test]
    async fn fetch_page_caches_bytes() {
        let mut objects = HashMap::new();
        objects.insert(
            "data/pdf-images/PDF-IMG-31209134/page_1.jpg".to_string(),
            vec![0xFF, 0xD8],
        );
        let archive = FakeArchive {
            objects,
            keys: vec![],
        };
        let service =
            PageService::new(Arc::new(archive), &archive_config(), PageCache::new(8));

        let bytes = service.fetch_page("31209134", 1).await.unwrap();
        assert_eq!(bytes.as_slice(), &[0xFF, 0xD8]);
        assert_eq!(service.cache().len(), 1);

        // Second fetch is served from the cache.
        let again = service.fetch_page("31209134", 1).await.unwrap();
        assert_eq!(again.as_slice(), &[0xFF, 0xD8]);

        service.cache().clear();
        assert!(service.cache().is_empty());
    }
}
