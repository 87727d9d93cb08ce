use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub archive: ArchiveConfig,
    pub vector: VectorConfig,
    pub embeddings: EmbeddingsConfig,
    pub recommender: RecommenderConfig,
    pub session: SessionConfig,
    pub llm: Option<LlmConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
}

/// Read-only S3-compatible object archive holding the metadata CSV and the
/// per-page JPEG renders of each paper.
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    pub endpoint: String,
    pub bucket: String,
    /// Bearer token for gateway-fronted buckets. Anonymous access when unset.
    pub access_token: Option<String>,
    /// Object key of the paper metadata CSV.
    pub metadata_key: String,
    /// Key prefix under which page images live, one folder per paper.
    pub image_prefix: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// Qdrant connection and collection naming.
#[derive(Debug, Clone, Deserialize)]
pub struct VectorConfig {
    pub url: String,
    pub api_key: Option<String>,
    /// Collection spanning all papers' chunks, tagged with `title` metadata.
    pub combined_collection: String,
    /// Per-paper collections are named `{paper_collection_prefix}{pmid}`.
    pub paper_collection_prefix: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingsConfig {
    pub model: String,
    pub dimensions: usize,
    pub batch_size: usize,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// LLM configuration for summaries and conversational QA.
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
}

/// Search depths for the recommendation pipeline and chat retrieval.
#[derive(Debug, Clone, Deserialize)]
pub struct RecommenderConfig {
    /// k for the plurality-vote search.
    pub recommend_top_k: u32,
    /// k for the confidence-scoring search.
    pub score_top_k: u32,
    /// k for summary chunk retrieval.
    pub summary_top_k: u32,
    /// k for per-turn chat retrieval.
    pub chat_top_k: u32,
    /// Bound on prior turns resent per chat call. Unset resends the full
    /// transcript, matching the unbounded original behavior.
    pub max_history: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    pub ttl_secs: u64,
    pub sweep_interval_secs: u64,
    pub page_cache_capacity: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                host: env::var("PAPERSCOUT_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("PAPERSCOUT_PORT", 3000),
                api_keys: env::var("PAPERSCOUT_API_KEYS")
                    .map(|keys| keys.split(',').map(|s| s.trim().to_string()).collect())
                    .unwrap_or_default(),
            },
            archive: ArchiveConfig {
                endpoint: env::var("ARCHIVE_ENDPOINT")
                    .unwrap_or_else(|_| "http://localhost:9000".to_string()),
                bucket: env::var("ARCHIVE_BUCKET")
                    .unwrap_or_else(|_| "paper-archive".to_string()),
                access_token: env::var("ARCHIVE_ACCESS_TOKEN").ok(),
                metadata_key: env::var("ARCHIVE_METADATA_KEY")
                    .unwrap_or_else(|_| "data/meta-data/Sources-Titles-Meta-Data.csv".to_string()),
                image_prefix: env::var("ARCHIVE_IMAGE_PREFIX")
                    .unwrap_or_else(|_| "data/pdf-images".to_string()),
                timeout_secs: parse_env_or("ARCHIVE_TIMEOUT", 30),
                max_retries: parse_env_or("ARCHIVE_MAX_RETRIES", 3),
            },
            vector: VectorConfig {
                url: env::var("QDRANT_URL").unwrap_or_else(|_| "http://localhost:6333".to_string()),
                api_key: env::var("QDRANT_API_KEY").ok(),
                combined_collection: env::var("QDRANT_COMBINED_COLLECTION")
                    .unwrap_or_else(|_| "combined_pdf_docs".to_string()),
                paper_collection_prefix: env::var("QDRANT_PAPER_COLLECTION_PREFIX")
                    .unwrap_or_else(|_| "PDF-".to_string()),
                timeout_secs: parse_env_or("QDRANT_TIMEOUT", 30),
                max_retries: parse_env_or("QDRANT_MAX_RETRIES", 3),
            },
            embeddings: EmbeddingsConfig {
                model: env::var("EMBEDDING_MODEL")
                    .unwrap_or_else(|_| "sentence-transformers/all-MiniLM-L6-v2".to_string()),
                dimensions: parse_env_or("EMBEDDING_DIMENSIONS", 384),
                batch_size: parse_env_or("EMBEDDING_BATCH_SIZE", 256),
                api_key: env::var("EMBEDDING_API_KEY").ok(),
                base_url: env::var("EMBEDDING_BASE_URL").ok(),
                timeout_secs: parse_env_or("EMBEDDING_TIMEOUT", 30),
                max_retries: parse_env_or("EMBEDDING_MAX_RETRIES", 3),
            },
            recommender: RecommenderConfig {
                recommend_top_k: parse_env_or("RECOMMEND_TOP_K", 20),
                score_top_k: parse_env_or("SCORE_TOP_K", 6),
                summary_top_k: parse_env_or("SUMMARY_TOP_K", 4),
                chat_top_k: parse_env_or("CHAT_TOP_K", 4),
                max_history: parse_env_opt("CHAT_MAX_HISTORY"),
            },
            session: SessionConfig {
                ttl_secs: parse_env_or("SESSION_TTL_SECS", 3600),
                sweep_interval_secs: parse_env_or("SESSION_SWEEP_INTERVAL_SECS", 300),
                page_cache_capacity: parse_env_or("PAGE_CACHE_CAPACITY", 256),
            },
            llm: env::var("LLM_MODEL").ok().map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 3),
            }),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}

/// Known embedding providers that use OpenAI-compatible APIs; anything else
/// resolves to the local fastembed backend.
const KNOWN_EMBEDDING_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse an embedding model name into (provider, model) tuple.
pub fn parse_embedding_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_EMBEDDING_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    ("local", model)
}
