//! End-to-end recommendation pipeline over mocked HTTP collaborators: the
//! embeddings API, the Qdrant search API, and the LLM chat-completions API
//! all run on one wiremock server.

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use paperscout::archive::PaperCatalog;
use paperscout::config::{
    ArchiveConfig, Config, EmbeddingsConfig, LlmConfig, RecommenderConfig, ServerConfig,
    SessionConfig, VectorConfig,
};
use paperscout::embeddings::EmbeddingProvider;
use paperscout::error::PaperscoutError;
use paperscout::llm::LlmProvider;
use paperscout::services::{ConversationService, RecommenderService};
use paperscout::vector::QdrantIndex;

const CSV: &str = "\
Author,PMID,URL,Title
Smith et al.,31209134,https://pubmed.ncbi.nlm.nih.gov/31209134/,Single-cell skin atlas
Lee et al.,32511387,https://pubmed.ncbi.nlm.nih.gov/32511387/,Keratinocyte differentiation trajectories
";

fn test_config(server_uri: &str) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            api_keys: vec![],
        },
        archive: ArchiveConfig {
            endpoint: server_uri.to_string(),
            bucket: "paper-archive".to_string(),
            access_token: None,
            metadata_key: "data/meta-data/Sources-Titles-Meta-Data.csv".to_string(),
            image_prefix: "data/pdf-images".to_string(),
            timeout_secs: 5,
            max_retries: 0,
        },
        vector: VectorConfig {
            url: server_uri.to_string(),
            api_key: None,
            combined_collection: "combined_pdf_docs".to_string(),
            paper_collection_prefix: "PDF-".to_string(),
            timeout_secs: 5,
            max_retries: 0,
        },
        embeddings: EmbeddingsConfig {
            model: "openai/test-embedding".to_string(),
            dimensions: 3,
            batch_size: 32,
            api_key: Some("embed-key".to_string()),
            base_url: Some(server_uri.to_string()),
            timeout_secs: 5,
            max_retries: 0,
        },
        recommender: RecommenderConfig {
            recommend_top_k: 20,
            score_top_k: 6,
            summary_top_k: 4,
            chat_top_k: 4,
            max_history: None,
        },
        session: SessionConfig {
            ttl_secs: 3600,
            sweep_interval_secs: 300,
            page_cache_capacity: 8,
        },
        llm: Some(LlmConfig {
            model: "openai/gpt-4o-mini".to_string(),
            api_key: Some("llm-key".to_string()),
            base_url: Some(server_uri.to_string()),
            timeout_secs: 5,
            max_retries: 0,
        }),
    }
}

fn recommender(config: &Config) -> RecommenderService {
    let catalog = Arc::new(PaperCatalog::from_csv_bytes(CSV.as_bytes()).unwrap());
    let index = Arc::new(QdrantIndex::new(&config.vector).unwrap());
    let embeddings = EmbeddingProvider::new(&config.embeddings).unwrap();
    let llm = LlmProvider::new(config.llm.as_ref());
    RecommenderService::new(index, embeddings, llm, catalog, config)
}

fn conversation(config: &Config) -> ConversationService {
    let index = Arc::new(QdrantIndex::new(&config.vector).unwrap());
    let embeddings = EmbeddingProvider::new(&config.embeddings).unwrap();
    let llm = LlmProvider::new(config.llm.as_ref());
    ConversationService::new(index, embeddings, llm, config)
}

fn hit(title: &str, score: f64, content: &str) -> serde_json::Value {
    json!({
        "id": 1,
        "score": score,
        "payload": {
            "page_content": content,
            "metadata": {"title": title}
        }
    })
}

fn search_body(points: Vec<serde_json::Value>) -> serde_json::Value {
    json!({"result": points, "status": "ok", "time": 0.001})
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "created": 1,
        "model": "gpt-4o-mini",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ],
        "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
    })
}

async fn mount_embeddings(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"embedding": [0.1, 0.2, 0.3]}]
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn full_pipeline_recommends_scores_and_summarizes() {
    let server = MockServer::start().await;
    mount_embeddings(&server).await;

    // Plurality vote search at k=20: the atlas paper dominates.
    Mock::given(method("POST"))
        .and(path("/collections/combined_pdf_docs/points/search"))
        .and(body_partial_json(json!({"limit": 20})))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![
            hit("Single-cell skin atlas", 0.71, "chunk a"),
            hit("Keratinocyte differentiation trajectories", 0.69, "chunk b"),
            hit("Single-cell skin atlas", 0.67, "chunk c"),
            hit("Single-cell skin atlas", 0.64, "chunk d"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    // Scoring search at k=6: three atlas hits averaging 0.68.
    Mock::given(method("POST"))
        .and(path("/collections/combined_pdf_docs/points/search"))
        .and(body_partial_json(json!({"limit": 6})))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![
            hit("Single-cell skin atlas", 0.7, "chunk a"),
            hit("Single-cell skin atlas", 0.68, "chunk c"),
            hit("Keratinocyte differentiation trajectories", 0.5, "chunk b"),
            hit("Single-cell skin atlas", 0.66, "chunk d"),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    // Summary retrieval from the paper's own collection.
    Mock::given(method("POST"))
        .and(path("/collections/PDF-31209134/points/search"))
        .and(body_partial_json(json!({"limit": 4})))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![
            hit("Single-cell skin atlas", 0.9, "We profiled 10,000 skin cells."),
            hit("Single-cell skin atlas", 0.8, "Keratinocytes formed three clusters."),
        ])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "The paper profiles 10,000 skin cells and identifies keratinocyte clusters.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let rec = recommender(&config).recommend("skin sequencing").await.unwrap();

    assert_eq!(rec.title, "Single-cell skin atlas");
    assert_eq!(rec.pmid, "31209134");
    assert_eq!(rec.author, "Smith et al.");
    assert_eq!(rec.confidence.render(), "High: 0.68");
    assert!(rec.summary.contains("10,000 skin cells"));
}

#[tokio::test]
async fn zero_hits_surface_as_no_search_results() {
    let server = MockServer::start().await;
    mount_embeddings(&server).await;

    Mock::given(method("POST"))
        .and(path("/collections/combined_pdf_docs/points/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![])))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let err = recommender(&config).recommend("anything").await.unwrap_err();
    assert!(matches!(err, PaperscoutError::NoSearchResults));
}

#[tokio::test]
async fn score_set_empty_when_winner_not_reconsulted() {
    let server = MockServer::start().await;
    mount_embeddings(&server).await;

    Mock::given(method("POST"))
        .and(path("/collections/combined_pdf_docs/points/search"))
        .and(body_partial_json(json!({"limit": 20})))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![
            hit("Single-cell skin atlas", 0.7, "chunk a"),
            hit("Single-cell skin atlas", 0.6, "chunk c"),
        ])))
        .mount(&server)
        .await;

    // The shallower search only surfaces the other paper.
    Mock::given(method("POST"))
        .and(path("/collections/combined_pdf_docs/points/search"))
        .and(body_partial_json(json!({"limit": 6})))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![hit(
            "Keratinocyte differentiation trajectories",
            0.5,
            "chunk b",
        )])))
        .mount(&server)
        .await;

    // Summarization runs concurrently with scoring; give it valid mocks so
    // the scoring error is the one under test.
    Mock::given(method("POST"))
        .and(path("/collections/PDF-31209134/points/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![hit(
            "Single-cell skin atlas",
            0.9,
            "chunk",
        )])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Summary.")))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let err = recommender(&config)
        .recommend("skin sequencing")
        .await
        .unwrap_err();

    match err {
        PaperscoutError::EmptyScoreSet(title) => {
            assert_eq!(title, "Single-cell skin atlas");
        }
        other => panic!("expected EmptyScoreSet, got: {other:?}"),
    }
}

#[tokio::test]
async fn recommendation_needs_a_catalog_row() {
    let server = MockServer::start().await;
    mount_embeddings(&server).await;

    // Every hit names a paper missing from the metadata table.
    Mock::given(method("POST"))
        .and(path("/collections/combined_pdf_docs/points/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![hit(
            "Uncataloged paper",
            0.7,
            "chunk",
        )])))
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let err = recommender(&config).recommend("anything").await.unwrap_err();
    assert!(matches!(err, PaperscoutError::MetadataNotFound(_)));
}

#[tokio::test]
async fn chat_turn_retrieves_context_and_returns_answer() {
    let server = MockServer::start().await;
    mount_embeddings(&server).await;

    Mock::given(method("POST"))
        .and(path("/collections/PDF-31209134/points/search"))
        .and(body_partial_json(json!({"limit": 4})))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![hit(
            "Single-cell skin atlas",
            0.85,
            "Cluster 3 is dominated by keratinocytes.",
        )])))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
            "Cluster 3 consists mostly of keratinocytes.",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let config = test_config(&server.uri());
    let turn = conversation(&config)
        .ask("31209134", &[], "What is in cluster 3?")
        .await
        .unwrap();

    assert_eq!(turn.question, "What is in cluster 3?");
    assert_eq!(turn.answer, "Cluster 3 consists mostly of keratinocytes.");
}

#[tokio::test]
async fn bounded_chat_history_trims_resent_turns() {
    let server = MockServer::start().await;
    mount_embeddings(&server).await;

    Mock::given(method("POST"))
        .and(path("/collections/PDF-31209134/points/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(vec![hit(
            "Single-cell skin atlas",
            0.85,
            "context chunk",
        )])))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Answer.")))
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.recommender.max_history = Some(1);

    let history = vec![
        paperscout::models::ConversationTurn::new("q0", "a0"),
        paperscout::models::ConversationTurn::new("q1", "a1"),
        paperscout::models::ConversationTurn::new("q2", "a2"),
    ];

    conversation(&config)
        .ask("31209134", &history, "q3")
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    let chat_request = requests
        .iter()
        .find(|r| r.url.path() == "/chat/completions")
        .expect("chat request sent");
    let body: serde_json::Value = serde_json::from_slice(&chat_request.body).unwrap();
    let messages = body["messages"].as_array().unwrap();
    // system + one bounded prior turn + the new question
    assert_eq!(messages.len(), 4);
    assert_eq!(messages[1]["content"], "q2");
}
