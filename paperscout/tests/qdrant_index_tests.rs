use serde_json::json;
use pretty_assertions::assert_eq;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use paperscout::config::VectorConfig;
use paperscout::error::PaperscoutError;
use paperscout::vector::{QdrantIndex, VectorIndex};

fn vector_config(url: String, max_retries: u32) -> VectorConfig {
    VectorConfig {
        url,
        api_key: Some("qdrant-key".to_string()),
        combined_collection: "combined_pdf_docs".to_string(),
        paper_collection_prefix: "PDF-".to_string(),
        timeout_secs: 5,
        max_retries,
    }
}

fn search_body(points: serde_json::Value) -> serde_json::Value {
    json!({
        "result": points,
        "status": "ok",
        "time": 0.002
    })
}

#[tokio::test]
async fn search_returns_scored_chunks_in_rank_order() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collections/combined_pdf_docs/points/search"))
        .and(header("api-key", "qdrant-key"))
        .and(body_partial_json(json!({"limit": 2, "with_payload": true})))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(json!([
            {
                "id": 1,
                "score": 0.72,
                "payload": {
                    "page_content": "Keratinocytes dominate cluster 3.",
                    "metadata": {"title": "Single-cell skin atlas"}
                }
            },
            {
                "id": 2,
                "score": 0.61,
                "payload": {
                    "page_content": "Fibroblast subsets were identified.",
                    "metadata": {"title": "Dermal fibroblast heterogeneity"}
                }
            }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let index = QdrantIndex::new(&vector_config(server.uri(), 0)).unwrap();
    let hits = index
        .search("combined_pdf_docs", &[0.1, 0.2, 0.3], 2)
        .await
        .unwrap();

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].title.as_deref(), Some("Single-cell skin atlas"));
    assert!(hits[0].score > hits[1].score);
    assert_eq!(hits[1].content, "Fibroblast subsets were identified.");
}

#[tokio::test]
async fn missing_collection_is_a_vector_store_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collections/PDF-00000000/points/search"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "status": {"error": "Collection `PDF-00000000` doesn't exist!"}
        })))
        .mount(&server)
        .await;

    let index = QdrantIndex::new(&vector_config(server.uri(), 3)).unwrap();
    let err = index
        .search("PDF-00000000", &[0.1], 4)
        .await
        .unwrap_err();

    match err {
        PaperscoutError::VectorStore(msg) => assert!(msg.contains("PDF-00000000")),
        other => panic!("expected VectorStore error, got: {other:?}"),
    }
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collections/combined_pdf_docs/points/search"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/collections/combined_pdf_docs/points/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(json!([
            {"id": 1, "score": 0.5, "payload": {"page_content": "text", "metadata": {"title": "T"}}}
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let index = QdrantIndex::new(&vector_config(server.uri(), 2)).unwrap();
    let hits = index
        .search("combined_pdf_docs", &[0.1], 1)
        .await
        .unwrap();
    assert_eq!(hits.len(), 1);
}

#[tokio::test]
async fn empty_result_is_an_empty_hit_list() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/collections/combined_pdf_docs/points/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_body(json!([]))))
        .mount(&server)
        .await;

    let index = QdrantIndex::new(&vector_config(server.uri(), 0)).unwrap();
    let hits = index
        .search("combined_pdf_docs", &[0.1], 20)
        .await
        .unwrap();
    assert!(hits.is_empty());
}
