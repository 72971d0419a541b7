mod common;

use common::{write_corpus, BrokenGraphStore, Harness};
use graph_rag::GraphStore;
use hybrid_rag::admin::{GraphStoreStatus, LlmServerStatus, VectorStoreStatus};
use hybrid_rag::AdminService;
use hybridrag_models::ChunkIdStrategy;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn ollama_with(status: u16, body: serde_json::Value) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(status).set_body_json(body))
        .expect(1)
        .mount(&server)
        .await;
    server
}

fn admin_for(harness: &Harness, ollama_url: &str) -> AdminService {
    let graph: Arc<dyn GraphStore> = harness.graph.clone();
    AdminService::new(harness.vectors.clone(), Ok(graph), ollama_url)
}

#[tokio::test]
async fn test_stats_after_ingest() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let harness = Harness::new();
    harness.pipeline(ChunkIdStrategy::Random).run(dir.path()).await.unwrap();

    let ollama = ollama_with(
        200,
        serde_json::json!({"models": [{"name": "llama3.2"}, {"name": "nomic-embed-text"}]}),
    )
    .await;
    let stats = admin_for(&harness, &format!("{}/", ollama.uri())).stats().await;

    match stats.vector_store {
        VectorStoreStatus::Connected { collection, stats } => {
            assert_eq!(collection, "TestCollection");
            assert_eq!(stats.points_count, 4);
        }
        other => panic!("unexpected vector status: {:?}", other),
    }
    match stats.graph_store {
        GraphStoreStatus::Connected { stats } => {
            assert_eq!(stats.entity_nodes, 4);
            assert_eq!(stats.chunk_nodes, 4);
            assert_eq!(stats.mentions_relationships, 6);
        }
        other => panic!("unexpected graph status: {:?}", other),
    }
    assert_eq!(
        stats.llm_server,
        LlmServerStatus::Connected {
            models: vec!["llama3.2".to_string(), "nomic-embed-text".to_string()],
            model_count: 2,
        }
    );
}

#[tokio::test]
async fn test_stats_reports_missing_collection_as_zero() {
    let harness = Harness::new();
    let ollama = ollama_with(200, serde_json::json!({"models": []})).await;

    let stats = admin_for(&harness, &ollama.uri()).stats().await;

    assert_eq!(
        stats.vector_store,
        VectorStoreStatus::Connected {
            collection: "TestCollection".to_string(),
            stats: Default::default(),
        }
    );
}

#[tokio::test]
async fn test_stats_reports_llm_http_error() {
    let harness = Harness::new();
    let ollama = ollama_with(500, serde_json::json!({"error": "boom"})).await;

    let stats = admin_for(&harness, &ollama.uri()).stats().await;

    assert_eq!(
        stats.llm_server,
        LlmServerStatus::Error {
            error: "HTTP 500".to_string()
        }
    );
}

#[tokio::test]
async fn test_stats_survives_unreachable_services() {
    let harness = Harness::new();
    let admin = AdminService::new(
        harness.vectors.clone(),
        Err("Neo4j error: connection refused".to_string()),
        "http://127.0.0.1:1",
    );

    let stats = admin.stats().await;

    assert_eq!(
        stats.graph_store,
        GraphStoreStatus::Disconnected {
            error: "Neo4j error: connection refused".to_string()
        }
    );
    assert!(matches!(stats.llm_server, LlmServerStatus::Disconnected { .. }));

    let json = serde_json::to_value(&stats).unwrap();
    assert_eq!(json["graph_store"]["status"], "disconnected");
    assert_eq!(json["llm_server"]["status"], "disconnected");
}

#[tokio::test]
async fn test_wipe_clears_both_stores() {
    let dir = tempfile::tempdir().unwrap();
    write_corpus(dir.path());
    let harness = Harness::new();
    harness.pipeline(ChunkIdStrategy::Random).run(dir.path()).await.unwrap();
    let admin = admin_for(&harness, "http://127.0.0.1:1");

    let report = admin.wipe().await;

    assert!(report.vector_store.success);
    assert_eq!(report.vector_store.message, "Collection 'TestCollection' deleted");
    assert!(report.graph_store.success);
    assert!(harness.vectors.points().is_empty());
    assert!(harness.graph.chunks().is_empty());

    let again = admin.wipe().await;
    assert!(again.vector_store.success);
    assert_eq!(again.vector_store.message, "Collection not found");
}

#[tokio::test]
async fn test_wipe_reports_each_store_independently() {
    let harness = Harness::new();
    let graph: Arc<dyn GraphStore> = Arc::new(BrokenGraphStore);
    let admin = AdminService::new(harness.vectors.clone(), Ok(graph), "http://127.0.0.1:1");

    let report = admin.wipe().await;

    assert!(report.vector_store.success);
    assert!(!report.graph_store.success);
    assert!(report.graph_store.message.contains("connection refused"));
}
