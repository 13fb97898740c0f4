use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use ontoscan_annotator::recognizer::DictionaryRecognizer;
use ontoscan_annotator::{Annotator, CacheInstances, CacheStore, MemoryStore, OntologyCorpus, TermCache};
use ontoscan_common::settings::CacheConfig;
use ontoscan_recommender::Recommender;
use ontoscan_test_utils::pretty_assertions::assert_eq;
use ontoscan_test_utils::{bro, bro_corpus, init_tracing, temp_path, BRO};
use ontoscan_web::{build_router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

// ── Test app builder ───────────────────────────────────────────

async fn app() -> Router {
    init_tracing();
    let corpus = Arc::new(OntologyCorpus::from_json_str(&bro_corpus()).unwrap());
    let store: Arc<dyn CacheStore> = Arc::new(MemoryStore::new());
    let config = CacheConfig::default();
    let term_cache = Arc::new(TermCache::new(
        CacheInstances::new(store, &config),
        corpus.clone(),
        &config,
    ));

    let instance = term_cache.instances().current().await.unwrap();
    term_cache.seed_current_instance().await.unwrap();
    let (_dir, path) = temp_path("dictionary.txt");
    term_cache.generate_dictionary_file(&instance, &path).await.unwrap();

    let recognizer = Arc::new(DictionaryRecognizer::from_file(&path).unwrap());
    let annotator = Arc::new(
        Annotator::builder(recognizer, term_cache.clone())
            .graph(corpus.clone())
            .mappings(corpus.clone())
            .build(),
    );
    let recommender = Arc::new(Recommender::new(annotator.clone(), corpus));
    build_router(AppState::new(annotator, recommender, term_cache))
}

async fn post(app: Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    let resp = app.oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

// ── Annotator ──────────────────────────────────────────────────

#[tokio::test]
async fn test_annotate_returns_camel_case_annotations() {
    let (status, body) = post(
        app().await,
        "/api/annotator",
        json!({ "text": "Data Storage is needed", "longestOnly": true, "expandHierarchyLevels": 1 }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let anns = body.as_array().unwrap();
    assert_eq!(anns.len(), 2);

    let ds = &anns[0];
    assert_eq!(ds["annotatedClass"]["id"], bro("Data_Storage"));
    assert_eq!(ds["annotatedClass"]["ontology"], BRO);
    assert_eq!(ds["annotations"][0], json!({ "from": 1, "to": 12, "matchType": "PREF", "text": "Data Storage" }));
    assert_eq!(ds["hierarchy"][0]["distance"], 1);
}

#[tokio::test]
async fn test_annotate_unknown_ontology_is_empty() {
    let (status, body) = post(
        app().await,
        "/api/annotator",
        json!({ "text": "Data Storage", "ontologies": ["DOES-NOT-EXIST"] }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_annotate_rejects_deep_hierarchy() {
    let (status, body) = post(
        app().await,
        "/api/annotator",
        json!({ "text": "Data Storage", "expandHierarchyLevels": 500 }),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("expandHierarchyLevels"));
}

#[tokio::test]
async fn test_annotate_requires_text() {
    let (status, _) = post(app().await, "/api/annotator", json!({ "longestOnly": true })).await;
    assert!(status.is_client_error());
}

// ── Recommender ────────────────────────────────────────────────

#[tokio::test]
async fn test_recommend() {
    let (status, body) = post(
        app().await,
        "/api/recommender",
        json!({ "text": "Data Storage", "includeClasses": true }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let recs = body.as_array().unwrap();
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["ontology"], BRO);
    assert_eq!(recs[0]["numTermsMatched"], 3);
    assert_eq!(recs[0]["annotatedClasses"].as_array().unwrap().len(), 3);
}

// ── Health ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_reports_instance() {
    let req = Request::builder().uri("/api/health").body(Body::empty()).unwrap();
    let resp = app().await.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["cacheInstance"], "c1:");
}
