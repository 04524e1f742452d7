//! End-to-end tests: a real server on an ephemeral port talking to a stub
//! completion service, exercising the business CRUD surface and the full
//! five-stage generation chain.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use reqwest::Client;
use serde_json::{json, Value};
use tempfile::TempDir;

use crate::config::TwitterConfig;
use crate::llm_client::CompletionClient;
use crate::routes::build_router;
use crate::social::twitter::TwitterClient;
use crate::state::AppState;
use crate::store::FileStore;

// ────────────────────────────────────────────────────────────────────────────
// Stub completion service
// ────────────────────────────────────────────────────────────────────────────

/// Switchable behavior and call counters for the stub service.
struct StubState {
    chat_calls: AtomicUsize,
    image_calls: AtomicUsize,
    malformed_captions: AtomicBool,
}

impl StubState {
    fn new() -> Arc<Self> {
        Arc::new(StubState {
            chat_calls: AtomicUsize::new(0),
            image_calls: AtomicUsize::new(0),
            malformed_captions: AtomicBool::new(false),
        })
    }
}

const STUB_IMAGE_URL: &str = "https://img.example/stub.png";

/// Answers each chain stage based on its system prompt.
async fn stub_chat(State(stub): State<Arc<StubState>>, Json(body): Json<Value>) -> Json<Value> {
    stub.chat_calls.fetch_add(1, Ordering::SeqCst);

    let system = body["messages"][0]["content"].as_str().unwrap_or_default();
    let content = if system.contains("extract the meaning") {
        "expanded intent".to_string()
    } else if system.contains("outstanding Instagram captions") {
        "refined caption prompt".to_string()
    } else if system.contains("outstanding Instagram images") {
        "refined image prompt".to_string()
    } else if stub.malformed_captions.load(Ordering::SeqCst) {
        "this is { not json".to_string()
    } else {
        r#"{"caption1": "first caption", "caption2": "second caption", "caption3": "third caption"}"#
            .to_string()
    };

    Json(json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    }))
}

async fn stub_images(State(stub): State<Arc<StubState>>) -> Json<Value> {
    stub.image_calls.fetch_add(1, Ordering::SeqCst);
    Json(json!({"created": 0, "data": [{"url": STUB_IMAGE_URL}]}))
}

async fn spawn_stub(stub: Arc<StubState>) -> String {
    let router = Router::new()
        .route("/chat/completions", post(stub_chat))
        .route("/images/generations", post(stub_images))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub");
    let addr = listener.local_addr().expect("Failed to get stub addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

// ────────────────────────────────────────────────────────────────────────────
// Test fixture
// ────────────────────────────────────────────────────────────────────────────

struct TestFixture {
    client: Client,
    base_url: String,
    stub: Arc<StubState>,
    db_path: std::path::PathBuf,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("database.json");

        let stub = StubState::new();
        let stub_url = spawn_stub(stub.clone()).await;

        let twitter = TwitterConfig {
            api_key: "k".to_string(),
            api_secret: "s".to_string(),
            access_token: "t".to_string(),
            access_token_secret: "ts".to_string(),
        };

        let store = FileStore::open(&db_path).await.expect("Failed to open store");
        let state = AppState {
            store: Arc::new(store),
            llm: CompletionClient::new("test-key".to_string(), stub_url),
            twitter: TwitterClient::new(twitter),
        };

        let app = build_router(state);
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for the server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        TestFixture {
            client: Client::new(),
            base_url: format!("http://{addr}"),
            stub,
            db_path,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    async fn create_business(&self, name: &str) -> Value {
        let response = self
            .client
            .post(self.url("/api/v1/business"))
            .json(&json!({
                "name": name,
                "description": "bakery",
                "specifics": "artisan bread",
                "email": "a@x.com",
                "password": "p"
            }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
        response.json().await.unwrap()
    }

    async fn send_post_request(&self, id: u64) -> reqwest::Response {
        self.client
            .post(self.url(&format!("/api/v1/posts/{id}")))
            .json(&json!({
                "mood": "fun",
                "tone": "casual",
                "description": "new sourdough loaf"
            }))
            .send()
            .await
            .unwrap()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_health_endpoint() {
    let fixture = TestFixture::new().await;
    let response = fixture.client.get(fixture.url("/health")).send().await.unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn test_create_assigns_sequential_ids_and_lookups_work() {
    let fixture = TestFixture::new().await;

    let first = fixture.create_business("Acme").await;
    assert_eq!(first["id"], 1);
    assert!(first.get("password").is_none(), "password must not be exposed");

    let second = fixture.create_business("Globex").await;
    assert_eq!(second["id"], 2);

    let by_id: Value = fixture
        .client
        .get(fixture.url("/api/v1/business/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_id["name"], "Acme");

    let by_name: Value = fixture
        .client
        .get(fixture.url("/api/v1/business/by-name/Acme"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(by_name["id"], 1);

    let ids: Value = fixture
        .client
        .get(fixture.url("/api/v1/business/ids"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ids["ids"], json!([1, 2]));
}

#[tokio::test]
async fn test_create_rejects_empty_name() {
    let fixture = TestFixture::new().await;
    let response = fixture
        .client
        .post(fixture.url("/api/v1/business"))
        .json(&json!({
            "name": "  ",
            "description": "d",
            "specifics": "s",
            "email": "e@x.com",
            "password": "p"
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_business_is_rejected_before_any_completion_call() {
    let fixture = TestFixture::new().await;

    let response = fixture.send_post_request(99).await;
    assert_eq!(response.status(), 404);
    assert_eq!(fixture.stub.chat_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_full_chain_scenario() {
    let fixture = TestFixture::new().await;
    fixture.create_business("Acme").await;

    let response = fixture.send_post_request(1).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();

    assert_eq!(body["status"]["state"], "completed");
    assert_eq!(body["ai_response"]["caption_text"], "first caption");
    assert_eq!(body["ai_response"]["captions"]["caption1"], "first caption");
    assert_eq!(body["ai_response"]["captions"]["caption2"], "second caption");
    assert_eq!(body["ai_response"]["captions"]["caption3"], "third caption");
    assert_eq!(body["ai_response"]["picture_url"], STUB_IMAGE_URL);

    // Four chat stages plus one image generation.
    assert_eq!(fixture.stub.chat_calls.load(Ordering::SeqCst), 4);
    assert_eq!(fixture.stub.image_calls.load(Ordering::SeqCst), 1);

    let data: Value = fixture
        .client
        .get(fixture.url("/api/v1/posts/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(data["status"]["state"], "completed");
    assert_eq!(data["ai_response"]["caption_text"], "first caption");

    let status: Value = fixture
        .client
        .get(fixture.url("/api/v1/posts/1/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"]["state"], "completed");
}

#[tokio::test]
async fn test_malformed_captions_mark_the_request_failed() {
    let fixture = TestFixture::new().await;
    fixture.create_business("Acme").await;
    fixture.stub.malformed_captions.store(true, Ordering::SeqCst);

    let response = fixture.send_post_request(1).await;
    assert_eq!(response.status(), 502);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "COMPLETION_ERROR");

    // The record must not read as success or as still running.
    let data: Value = fixture
        .client
        .get(fixture.url("/api/v1/posts/1"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(data["status"]["state"], "failed");
    assert!(!data["status"]["reason"].as_str().unwrap().is_empty());
    assert!(data.get("ai_response").is_none());
}

#[tokio::test]
async fn test_failed_request_resumes_from_checkpoint() {
    let fixture = TestFixture::new().await;
    fixture.create_business("Acme").await;

    fixture.stub.malformed_captions.store(true, Ordering::SeqCst);
    let response = fixture.send_post_request(1).await;
    assert_eq!(response.status(), 502);
    assert_eq!(fixture.stub.chat_calls.load(Ordering::SeqCst), 4);
    assert_eq!(fixture.stub.image_calls.load(Ordering::SeqCst), 0);

    // Same inputs again: stages 1-3 come from the checkpoint, only caption
    // generation and the image call run.
    fixture.stub.malformed_captions.store(false, Ordering::SeqCst);
    let response = fixture.send_post_request(1).await;
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["ai_response"]["caption_text"], "first caption");

    assert_eq!(fixture.stub.chat_calls.load(Ordering::SeqCst), 5);
    assert_eq!(fixture.stub.image_calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_concurrent_creations_get_distinct_ids() {
    let fixture = Arc::new(TestFixture::new().await);

    let first = {
        let fixture = fixture.clone();
        tokio::spawn(async move { fixture.create_business("Acme").await["id"].as_u64().unwrap() })
    };
    let second = {
        let fixture = fixture.clone();
        tokio::spawn(async move { fixture.create_business("Globex").await["id"].as_u64().unwrap() })
    };

    let mut ids = vec![first.await.unwrap(), second.await.unwrap()];
    ids.sort_unstable();
    assert_eq!(ids, vec![1, 2], "two creations must never share an id");
}

#[tokio::test]
async fn test_round_trip_fidelity_through_the_persisted_file() {
    let fixture = TestFixture::new().await;
    for name in ["Acme", "Globex", "Initech"] {
        fixture.create_business(name).await;
    }

    let listed: Value = fixture
        .client
        .get(fixture.url("/api/v1/business"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let businesses = listed["businesses"].as_object().unwrap();
    assert_eq!(businesses.len(), 3);
    assert_eq!(businesses["2"]["name"], "Globex");
    assert_eq!(businesses["2"]["description"], "bakery");
    assert_eq!(businesses["2"]["specifics"], "artisan bread");

    // The on-disk document is human-readable JSON keyed by string ids.
    let raw = tokio::fs::read_to_string(&fixture.db_path).await.unwrap();
    let document: Value = serde_json::from_str(&raw).unwrap();
    assert_eq!(document["1"]["name"], "Acme");
    assert_eq!(document["3"]["name"], "Initech");
    assert_eq!(document["3"]["email"], "a@x.com");
}

#[tokio::test]
async fn test_set_field_updates_profile() {
    let fixture = TestFixture::new().await;
    fixture.create_business("Acme").await;

    let response = fixture
        .client
        .patch(fixture.url("/api/v1/business/1"))
        .json(&json!({"field": "description", "value": "patisserie"}))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["description"], "patisserie");
}

#[tokio::test]
async fn test_clear_all_then_ids_restart() {
    let fixture = TestFixture::new().await;
    fixture.create_business("Acme").await;
    fixture.create_business("Globex").await;

    let response = fixture
        .client
        .delete(fixture.url("/api/v1/business"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 204);

    let ids: Value = fixture
        .client
        .get(fixture.url("/api/v1/business/ids"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(ids["ids"], json!([]));

    let recreated = fixture.create_business("Initech").await;
    assert_eq!(recreated["id"], 1);
}

#[tokio::test]
async fn test_post_data_requires_an_existing_request() {
    let fixture = TestFixture::new().await;
    fixture.create_business("Acme").await;

    let response = fixture
        .client
        .get(fixture.url("/api/v1/posts/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn test_publish_requires_a_completed_request() {
    let fixture = TestFixture::new().await;
    fixture.create_business("Acme").await;

    // No post request at all.
    let response = fixture
        .client
        .post(fixture.url("/api/v1/social/twitter/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 404);

    // A failed request is not publishable either.
    fixture.stub.malformed_captions.store(true, Ordering::SeqCst);
    fixture.send_post_request(1).await;
    let response = fixture
        .client
        .post(fixture.url("/api/v1/social/twitter/1"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), 400);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}
