use axum::http::{header, HeaderValue};
use axum_test::TestServer;
use redscope_common::{agent::create_agent, config::AppConfig};
use redscope_gateway::{create_router, AppState};
use serde_json::{json, Value};
use std::io::Write;
use tempfile::TempDir;

fn write_dataset(dir: &TempDir, rows: usize) -> std::path::PathBuf {
    let path = dir.path().join("posts.csv");
    let mut f = std::fs::File::create(&path).expect("create dataset");
    writeln!(f, "id_original,title_original,author_original,selftext_original,url_overridden_by_dest_original,permalink_original,ups_original").unwrap();
    for i in 0..rows {
        writeln!(
            f,
            "p{i},Post number {i},author{i},Body of post {i},https://example.com/img{i}.png,r/politics/comments/p{i}/,{i}"
        )
        .unwrap();
    }
    path
}

fn test_config(dir: &TempDir, rows: usize) -> AppConfig {
    let mut config = AppConfig::default();
    config.dataset.path = write_dataset(dir, rows);
    config.artifacts.root = dir.path().join("plots");
    config.agent.provider = "mock".to_string();
    config.rate_limit.enabled = false;
    config
}

fn server(config: AppConfig) -> TestServer {
    let agent = create_agent(&config.agent);
    let state = AppState::new(config, agent).expect("app state");
    TestServer::builder()
        .save_cookies()
        .build(create_router(state))
        .unwrap()
}

fn location(resp: &axum_test::TestResponse) -> String {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

#[tokio::test]
async fn health_endpoint_returns_ok() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_config(&dir, 3));

    let resp = server.get("/health").await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body["status"], "healthy");
}

#[tokio::test]
async fn ready_reports_dataset_state() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_config(&dir, 3));
    let resp = server.get("/ready").await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body["checks"]["dataset"]["status"], "up");
    assert_eq!(body["checks"]["agent"]["detail"], "mock-agent");

    let mut config = test_config(&dir, 3);
    config.dataset.path = dir.path().join("missing.csv");
    let server = self::server(config);
    let resp = server.get("/ready").await;
    assert_eq!(resp.status_code(), 503);
    let body: Value = resp.json();
    assert_eq!(body["status"], "not_ready");
}

#[tokio::test]
async fn post_list_pages_through_dataset() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_config(&dir, 2500));

    let page = server.get("/posts").await;
    assert_eq!(page.status_code(), 200);
    let html = page.text();
    assert_eq!(html.matches("<li value=").count(), 1000);
    assert!(html.contains("Load more posts"));
    assert!(html.contains("id=p999\""));
    assert!(!html.contains("id=p1000\""));

    let resp = server.post("/posts/more").await;
    assert_eq!(resp.status_code(), 303);
    assert_eq!(location(&resp), "/posts");
    assert_eq!(server.get("/posts").await.text().matches("<li value=").count(), 2000);

    server.post("/posts/more").await;
    let html = server.get("/posts").await.text();
    assert_eq!(html.matches("<li value=").count(), 2500);
    assert!(!html.contains("Load more posts"));

    // Past the end nothing changes
    server.post("/posts/more").await;
    assert_eq!(server.get("/posts").await.text().matches("<li value=").count(), 2500);
}

#[tokio::test]
async fn post_details_renders_and_reports_errors() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_config(&dir, 5));

    let resp = server.get("/post_details").add_query_param("id", "p2").await;
    assert_eq!(resp.status_code(), 200);
    let html = resp.text();
    assert!(html.contains("Post number 2"));
    assert!(html.contains("u/author2"));
    assert!(html.contains("<img src="));
    assert!(html.contains("img2.png"));

    let missing = server.get("/post_details").add_query_param("id", "xyz").await;
    assert_eq!(missing.status_code(), 404);
    assert!(missing.text().contains("Post not found."));

    let no_id = server.get("/post_details").await;
    assert_eq!(no_id.status_code(), 400);
    assert!(no_id.text().contains("No post ID provided."));

    // The rest of the app is unaffected
    assert_eq!(server.get("/posts").await.status_code(), 200);
}

#[tokio::test]
async fn api_post_endpoints() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_config(&dir, 30));

    let resp = server
        .get("/api/posts")
        .add_query_param("offset", "25")
        .add_query_param("limit", "10")
        .await;
    let body: Value = resp.json();
    assert_eq!(body["total"], 30);
    assert_eq!(body["posts"].as_array().unwrap().len(), 5);
    assert_eq!(body["posts"][0]["id"], "p25");
    assert_eq!(body["posts"][0]["position"], 26);

    let resp = server.get("/api/posts/p3").await;
    assert_eq!(resp.status_code(), 200);
    let body: Value = resp.json();
    assert_eq!(body["post"]["title"], "Post number 3");
    assert_eq!(body["media"]["kind"], "image");

    let resp = server.get("/api/posts/nope").await;
    assert_eq!(resp.status_code(), 404);
    let body: Value = resp.json();
    assert_eq!(body["error"]["code"], "POST_NOT_FOUND");
}

#[tokio::test]
async fn dataset_chat_keeps_submission_order() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_config(&dir, 10));

    let first = server.post("/api/chat").json(&json!({ "question": "First?" })).await;
    assert_eq!(first.status_code(), 200);
    let body: Value = first.json();
    assert_eq!(body["response"]["text"], "Answer to: First?");

    server.post("/api/chat").json(&json!({ "question": "  Second?  " })).await;

    let snapshot: Value = server.get("/api/session").await.json();
    let entries = snapshot["dataset_chat"].as_array().unwrap();
    let texts: Vec<&str> = entries.iter().map(|e| e["text"].as_str().unwrap()).collect();
    assert_eq!(
        texts,
        vec!["First?", "Answer to: First?", "Second?", "Answer to: Second?"]
    );
    assert_eq!(entries[0]["role"], "user");
    assert_eq!(entries[1]["role"], "assistant");
}

#[tokio::test]
async fn post_chat_is_isolated_per_post() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_config(&dir, 10));

    let resp = server
        .post("/post_details/ask")
        .form(&[("id", "p1"), ("question", "Who wrote this?")])
        .await;
    assert_eq!(resp.status_code(), 303);
    assert_eq!(location(&resp), "/post_details?id=p1");

    let html = server.get("/post_details").add_query_param("id", "p1").await.text();
    assert!(html.contains("Answer to: Who wrote this?"));

    let other = server.get("/post_details").add_query_param("id", "p2").await.text();
    assert!(!other.contains("Who wrote this?"));

    let unknown = server
        .post("/api/chat")
        .json(&json!({ "question": "Hello?", "post_id": "xyz" }))
        .await;
    assert_eq!(unknown.status_code(), 404);

    let snapshot: Value = server.get("/api/session").await.json();
    assert_eq!(snapshot["post_chats"]["p1"].as_array().unwrap().len(), 2);
    assert!(snapshot["post_chats"].get("xyz").is_none());
    assert!(snapshot["dataset_chat"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn chat_form_round_trip_and_validation() {
    let dir = tempfile::tempdir().unwrap();
    let server = server(test_config(&dir, 10));

    let resp = server.post("/chat/ask").form(&[("question", "How many posts?")]).await;
    assert_eq!(resp.status_code(), 303);
    assert_eq!(location(&resp), "/chat");

    let html = server.get("/chat").await.text();
    assert!(html.contains("Answer to: How many posts?"));
    assert!(html.contains("id_original"));

    let blank = server.post("/chat/ask").form(&[("question", "   ")]).await;
    assert_eq!(blank.status_code(), 400);

    let snapshot: Value = server.get("/api/session").await.json();
    assert_eq!(snapshot["dataset_chat"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn missing_api_key_disables_questions_only() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir, 5);
    config.agent.provider = "gemini".to_string();
    config.agent.api_key_env = "REDSCOPE_TEST_KEY_THAT_IS_NEVER_SET".to_string();
    let server = server(config);

    let html = server.get("/chat").await.text();
    assert!(html.contains("REDSCOPE_TEST_KEY_THAT_IS_NEVER_SET is not set"));
    assert!(!html.contains("action=\"/chat/ask\""));

    let resp = server.post("/api/chat").json(&json!({ "question": "Anyone?" })).await;
    assert_eq!(resp.status_code(), 503);

    let snapshot: Value = server.get("/api/session").await.json();
    assert!(snapshot["dataset_chat"].as_array().unwrap().is_empty());

    assert_eq!(server.get("/posts").await.status_code(), 200);
    assert_eq!(server.get("/ready").await.status_code(), 200);
}

#[tokio::test]
async fn question_endpoints_are_rate_limited() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = test_config(&dir, 5);
    config.rate_limit.enabled = true;
    config.rate_limit.requests_per_second = 1;
    config.rate_limit.burst = 1;
    let server = server(config);

    let ok = server.post("/api/chat").json(&json!({ "question": "One?" })).await;
    assert_eq!(ok.status_code(), 200);

    let limited = server.post("/api/chat").json(&json!({ "question": "Two?" })).await;
    assert_eq!(limited.status_code(), 429);
    let body: Value = limited.json();
    assert_eq!(body["error"]["code"], "RATE_LIMITED");

    // Browsing is not limited
    assert_eq!(server.get("/posts").await.status_code(), 200);
}

#[tokio::test]
async fn session_cookie_is_reused_and_can_be_ended() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir, 5);
    let agent = create_agent(&config.agent);
    let state = AppState::new(config, agent).expect("app state");
    let server = TestServer::new(create_router(state)).unwrap();

    let first = server.get("/api/session").await;
    let cookie = first
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("redscope_session="));
    let pair = cookie.split(';').next().unwrap().to_string();
    let id = first.json::<Value>()["id"].clone();

    let again = server
        .get("/api/session")
        .add_header(header::COOKIE, HeaderValue::from_str(&pair).unwrap())
        .await;
    assert!(again.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(again.json::<Value>()["id"], id);

    let ended = server
        .delete("/api/session")
        .add_header(header::COOKIE, HeaderValue::from_str(&pair).unwrap())
        .await;
    assert_eq!(ended.status_code(), 204);
    let cleared = ended.headers().get(header::SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cleared.contains("Max-Age=0"));

    let fresh = server
        .get("/api/session")
        .add_header(header::COOKIE, HeaderValue::from_str(&pair).unwrap())
        .await;
    assert_ne!(fresh.json::<Value>()["id"], id);
    assert!(fresh.headers().get(header::SET_COOKIE).is_some());
}

#[tokio::test]
async fn dashboard_lists_every_section() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir, 3);
    let plots = config.artifacts.root.join("info_spread");
    std::fs::create_dir_all(&plots).unwrap();
    std::fs::write(plots.join("daily_posting_trends.html"), "<div>trend chart</div>").unwrap();
    let server = server(config);

    let resp = server.get("/").await;
    assert_eq!(resp.status_code(), 200);
    let html = resp.text();
    for anchor in ["description", "time-patterns", "community-spread", "user-engagement", "author-behavior", "content-analysis"] {
        assert!(html.contains(&format!("href=\"#{}\"", anchor)), "missing {}", anchor);
    }
    assert!(html.contains("&lt;div&gt;trend chart"));
    assert!(!html.contains("<div>trend chart"));
    assert!(html.contains("Chart unavailable"));

    let served = server.get("/artifacts/info_spread/daily_posting_trends.html").await;
    assert_eq!(served.status_code(), 200);
    assert_eq!(served.text(), "<div>trend chart</div>");
}
