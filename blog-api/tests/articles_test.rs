use std::future::Future;
use std::sync::{Arc, Mutex};

use axum::http::header::CONTENT_TYPE;
use blog_api::build_app;
use blog_api::models::Article;
use blog_api::revalidate::{RevalidateError, RevalidateTarget, Revalidator};
use blog_api::services::ArticleService;
use blog_api::state::AppState;
use blog_data::bson::DateTime;
use blog_data::{InMemoryStore, Query, Repository};
use blog_test::TestApp;
use chrono::Utc;
use serde_json::{json, Value};

const BASE_MILLIS: i64 = 1_700_000_000_000;

#[derive(Clone, Default)]
struct RecordingRevalidator {
    calls: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingRevalidator {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn paths(&self) -> Vec<String> {
        let mut paths = self.calls.lock().unwrap().clone();
        paths.sort();
        paths
    }
}

impl Revalidator for RecordingRevalidator {
    fn revalidate(
        &self,
        target: RevalidateTarget,
    ) -> impl Future<Output = Result<(), RevalidateError>> + Send {
        self.calls.lock().unwrap().push(target.path);
        let fail = self.fail;
        async move {
            if fail {
                Err(RevalidateError::Status(503))
            } else {
                Ok(())
            }
        }
    }
}

struct Harness {
    app: TestApp,
    store: InMemoryStore,
    revalidator: RecordingRevalidator,
}

impl Harness {
    fn with(revalidator: RecordingRevalidator) -> Self {
        let store = InMemoryStore::new();
        let service = ArticleService::new(store.clone(), revalidator.clone());
        Self {
            app: TestApp::new(build_app(AppState::new(service))),
            store,
            revalidator,
        }
    }

    fn new() -> Self {
        Self::with(RecordingRevalidator::default())
    }

    fn repo(&self) -> Repository<Article, InMemoryStore> {
        Repository::new(self.store.clone())
    }

    async fn stored(&self) -> Vec<Article> {
        self.repo().find(&Query::new()).await.unwrap()
    }

    async fn seed(&self, articles: Vec<Article>) {
        let repo = self.repo();
        for article in &articles {
            repo.insert(article).await.unwrap();
        }
    }
}

fn article(title: &str, tags: &[&str], status: &str, minute: i64) -> Article {
    Article {
        id: None,
        title: title.to_string(),
        summary: String::new(),
        tags: tags.iter().map(|t| t.to_string()).collect(),
        content: "body".to_string(),
        view_count: 0,
        status: status.to_string(),
        kind: "technology".to_string(),
        created_at: DateTime::from_millis(BASE_MILLIS + minute * 60_000),
        cover_image: String::new(),
    }
}

fn titles(body: &Value) -> Vec<String> {
    body["articles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["title"].as_str().unwrap().to_string())
        .collect()
}

fn created_at_millis(body: &Value) -> Vec<i64> {
    body["articles"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| {
            chrono::DateTime::parse_from_rfc3339(a["createdAt"].as_str().unwrap())
                .unwrap()
                .timestamp_millis()
        })
        .collect()
}

// --- create ---

#[tokio::test]
async fn create_with_required_fields_fills_defaults() {
    let h = Harness::new();
    let before = Utc::now().timestamp_millis();

    let resp = h
        .app
        .post("/articles")
        .json(&json!({ "title": "A", "content": "B" }))
        .send()
        .await
        .assert_created()
        .assert_json_path("success", true)
        .assert_json_path("message", "Article published")
        .assert_json_path_fn("articleId", |v| v.as_str().is_some_and(|s| s.len() == 24));
    let after = Utc::now().timestamp_millis();

    let stored = h.stored().await;
    assert_eq!(stored.len(), 1);
    let a = &stored[0];
    assert_eq!(a.id.map(|id| id.to_hex()), Some(resp.json_path::<String>("articleId")));
    assert_eq!(a.title, "A");
    assert_eq!(a.content, "B");
    assert_eq!(a.summary, "");
    assert!(a.tags.is_empty());
    assert_eq!(a.view_count, 0);
    assert_eq!(a.status, "published");
    assert_eq!(a.kind, "technology");
    assert_eq!(a.cover_image, "");

    let offset = 8 * 60 * 60 * 1000;
    let created = a.created_at.timestamp_millis();
    assert!(created >= before + offset && created <= after + offset);
}

#[tokio::test]
async fn create_keeps_supplied_fields() {
    let h = Harness::new();
    h.app
        .post("/articles")
        .json(&json!({
            "title": "Ownership",
            "content": "Borrowing rules",
            "summary": "intro",
            "tags": ["rust", "memory"],
            "viewCount": 3,
            "status": "draft",
            "type": "tutorial",
            "coverImage": "https://img/1.png",
            "createdAt": "1999-01-01T00:00:00Z"
        }))
        .send()
        .await
        .assert_created();

    let stored = h.stored().await;
    let a = &stored[0];
    assert_eq!(a.summary, "intro");
    assert_eq!(a.tags, vec!["rust", "memory"]);
    assert_eq!(a.view_count, 3);
    assert_eq!(a.status, "draft");
    assert_eq!(a.kind, "tutorial");
    assert_eq!(a.cover_image, "https://img/1.png");
    assert!(a.created_at.timestamp_millis() > BASE_MILLIS);
}

#[tokio::test]
async fn create_revalidates_home_and_list_pages() {
    let h = Harness::new();
    h.app
        .post("/articles")
        .json(&json!({ "title": "A", "content": "B" }))
        .send()
        .await
        .assert_created();

    assert_eq!(h.revalidator.paths(), vec!["/", "/posts"]);
}

#[tokio::test]
async fn missing_or_empty_required_fields_are_rejected_without_side_effects() {
    let h = Harness::new();
    let bodies = [
        json!({ "title": "", "content": "B" }),
        json!({ "title": "A", "content": "" }),
        json!({ "title": "A" }),
        json!({ "content": "B" }),
        json!({ "title": null, "content": "B" }),
        json!({}),
    ];

    for body in bodies {
        h.app
            .post("/articles")
            .json(&body)
            .send()
            .await
            .assert_bad_request()
            .assert_json_path("error", "title and content are required")
            .assert_json_path_fn("details", |d| d.as_array().is_some_and(|d| !d.is_empty()));
    }

    assert_eq!(h.store.len("articles").await, 0);
    assert!(h.revalidator.paths().is_empty());
}

#[tokio::test]
async fn malformed_bodies_are_rejected() {
    let h = Harness::new();

    h.app
        .post("/articles")
        .header(CONTENT_TYPE, "application/json")
        .body("{not json")
        .send()
        .await
        .assert_bad_request()
        .assert_json_path_fn("error", |e| e.is_string());

    h.app
        .post("/articles")
        .json(&json!({ "title": 5, "content": "B" }))
        .send()
        .await
        .assert_bad_request();

    h.app
        .post("/articles")
        .json(&json!("title and content"))
        .send()
        .await
        .assert_bad_request();

    h.app
        .post("/articles")
        .body(r#"{"title":"A","content":"B"}"#)
        .send()
        .await
        .assert_bad_request();

    assert_eq!(h.store.len("articles").await, 0);
    assert!(h.revalidator.paths().is_empty());
}

#[tokio::test]
async fn revalidation_failure_does_not_fail_the_create() {
    let h = Harness::with(RecordingRevalidator::failing());
    h.app
        .post("/articles")
        .json(&json!({ "title": "A", "content": "B" }))
        .send()
        .await
        .assert_created()
        .assert_json_path("success", true);

    assert_eq!(h.store.len("articles").await, 1);
    assert_eq!(h.revalidator.paths(), vec!["/", "/posts"]);
}

#[tokio::test]
async fn insert_failure_is_a_server_error_and_skips_revalidation() {
    let h = Harness::new();
    h.store.fail_with("connection refused").await;

    h.app
        .post("/articles")
        .json(&json!({ "title": "A", "content": "B" }))
        .send()
        .await
        .assert_server_error()
        .assert_json_path("error", "Failed to publish article")
        .assert_json_path("message", "Connection error: connection refused");

    assert!(h.revalidator.paths().is_empty());
    h.store.recover().await;
    assert_eq!(h.store.len("articles").await, 0);
}

// --- list ---

#[tokio::test]
async fn tag_filter_returns_matching_articles_newest_first() {
    let h = Harness::new();
    let mut seeded = Vec::new();
    for i in 0..10 {
        let tags: &[&str] = match i {
            2 | 5 | 8 => &["go", "backend"],
            _ => &["rust"],
        };
        seeded.push(article(&format!("post-{i}"), tags, "published", i));
    }
    h.seed(seeded).await;

    let resp = h
        .app
        .get("/articles")
        .query("tag", "go")
        .query("limit", 5)
        .send()
        .await
        .assert_ok()
        .assert_json_path("total", 3)
        .assert_json_path("articles.len()", 3);

    let body: Value = resp.json();
    assert_eq!(titles(&body), vec!["post-8", "post-5", "post-2"]);
    for a in body["articles"].as_array().unwrap() {
        assert!(a["tags"].as_array().unwrap().contains(&json!("go")));
    }
}

#[tokio::test]
async fn status_filter_matches_exactly() {
    let h = Harness::new();
    h.seed(vec![
        article("a", &[], "published", 1),
        article("b", &[], "draft", 2),
        article("c", &[], "Draft", 3),
        article("d", &[], "draft", 4),
    ])
    .await;

    let body: Value = h
        .app
        .get("/articles")
        .query("status", "draft")
        .send()
        .await
        .assert_ok()
        .assert_json_path("total", 2)
        .json();
    assert_eq!(titles(&body), vec!["d", "b"]);
}

#[tokio::test]
async fn repeated_parameters_use_the_first_value() {
    let h = Harness::new();
    h.seed(vec![
        article("a", &["go"], "published", 1),
        article("b", &["rust"], "published", 2),
        article("c", &["go", "rust"], "draft", 3),
    ])
    .await;

    let body: Value = h
        .app
        .get("/articles?tag=go&tag=rust&limit=1&limit=10")
        .send()
        .await
        .assert_ok()
        .assert_json_path("total", 1)
        .json();
    assert_eq!(titles(&body), vec!["c"]);

    let body: Value = h
        .app
        .get("/articles?status=published&status=draft&tag=go")
        .send()
        .await
        .assert_ok()
        .json();
    assert_eq!(titles(&body), vec!["a"]);
}

#[tokio::test]
async fn status_and_tag_filters_combine() {
    let h = Harness::new();
    h.seed(vec![
        article("a", &["go"], "published", 1),
        article("b", &["go"], "draft", 2),
        article("c", &["rust"], "draft", 3),
    ])
    .await;

    let body: Value = h
        .app
        .get("/articles?status=draft&tag=go")
        .send()
        .await
        .assert_ok()
        .json();
    assert_eq!(titles(&body), vec!["b"]);
}

#[tokio::test]
async fn unfiltered_list_is_sorted_and_capped_at_default_limit() {
    let h = Harness::new();
    let seeded = (0..105)
        .map(|i| article(&format!("post-{i}"), &[], "published", (i * 37) % 105))
        .collect();
    h.seed(seeded).await;

    let body: Value = h
        .app
        .get("/articles")
        .send()
        .await
        .assert_ok()
        .assert_json_path("total", 100)
        .assert_json_path("articles.len()", 100)
        .json();

    let times = created_at_millis(&body);
    assert!(times.windows(2).all(|w| w[0] >= w[1]));
    assert_eq!(times[0], BASE_MILLIS + 104 * 60_000);
}

#[tokio::test]
async fn limit_parameter_handling() {
    let h = Harness::new();
    h.seed((0..4).map(|i| article(&format!("p{i}"), &[], "published", i)).collect())
        .await;

    let cases = [("2", 2), ("0", 4), ("abc", 4), ("-3", 3), ("", 4)];
    for (limit, expected) in cases {
        h.app
            .get("/articles")
            .query("limit", limit)
            .send()
            .await
            .assert_ok()
            .assert_json_path("total", expected);
    }
}

#[tokio::test]
async fn repeated_list_is_identical() {
    let h = Harness::new();
    h.seed(vec![
        article("a", &["x"], "published", 5),
        article("b", &["x"], "published", 5),
        article("c", &["y"], "published", 1),
    ])
    .await;

    let first: Value = h.app.get("/articles").send().await.assert_ok().json();
    let second: Value = h.app.get("/articles").send().await.assert_ok().json();
    assert_eq!(first, second);
}

#[tokio::test]
async fn empty_store_lists_nothing() {
    let h = Harness::new();
    h.app
        .get("/articles")
        .send()
        .await
        .assert_ok()
        .assert_json_path("articles", json!([]))
        .assert_json_path("total", 0);
}

#[tokio::test]
async fn list_renders_article_json() {
    let h = Harness::new();
    h.app
        .post("/articles")
        .json(&json!({ "title": "A", "content": "B", "tags": ["go"], "viewCount": 9 }))
        .send()
        .await
        .assert_created();

    h.app
        .get("/articles")
        .send()
        .await
        .assert_ok()
        .assert_json_path_fn("articles[0]._id", |v| v.as_str().is_some_and(|s| s.len() == 24))
        .assert_json_path("articles[0].title", "A")
        .assert_json_path("articles[0].content", "B")
        .assert_json_path("articles[0].summary", "")
        .assert_json_path("articles[0].tags", json!(["go"]))
        .assert_json_path("articles[0].viewCount", 9)
        .assert_json_path("articles[0].status", "published")
        .assert_json_path("articles[0].type", "technology")
        .assert_json_path("articles[0].coverImage", "")
        .assert_json_path_fn("articles[0].createdAt", |v| {
            v.as_str()
                .is_some_and(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok())
        });
}

#[tokio::test]
async fn list_failure_is_a_server_error() {
    let h = Harness::new();
    h.store.fail_with("connection reset").await;

    h.app
        .get("/articles")
        .send()
        .await
        .assert_server_error()
        .assert_json_path("error", "Failed to list articles")
        .assert_json_path("message", "Connection error: connection reset");
}

// --- routing ---

#[tokio::test]
async fn trailing_slash_is_accepted() {
    let h = Harness::new();
    h.seed(vec![article("a", &[], "published", 1)]).await;

    h.app
        .get("/articles/")
        .query("limit", 1)
        .send()
        .await
        .assert_ok()
        .assert_json_path("total", 1);
}

#[tokio::test]
async fn health_reports_up() {
    let h = Harness::new();
    h.app
        .get("/health")
        .send()
        .await
        .assert_ok()
        .assert_json_path("status", "UP");
}
