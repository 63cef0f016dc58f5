//! Integration tests for the snippet JSON API and snippet actions.

use axum::http::StatusCode;
use reusify_integration_tests::{TestApp, tag_names};
use serde_json::json;

// =============================================================================
// Lifecycle
// =============================================================================

#[tokio::test]
async fn test_create_update_delete() {
    let app = TestApp::new();
    let mut client = app.client();
    let user_id = client.register("Ada", "ada@example.com").await;

    let created = client.create_snippet("Hello", &["demo", "rust"]).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["userId"].as_i64(), Some(user_id));
    assert_eq!(tag_names(&created), ["demo", "rust"]);

    let updated = client
        .put(
            &format!("/api/snippets/{id}"),
            json!({"title": "Hello again", "tags": ["rust", "sql"]}),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["title"], "Hello again");
    assert_eq!(updated.body["language"], "rust");
    assert_eq!(tag_names(&updated.body), ["rust", "sql"]);

    let shown = client.get(&format!("/api/snippets/{id}")).await;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.body["title"], "Hello again");
    assert_eq!(shown.body["user"], json!({"id": user_id, "name": "Ada"}));

    let deleted = client.delete(&format!("/api/snippets/{id}")).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.body["message"], "Snippet deleted successfully");

    let gone = client.get(&format!("/api/snippets/{id}")).await;
    assert_eq!(gone.status, StatusCode::NOT_FOUND);
    assert_eq!(gone.error(), "Snippet not found");

    let mine = client.get("/api/snippets/me").await;
    assert_eq!(mine.body, json!([]));
}

#[tokio::test]
async fn test_tag_replace_scenario() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register("Ada", "ada@example.com").await;

    let created = client
        .post(
            "/api/snippets/create",
            json!({"title": "X", "language": "TypeScript", "content": "const x=1", "tags": ["demo"]}),
        )
        .await;
    assert_eq!(created.status, StatusCode::CREATED);
    let uri = format!("/api/snippets/{}", created.body["id"].as_i64().unwrap());

    let shown = client.get(&uri).await;
    assert_eq!(tag_names(&shown.body), ["demo"]);

    client.put(&uri, json!({"tags": ["demo", "new"]})).await;
    let shown = client.get(&uri).await;
    assert_eq!(tag_names(&shown.body), ["demo", "new"]);

    client.delete(&uri).await;
    assert_eq!(client.get(&uri).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_update_without_tags_keeps_tags() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register("Ada", "ada@example.com").await;

    let created = client.create_snippet("Keep", &["demo"]).await;
    let id = created["id"].as_i64().unwrap();

    let updated = client
        .put(&format!("/api/snippets/{id}"), json!({"content": "fn main() {}"}))
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.body["content"], "fn main() {}");
    assert_eq!(tag_names(&updated.body), ["demo"]);

    let cleared = client
        .put(&format!("/api/snippets/{id}"), json!({"tags": []}))
        .await;
    assert_eq!(cleared.status, StatusCode::OK);
    assert!(tag_names(&cleared.body).is_empty());
}

// =============================================================================
// Validation
// =============================================================================

#[tokio::test]
async fn test_create_requires_fields() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register("Ada", "ada@example.com").await;

    for body in [
        json!({"language": "rust", "content": "x"}),
        json!({"title": "t", "content": "x"}),
        json!({"title": "t", "language": "rust", "content": "   "}),
    ] {
        let response = client.post("/api/snippets/create", body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error(), "Title, content and language are required");
    }

    let mine = client.get("/api/snippets/me").await;
    assert_eq!(mine.body, json!([]));
}

#[tokio::test]
async fn test_update_rejects_blank_field() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register("Ada", "ada@example.com").await;
    let id = client.create_snippet("Blank", &[]).await["id"].as_i64().unwrap();

    let response = client
        .put(&format!("/api/snippets/{id}"), json!({"title": "  "}))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error(), "Title cannot be empty");
}

#[tokio::test]
async fn test_duplicate_tags_collapse() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register("Ada", "ada@example.com").await;

    let created = client.create_snippet("Dupes", &["rust", " rust ", "io"]).await;
    assert_eq!(tag_names(&created), ["io", "rust"]);
}

// =============================================================================
// Ownership
// =============================================================================

#[tokio::test]
async fn test_other_user_cannot_modify() {
    let app = TestApp::new();
    let mut owner = app.client();
    owner.register("Ada", "ada@example.com").await;
    let id = owner.create_snippet("Mine", &["rust"]).await["id"].as_i64().unwrap();

    let mut other = app.client();
    other.register("Bob", "bob@example.com").await;

    let update = other
        .put(&format!("/api/snippets/{id}"), json!({"title": "Stolen"}))
        .await;
    assert_eq!(update.status, StatusCode::FORBIDDEN);
    assert_eq!(
        update.error(),
        "Forbidden: You don't have permission to modify this snippet"
    );

    let delete = other.delete(&format!("/api/snippets/{id}")).await;
    assert_eq!(delete.status, StatusCode::FORBIDDEN);
    assert_eq!(
        delete.error(),
        "Forbidden: You don't have permission to delete this snippet"
    );

    // Reading is allowed for any signed-in user.
    let shown = other.get(&format!("/api/snippets/{id}")).await;
    assert_eq!(shown.status, StatusCode::OK);
    assert_eq!(shown.body["title"], "Mine");

    let mine = other.get("/api/snippets/me").await;
    assert_eq!(mine.body, json!([]));
}

#[tokio::test]
async fn test_missing_snippet_is_not_found() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register("Ada", "ada@example.com").await;

    let update = client.put("/api/snippets/999", json!({"title": "x"})).await;
    assert_eq!(update.status, StatusCode::NOT_FOUND);

    let delete = client.delete("/api/snippets/999").await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_mine_newest_first() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register("Ada", "ada@example.com").await;

    let first = client.create_snippet("First", &[]).await["id"].as_i64().unwrap();
    client.create_snippet("Second", &[]).await;

    // Touching the first snippet moves it to the front.
    client
        .put(&format!("/api/snippets/{first}"), json!({"content": "touched"}))
        .await;

    let mine = client.get("/api/snippets/me").await;
    let titles: Vec<&str> = mine
        .body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["title"].as_str().unwrap())
        .collect();
    assert_eq!(titles, ["First", "Second"]);
}

// =============================================================================
// Snippet Actions
// =============================================================================

#[tokio::test]
async fn test_create_snippet_action() {
    let app = TestApp::new();
    let mut client = app.client();
    client.register("Ada", "ada@example.com").await;

    let response = client
        .post(
            "/actions/snippets",
            json!({"title": "Action", "language": "sql", "content": "SELECT 1", "tags": ["sql"]}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.succeeded());
    assert_eq!(response.body["snippet"]["title"], "Action");
    assert_eq!(tag_names(&response.body["snippet"]), ["sql"]);

    let invalid = client
        .post("/actions/snippets", json!({"title": "No content"}))
        .await;
    assert_eq!(invalid.status, StatusCode::OK);
    assert!(!invalid.succeeded());
    assert_eq!(invalid.error(), "Title, content and language are required");
}

#[tokio::test]
async fn test_search_snippets_action() {
    let app = TestApp::new();
    let mut ada = app.client();
    ada.register("Ada", "ada@example.com").await;
    ada.create_snippet("Parse JSON", &["serde"]).await;
    ada.create_snippet("Open socket", &["net"]).await;

    let mut bob = app.client();
    bob.register("Bob", "bob@example.com").await;
    bob.create_snippet("Parse JSON quickly", &["serde"]).await;

    let by_title = ada.get("/actions/snippets/search?q=json").await;
    assert!(by_title.succeeded());
    let found = by_title.body["snippets"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["title"], "Parse JSON");

    let by_tag = ada.get("/actions/snippets/search?q=NET").await;
    let found = by_tag.body["snippets"].as_array().unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0]["title"], "Open socket");

    let wildcard = ada.get("/actions/snippets/search?q=%25").await;
    assert_eq!(wildcard.body["snippets"], json!([]));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let app = TestApp::new();
    let mut client = app.client();

    let response = client.get("/health").await;
    assert!(response.request_id.is_some());
}
