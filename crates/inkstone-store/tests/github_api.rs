//! GitHub backend wire behavior, against a mocked Contents API.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use inkstone_core::error::ContentError;
use inkstone_core::traits::StorageBackend;
use inkstone_store::{GitHubConfig, GitHubStore};
use mockito::{Matcher, Server};
use serde_json::json;

fn store_for(server: &Server) -> GitHubStore {
    let config = GitHubConfig::new("acme", "site", "test-token")
        .with_branch("main")
        .with_api_base(server.url());
    GitHubStore::new(config).unwrap()
}

#[tokio::test]
async fn read_decodes_content_and_sha() {
    let mut server = Server::new_async().await;
    let raw = "---\ntitle: Hello\n---\nbody\n";
    // The API wraps base64 at 60 columns; embedded newlines must not break decoding
    let mut encoded = BASE64.encode(raw);
    encoded.insert(8, '\n');
    let mock = server
        .mock("GET", "/repos/acme/site/contents/content/posts/hello.md")
        .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
        .with_status(200)
        .with_body(
            json!({
                "name": "hello.md",
                "path": "content/posts/hello.md",
                "sha": "abc123",
                "content": encoded,
                "encoding": "base64",
            })
            .to_string(),
        )
        .create_async()
        .await;

    let store = store_for(&server);
    let read = store.read("content/posts/hello.md").await.unwrap();
    assert_eq!(read.content.as_deref(), Some(raw));
    assert_eq!(read.revision_token.as_deref(), Some("abc123"));
    mock.assert_async().await;
}

#[tokio::test]
async fn read_missing_is_absent() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/repos/acme/site/contents/content/posts/none.md")
        .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create_async()
        .await;

    let store = store_for(&server);
    let read = store.read("content/posts/none.md").await.unwrap();
    assert!(read.content.is_none());
    assert!(read.revision_token.is_none());
}

#[tokio::test]
async fn write_threads_expected_sha_and_returns_new_token() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/repos/acme/site/contents/content/posts/hello.md")
        .match_body(Matcher::PartialJson(json!({
            "sha": "abc123",
            "branch": "main",
            "message": "Update content/posts/hello.md",
        })))
        .with_status(200)
        .with_body(json!({"content": {"sha": "def456"}}).to_string())
        .create_async()
        .await;

    let store = store_for(&server);
    let receipt = store
        .write("content/posts/hello.md", "updated", Some("abc123"))
        .await
        .unwrap();
    assert_eq!(receipt.revision_token.as_deref(), Some("def456"));
    mock.assert_async().await;
}

#[tokio::test]
async fn write_without_token_sends_no_sha() {
    let mut server = Server::new_async().await;
    let mock = server
        .mock("PUT", "/repos/acme/site/contents/content/posts/new.md")
        .match_body(Matcher::Json(json!({
            "message": "Update content/posts/new.md",
            "content": BASE64.encode("fresh"),
            "branch": "main",
        })))
        .with_status(201)
        .with_body(json!({"content": {"sha": "first"}}).to_string())
        .create_async()
        .await;

    let store = store_for(&server);
    let receipt = store
        .write("content/posts/new.md", "fresh", None)
        .await
        .unwrap();
    assert_eq!(receipt.revision_token.as_deref(), Some("first"));
    mock.assert_async().await;
}

#[tokio::test]
async fn tokenless_write_replaces_an_existing_file() {
    let mut server = Server::new_async().await;
    // The sha-less PUT is rejected because the file already exists
    let first = server
        .mock("PUT", "/repos/acme/site/contents/content/posts/exists.md")
        .match_body(Matcher::Json(json!({
            "message": "Update content/posts/exists.md",
            "content": BASE64.encode("new content"),
            "branch": "main",
        })))
        .with_status(422)
        .with_body(r#"{"message":"Invalid request.\n\n\"sha\" wasn't supplied."}"#)
        .create_async()
        .await;
    server
        .mock("GET", "/repos/acme/site/contents/content/posts/exists.md")
        .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
        .with_status(200)
        .with_body(json!({"sha": "cur123", "content": ""}).to_string())
        .create_async()
        .await;
    let retry = server
        .mock("PUT", "/repos/acme/site/contents/content/posts/exists.md")
        .match_body(Matcher::PartialJson(json!({"sha": "cur123"})))
        .with_status(200)
        .with_body(json!({"content": {"sha": "new456"}}).to_string())
        .create_async()
        .await;

    let store = store_for(&server);
    let receipt = store
        .write("content/posts/exists.md", "new content", None)
        .await
        .unwrap();
    assert_eq!(receipt.revision_token.as_deref(), Some("new456"));
    first.assert_async().await;
    retry.assert_async().await;
}

#[tokio::test]
async fn stale_sha_is_a_retryable_conflict() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/repos/acme/site/contents/content/posts/race.md")
        .with_status(409)
        .with_body(r#"{"message":"is at 1234 but expected abcd"}"#)
        .create_async()
        .await;

    let store = store_for(&server);
    let err = store
        .write("content/posts/race.md", "late", Some("abcd"))
        .await
        .unwrap_err();
    assert!(matches!(err, ContentError::Conflict { .. }));
    assert!(err.is_retryable());
}

#[tokio::test]
async fn sha_mismatch_422_is_also_a_conflict() {
    let mut server = Server::new_async().await;
    server
        .mock("PUT", "/repos/acme/site/contents/content/posts/race.md")
        .with_status(422)
        .with_body(r#"{"message":"content/posts/race.md does not match the expected sha"}"#)
        .create_async()
        .await;

    let store = store_for(&server);
    let err = store
        .write("content/posts/race.md", "late", Some("abcd"))
        .await
        .unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn remove_fetches_sha_then_deletes() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/repos/acme/site/contents/content/posts/old.md")
        .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
        .with_status(200)
        .with_body(json!({"sha": "dead99", "content": ""}).to_string())
        .create_async()
        .await;
    let delete = server
        .mock("DELETE", "/repos/acme/site/contents/content/posts/old.md")
        .match_body(Matcher::PartialJson(json!({
            "sha": "dead99",
            "branch": "main",
            "message": "Delete content/posts/old.md",
        })))
        .with_status(200)
        .with_body(r#"{"content": null}"#)
        .create_async()
        .await;

    let store = store_for(&server);
    store.remove("content/posts/old.md").await.unwrap();
    delete.assert_async().await;
}

#[tokio::test]
async fn remove_missing_is_not_found() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/repos/acme/site/contents/content/posts/none.md")
        .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create_async()
        .await;

    let store = store_for(&server);
    let err = store.remove("content/posts/none.md").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn list_filters_and_strips_path_prefix() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/repos/acme/site/contents/web/content/posts")
        .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
        .with_status(200)
        .with_body(
            json!([
                {"name": "a.md", "path": "web/content/posts/a.md", "type": "file",
                 "download_url": "https://raw.example/a.md"},
                {"name": "b.mdx", "path": "web/content/posts/b.mdx", "type": "file",
                 "download_url": "https://raw.example/b.mdx"},
                {"name": "img.png", "path": "web/content/posts/img.png", "type": "file",
                 "download_url": "https://raw.example/img.png"},
                {"name": "drafts", "path": "web/content/posts/drafts", "type": "dir",
                 "download_url": null},
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let config = GitHubConfig::new("acme", "site", "test-token")
        .with_api_base(server.url())
        .with_path_prefix("web");
    let store = GitHubStore::new(config).unwrap();

    let entries = store.list_files("content/posts").await.unwrap();
    let paths: Vec<_> = entries.iter().map(|e| e.path.as_str()).collect();
    assert_eq!(paths, ["content/posts/a.md", "content/posts/b.mdx"]);
    assert_eq!(
        entries[0].download_url.as_deref(),
        Some("https://raw.example/a.md")
    );
}

#[tokio::test]
async fn list_missing_directory_is_empty() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/repos/acme/site/contents/content/empty")
        .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
        .with_status(404)
        .with_body(r#"{"message":"Not Found"}"#)
        .create_async()
        .await;

    let store = store_for(&server);
    let entries = store.list_files("content/empty").await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn credential_rejection_is_transport() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/repos/acme/site/contents/content/posts/a.md")
        .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
        .with_status(401)
        .with_body(r#"{"message":"Bad credentials"}"#)
        .create_async()
        .await;

    let store = store_for(&server);
    let err = store.read("content/posts/a.md").await.unwrap_err();
    assert!(matches!(err, ContentError::Transport(_)));
    assert!(!err.is_retryable());
}
