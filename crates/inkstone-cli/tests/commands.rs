//! Command-level tests against a local content root.

use inkstone_cli::commands;
use inkstone_cli::config::{CliConfig, ContentMode};
use inkstone_core::traits::EditorIdentity;
use inkstone_core::Collection;
use tempfile::TempDir;

fn config_for(root: &TempDir) -> CliConfig {
    CliConfig {
        mode: ContentMode::Local,
        root: root.path().to_path_buf(),
        editors: Vec::new(),
        identity: EditorIdentity {
            id: "tester".into(),
            email: None,
        },
    }
}

#[tokio::test]
async fn new_then_set_updates_the_file() {
    let root = TempDir::new().unwrap();
    let config = config_for(&root);

    commands::new::run(&config, Collection::Posts, "Hello World", None, false)
        .await
        .unwrap();
    let path = root.path().join("content/posts/hello-world.md");
    let stored = std::fs::read_to_string(&path).unwrap();
    assert!(stored.contains("title: Hello World"));
    assert!(stored.contains("draft: true"));

    commands::set::run(
        &config,
        Collection::Posts,
        "hello-world",
        "draft",
        "false",
    )
    .await
    .unwrap();
    let stored = std::fs::read_to_string(&path).unwrap();
    assert!(stored.contains("draft: false"));
}

#[tokio::test]
async fn save_commits_a_raw_blob_verbatim() {
    let root = TempDir::new().unwrap();
    let config = config_for(&root);

    let blob = "---\ntitle: Raw\ncustom: [1, 2]\n---\nhand-written body\n";
    let input = root.path().join("input.md");
    std::fs::write(&input, blob).unwrap();

    commands::save::run(&config, Collection::Posts, "raw-doc", &input)
        .await
        .unwrap();
    let stored =
        std::fs::read_to_string(root.path().join("content/posts/raw-doc.md")).unwrap();
    assert_eq!(stored, blob);
}

#[tokio::test]
async fn new_refuses_to_clobber_existing() {
    let root = TempDir::new().unwrap();
    let config = config_for(&root);

    commands::new::run(&config, Collection::Posts, "Twice", None, false)
        .await
        .unwrap();
    let err = commands::new::run(&config, Collection::Posts, "Twice", None, false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("already exists"));
}

#[tokio::test]
async fn allowlisted_strangers_cannot_write() {
    let root = TempDir::new().unwrap();
    let mut config = config_for(&root);
    config.editors = vec!["admin@example.com".into()];

    let err = commands::new::run(&config, Collection::Posts, "Nope", None, false)
        .await
        .unwrap_err();
    assert!(err.to_string().contains("allowlist"));
}

#[tokio::test]
async fn section_command_respects_profiles() {
    let root = TempDir::new().unwrap();
    let config = config_for(&root);

    commands::new::run(&config, Collection::Services, "Audits", None, false)
        .await
        .unwrap();
    commands::section::run(
        &config,
        Collection::Services,
        "audits",
        inkstone_cli::cli::SectionAction::Add,
        "pricing",
    )
    .await
    .unwrap();

    let stored =
        std::fs::read_to_string(root.path().join("content/services/audits.md")).unwrap();
    assert!(stored.contains("label: Starting at"));

    // Portfolio-only sections are rejected for services
    let err = commands::section::run(
        &config,
        Collection::Services,
        "audits",
        inkstone_cli::cli::SectionAction::Add,
        "testimonial",
    )
    .await
    .unwrap_err();
    assert!(err.to_string().contains("not available"));
}
