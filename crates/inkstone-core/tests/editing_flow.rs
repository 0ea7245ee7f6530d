//! End-to-end editing flows over the in-memory backend.

use std::sync::Arc;

use inkstone_core::metadata::get_str;
use inkstone_core::test_support::MemoryStore;
use inkstone_core::{Collection, EditorSession, Metadata, Section, Value};

fn defaults(title: &str) -> Metadata {
    let mut meta = Metadata::new();
    meta.insert(Value::from("title"), Value::from(title));
    meta.insert(Value::from("draft"), Value::from(true));
    meta
}

#[tokio::test]
async fn create_edit_publish_cycle() {
    let store = Arc::new(MemoryStore::new());

    // Create
    let mut session = EditorSession::new(store.clone(), Collection::Posts, "launch");
    session.load(defaults("Launch Day")).await.unwrap();
    assert!(!session.exists());
    session.set_body("# Launch\n\nWe shipped.\n").unwrap();
    session.save().await.unwrap();

    // Edit through the rich-text surface
    let mut session = EditorSession::new(store.clone(), Collection::Posts, "launch");
    session.load(Metadata::new()).await.unwrap();
    let mut tree = session.rich_text();
    assert_eq!(tree.blocks.len(), 2);
    tree.blocks.push(inkstone_core::Block::Paragraph {
        content: vec![inkstone_core::Inline::text("More details soon.")],
    });
    session.commit_rich_text(&tree).unwrap();

    // Publish
    session.set_field("draft", Value::from(false)).unwrap();
    session.save().await.unwrap();

    let stored = store.raw("content/posts/launch.md").unwrap();
    assert!(stored.contains("draft: false"));
    assert!(stored.contains("More details soon."));
}

#[tokio::test]
async fn portfolio_sections_round_trip_through_storage() {
    let store = Arc::new(MemoryStore::new());

    let mut session = EditorSession::new(store.clone(), Collection::Portfolio, "acme");
    session.load(defaults("Acme Redesign")).await.unwrap();
    session.add_section(Section::Testimonial).unwrap();
    session
        .set_field("testimonial.quote", Value::from("Night and day."))
        .unwrap();
    session
        .append_item("results", {
            let mut item = Metadata::new();
            item.insert(Value::from("metric"), Value::from("Conversions"));
            item.insert(Value::from("value"), Value::from("+40%"));
            Value::Mapping(item)
        })
        .unwrap();
    session.save().await.unwrap();

    let mut reloaded = EditorSession::new(store, Collection::Portfolio, "acme");
    reloaded.load(Metadata::new()).await.unwrap();
    let meta = &reloaded.document().metadata;
    assert_eq!(get_str(meta, "testimonial.quote"), Some("Night and day."));
    assert_eq!(get_str(meta, "results.0.metric"), Some("Conversions"));
    // Untouched seeded keys survive the trip
    assert_eq!(get_str(meta, "testimonial.author"), Some(""));
}

#[tokio::test]
async fn raw_repair_of_a_corrupt_file() {
    let store = Arc::new(MemoryStore::new());
    store.seed(
        "content/posts/broken.md",
        "---\ntitle: [oops\n---\nThe body survived.\n",
    );

    let mut session = EditorSession::new(store.clone(), Collection::Posts, "broken");
    session.load(Metadata::new()).await.unwrap();
    assert!(session.warning().is_some());

    // Operator fixes the YAML by hand in raw mode
    let raw = session.enter_raw_mode().unwrap().to_string();
    let fixed = raw.replace("[oops", "Fixed");
    session.set_raw(fixed).unwrap();
    session.exit_raw_mode().unwrap();
    assert_eq!(session.document().title(), Some("Fixed"));

    session.save().await.unwrap();
    let mut reloaded = EditorSession::new(store, Collection::Posts, "broken");
    reloaded.load(Metadata::new()).await.unwrap();
    assert!(reloaded.warning().is_none());
    assert_eq!(reloaded.document().title(), Some("Fixed"));
    assert_eq!(reloaded.document().body, "The body survived.\n");
}
