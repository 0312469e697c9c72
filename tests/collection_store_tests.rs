use memocollect::{
    CollectionConfig, CollectionStore, Document, DurableEngine, MemoryEngine, Record,
    SequentialIdGenerator, StoreError,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

fn doc(text: &str) -> Document {
    Document::new().with("text", text)
}

fn doc_with_id(id: &str, text: &str) -> Document {
    Document::new().with("id", id).with("text", text)
}

fn sequential_config() -> CollectionConfig {
    CollectionConfig::new().id_generator(Arc::new(SequentialIdGenerator::default()))
}

async fn open_todos(engine: &MemoryEngine) -> CollectionStore<Document> {
    CollectionStore::open_with_config("todos", Arc::new(engine.clone()), sequential_config())
        .await
        .expect("open todos")
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
struct Todo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    title: String,
    done: bool,
}

impl Record for Todo {
    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: String) {
        self.id = Some(id);
    }
}

#[tokio::test]
async fn todos_scenario_insert_list_remove_update() {
    let engine = MemoryEngine::new();
    let todos = open_todos(&engine).await;
    assert!(todos.is_empty());

    let u1 = todos.insert(doc("a")).await.expect("insert a");
    let u2 = todos.insert(doc("b")).await.expect("insert b");
    assert_eq!(u1, "u1");
    assert_eq!(u2, "u2");

    assert_eq!(
        todos.list().into_iter().collect::<Vec<_>>(),
        vec![doc_with_id("u1", "a"), doc_with_id("u2", "b")]
    );

    assert!(todos.remove(&u1).await.expect("remove u1"));
    assert_eq!(
        todos.list().into_iter().collect::<Vec<_>>(),
        vec![doc_with_id("u2", "b")]
    );

    assert!(
        todos
            .update(doc_with_id("u2", "b2"))
            .await
            .expect("update u2")
    );
    assert_eq!(
        todos.list().into_iter().collect::<Vec<_>>(),
        vec![doc_with_id("u2", "b2")]
    );

    let reopened = open_todos(&engine).await;
    assert_eq!(reopened.snapshot().to_vec(), vec![doc_with_id("u2", "b2")]);
}

#[tokio::test]
async fn open_initializes_missing_slot_with_empty_array() {
    let engine = MemoryEngine::new();
    assert!(engine.raw("todos").await.is_none());

    let todos = open_todos(&engine).await;
    assert_eq!(todos.len(), 0);
    assert_eq!(engine.raw("todos").await, Some(b"[]".to_vec()));
}

#[tokio::test]
async fn open_rejects_blank_name() {
    let engine: Arc<dyn DurableEngine> = Arc::new(MemoryEngine::new());
    let err = CollectionStore::<Document>::open("  ", engine)
        .await
        .expect_err("blank name");
    assert!(matches!(err, StoreError::InvalidName(_)));
}

#[tokio::test]
async fn insert_generates_identifier_only_when_missing() {
    let engine = MemoryEngine::new();
    let todos = CollectionStore::<Document>::open("todos", Arc::new(engine.clone()))
        .await
        .expect("open");

    let generated = todos.insert(doc("a")).await.expect("insert without id");
    assert!(!generated.is_empty());

    let supplied = todos
        .insert(doc_with_id("x", "b"))
        .await
        .expect("insert with id");
    assert_eq!(supplied, "x");

    let from_empty = todos
        .insert(doc_with_id("", "c"))
        .await
        .expect("insert with empty id");
    assert!(!from_empty.is_empty());
    assert_ne!(from_empty, generated);

    let last = todos.list().last().cloned().expect("last record");
    assert_eq!(last.id(), Some(from_empty.as_str()));
}

#[tokio::test]
async fn insert_rejects_duplicate_identifier_by_default() {
    let engine = MemoryEngine::new();
    let todos = open_todos(&engine).await;

    todos.insert(doc_with_id("x", "first")).await.expect("first");
    let err = todos
        .insert(doc_with_id("x", "second"))
        .await
        .expect_err("duplicate");

    assert!(matches!(err, StoreError::DuplicateId(ref id, ref name) if id == "x" && name == "todos"));
    assert_eq!(todos.len(), 1);
    assert_eq!(todos.version(), 1);
}

#[tokio::test]
async fn duplicates_shadow_when_rejection_disabled() {
    let engine = MemoryEngine::new();
    let todos = CollectionStore::<Document>::open_with_config(
        "todos",
        Arc::new(engine.clone()),
        sequential_config().reject_duplicate_ids(false),
    )
    .await
    .expect("open");

    todos.insert(doc_with_id("x", "first")).await.expect("first");
    todos.insert(doc_with_id("x", "second")).await.expect("second");
    assert_eq!(todos.len(), 2);
    assert_eq!(todos.get("x"), Some(doc_with_id("x", "first")));

    assert!(todos.remove("x").await.expect("remove first"));
    assert_eq!(todos.get("x"), Some(doc_with_id("x", "second")));
}

#[tokio::test]
async fn remove_missing_id_is_a_noop() {
    let engine = MemoryEngine::new();
    let todos = open_todos(&engine).await;
    todos.insert(doc("a")).await.expect("a");
    todos.insert(doc("b")).await.expect("b");
    let before = todos.list();
    let version = todos.version();

    let removed = todos.remove("missing").await.expect("remove missing");
    assert!(!removed);
    assert_eq!(todos.list(), before);
    assert_eq!(todos.version(), version);
}

#[tokio::test]
async fn remove_present_id_shrinks_by_one() {
    let engine = MemoryEngine::new();
    let todos = open_todos(&engine).await;
    for text in ["a", "b", "c"] {
        todos.insert(doc(text)).await.expect("insert");
    }

    assert!(todos.remove("u2").await.expect("remove u2"));
    assert_eq!(todos.len(), 2);
    assert!(todos.list().iter().all(|record| record.id() != Some("u2")));
    assert_eq!(todos.get("u3"), Some(doc_with_id("u3", "c")));
}

#[tokio::test]
async fn update_replaces_in_place_and_never_inserts() {
    let engine = MemoryEngine::new();
    let todos = open_todos(&engine).await;
    for text in ["a", "b", "c"] {
        todos.insert(doc(text)).await.expect("insert");
    }

    assert!(todos.update(doc_with_id("u2", "B")).await.expect("update u2"));
    let items = todos.list();
    assert_eq!(items[1], doc_with_id("u2", "B"));
    assert_eq!(items.len(), 3);

    assert!(!todos.update(doc_with_id("u9", "ghost")).await.expect("update missing"));
    assert!(!todos.update(doc("no id")).await.expect("update without id"));
    assert_eq!(todos.len(), 3);
    assert!(todos.get("u9").is_none());
}

#[tokio::test]
async fn overwrite_replaces_sequence_and_survives_reopen() {
    let engine = MemoryEngine::new();
    let todos = open_todos(&engine).await;
    todos.insert(doc("old")).await.expect("old");

    let next = vec![doc_with_id("z", "last"), doc_with_id("a", "first")];
    todos.overwrite(next.clone()).await.expect("overwrite");
    assert_eq!(todos.snapshot().to_vec(), next);

    let reopened = open_todos(&engine).await;
    assert_eq!(reopened.snapshot().to_vec(), next);
}

#[tokio::test]
async fn overwrite_assigns_missing_identifiers() {
    let engine = MemoryEngine::new();
    let todos = open_todos(&engine).await;

    todos
        .overwrite(vec![doc("a"), doc_with_id("keep", "b")])
        .await
        .expect("overwrite");

    let items = todos.list();
    assert_eq!(items[0].id(), Some("u1"));
    assert_eq!(items[1].id(), Some("keep"));
}

#[tokio::test]
async fn list_is_detached_from_store() {
    let engine = MemoryEngine::new();
    let todos = open_todos(&engine).await;
    todos.insert(doc("a")).await.expect("a");

    let mut items = todos.list();
    items.push_back(doc_with_id("sneaky", "x"));
    items.clear();

    assert_eq!(todos.len(), 1);
    assert!(todos.get("sneaky").is_none());
}

#[tokio::test]
async fn typed_records_roundtrip_through_slot() {
    let engine = MemoryEngine::new();
    let todos = CollectionStore::<Todo>::open("typed", Arc::new(engine.clone()))
        .await
        .expect("open typed");

    let id = todos
        .insert(Todo {
            id: None,
            title: "Write tests".to_string(),
            done: false,
        })
        .await
        .expect("insert typed");

    let mut updated = todos.get(&id).expect("stored todo");
    updated.done = true;
    assert!(todos.update(updated.clone()).await.expect("update typed"));

    let reopened = CollectionStore::<Todo>::open("typed", Arc::new(engine.clone()))
        .await
        .expect("reopen typed");
    assert_eq!(reopened.snapshot().to_vec(), vec![updated]);
}

#[tokio::test]
async fn version_counts_applied_mutations_only() {
    let engine = MemoryEngine::new();
    let todos = open_todos(&engine).await;
    assert_eq!(todos.version(), 0);

    todos.insert(doc("a")).await.expect("a");
    assert_eq!(todos.version(), 1);

    todos.update(doc_with_id("missing", "x")).await.expect("noop update");
    todos.remove("missing").await.expect("noop remove");
    assert_eq!(todos.version(), 1);

    todos.update(doc_with_id("u1", "A")).await.expect("update");
    assert_eq!(todos.version(), 2);

    let stats = todos.stats().await;
    assert_eq!(stats.name, "todos");
    assert_eq!(stats.item_count, 1);
    assert_eq!(stats.version, 2);
    assert_eq!(stats.writes, 4);
    assert_eq!(stats.write_failures, 0);
    assert!(stats.last_write_at.is_some());
}

#[tokio::test]
async fn pretty_encoding_is_still_a_json_array() {
    let engine = MemoryEngine::new();
    let todos = CollectionStore::<Document>::open_with_config(
        "pretty",
        Arc::new(engine.clone()),
        sequential_config().pretty_encoding(true),
    )
    .await
    .expect("open");
    todos.insert(doc("a")).await.expect("insert");

    let raw = engine.raw("pretty").await.expect("slot");
    let text = String::from_utf8(raw).expect("utf8");
    assert!(text.starts_with('['));
    assert!(text.contains('\n'));

    let value: serde_json::Value = serde_json::from_str(&text).expect("json");
    assert_eq!(value, serde_json::json!([{"id": "u1", "text": "a"}]));
}
