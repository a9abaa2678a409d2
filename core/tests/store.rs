//! Behaviour of `LocalStore` through the `TodoStore` trait.
//!
//! Every test talks to the store as `dyn TodoStore`, the same way the HTTP
//! layer does.

use rstest::rstest;
use todo_core::types::{DEFAULT_DESCRIPTION, DEFAULT_TITLE};
use todo_core::{
    FindOptions, LocalStore, NewTodo, StoreError, TodoFilter, TodoId, TodoPatch, TodoStore,
};

async fn seeded(titles: &[&str]) -> (LocalStore, Vec<TodoId>) {
    let store = LocalStore::in_memory();
    store.ensure_text_index().await.unwrap();
    let mut ids = Vec::new();
    for title in titles {
        let todo = store
            .create(NewTodo {
                title: Some((*title).to_string()),
                description: None,
            })
            .await
            .unwrap();
        ids.push(todo.id);
    }
    (store, ids)
}

#[tokio::test]
async fn create_then_find_returns_defaults() {
    let store = LocalStore::in_memory();
    let created = store.create(NewTodo::default()).await.unwrap();

    let found = store.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(found.title, DEFAULT_TITLE);
    assert_eq!(found.description, DEFAULT_DESCRIPTION);
    assert_eq!(found, created);
}

#[tokio::test]
async fn find_unknown_id_is_none() {
    let store = LocalStore::in_memory();
    let id: TodoId = "00000000-0000-0000-0000-000000000000".parse().unwrap();

    assert!(store.find_by_id(id).await.unwrap().is_none());
    assert!(store.find_and_update(id, TodoPatch::title("Anything")).await.unwrap().is_none());
    assert!(store.find_and_delete(id).await.unwrap().is_none());
}

#[tokio::test]
async fn update_returns_new_version_and_bumps_updated_at() {
    let store = LocalStore::in_memory();
    let created = store.create(NewTodo::default()).await.unwrap();

    let updated = store
        .find_and_update(created.id, TodoPatch::title("  Renamed todo "))
        .await
        .unwrap()
        .unwrap();

    assert_eq!(updated.title, "Renamed todo");
    assert_eq!(updated.description, created.description);
    assert!(updated.updated_at >= created.updated_at);
    assert_eq!(updated.created_at, created.created_at);
}

#[tokio::test]
async fn update_violating_limits_is_rejected() {
    let store = LocalStore::in_memory();
    let created = store.create(NewTodo::default()).await.unwrap();

    let err = store
        .find_and_update(created.id, TodoPatch::description("d".repeat(1001)))
        .await
        .unwrap_err();
    assert!(err.is_validation());

    let unchanged = store.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(unchanged.description, DEFAULT_DESCRIPTION);
}

#[tokio::test]
async fn delete_removes_document() {
    let store = LocalStore::in_memory();
    let created = store.create(NewTodo::default()).await.unwrap();

    let removed = store.find_and_delete(created.id).await.unwrap().unwrap();
    assert_eq!(removed.id, created.id);
    assert!(store.find_by_id(created.id).await.unwrap().is_none());
    assert_eq!(store.count(&TodoFilter::All).await.unwrap(), 0);
}

#[rstest]
#[case::first_page(0, 3, 3)]
#[case::partial_last_page(6, 3, 1)]
#[case::past_the_end(9, 3, 0)]
#[tokio::test]
async fn find_pages_in_creation_order(#[case] skip: u64, #[case] limit: u64, #[case] expected: usize) {
    let titles = ["Todo one", "Todo two", "Todo three", "Todo four", "Todo five", "Todo six", "Todo seven"];
    let (store, ids) = seeded(&titles).await;

    let page = store
        .find(&TodoFilter::All, &FindOptions::page(skip, limit))
        .await
        .unwrap();

    assert_eq!(page.len(), expected);
    let start = usize::try_from(skip).unwrap();
    for (offset, todo) in page.iter().enumerate() {
        assert_eq!(todo.id, ids[start + offset]);
    }
}

#[tokio::test]
async fn title_filter_is_case_insensitive_substring() {
    let (store, _) = seeded(&["Buy Groceries", "groceries again", "Walk the dog"]).await;
    let filter = TodoFilter::TitleContains("GROCER".to_string());

    let hits = store.find(&filter, &FindOptions::newest_first(10)).await.unwrap();
    let titles: Vec<&str> = hits.iter().map(|todo| todo.title.as_str()).collect();
    assert_eq!(titles, ["groceries again", "Buy Groceries"]);
    assert_eq!(store.count(&filter).await.unwrap(), 2);
}

#[tokio::test]
async fn text_search_orders_matches_newest_first() {
    let (store, ids) = seeded(&[
        "Clean kitchen floor",
        "Kitchen",
        "Clean garage floor",
        "Kitchen shopping list",
    ])
    .await;

    let hits = store.text_search("kitchen", 10).await.unwrap();
    let order: Vec<TodoId> = hits.iter().map(|hit| hit.todo.id).collect();
    assert_eq!(order, [ids[3], ids[1], ids[0]]);
    // "Kitchen" is the densest match but still ranks by age
    assert!(hits[1].score > hits[0].score);
}

#[tokio::test]
async fn text_search_limit_keeps_newest_matches() {
    let mut titles = vec!["Errand".to_string()];
    titles.extend((0..10).map(|n| format!("Errand number {n} for the long weekend")));
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    let (store, ids) = seeded(&refs).await;

    let hits = store.text_search("errand", 10).await.unwrap();
    assert_eq!(hits.len(), 10);
    assert!(hits.iter().all(|hit| hit.todo.id != ids[0]));
}

#[tokio::test]
async fn text_search_honours_limit() {
    let titles: Vec<String> = (0..15).map(|n| format!("Errand number {n}")).collect();
    let refs: Vec<&str> = titles.iter().map(String::as_str).collect();
    let (store, ids) = seeded(&refs).await;

    let hits = store.text_search("errand", 10).await.unwrap();
    assert_eq!(hits.len(), 10);
    assert_eq!(hits[0].todo.id, ids[14]);
}

#[tokio::test]
async fn text_search_without_match_is_empty() {
    let (store, _) = seeded(&["Walk the dog"]).await;
    assert!(store.text_search("zebra", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn ensure_text_index_indexes_existing_documents() {
    let store = LocalStore::in_memory();
    store
        .create(NewTodo {
            title: Some("Existing before index".to_string()),
            description: None,
        })
        .await
        .unwrap();

    store.ensure_text_index().await.unwrap();
    store.ensure_text_index().await.unwrap();

    assert_eq!(store.text_search("existing", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn snapshot_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.json");

    let store = LocalStore::open(&path).await.unwrap();
    let kept = store.create(NewTodo::default()).await.unwrap();
    let dropped = store.create(NewTodo::default()).await.unwrap();
    store.find_and_delete(dropped.id).await.unwrap();
    store.close().await.unwrap();

    let reopened = LocalStore::open(&path).await.unwrap();
    assert_eq!(reopened.count(&TodoFilter::All).await.unwrap(), 1);
    assert_eq!(reopened.find_by_id(kept.id).await.unwrap(), Some(kept));
    assert_eq!(reopened.snapshot_path(), Some(path.as_path()));
}

#[tokio::test]
async fn corrupt_snapshot_fails_to_open() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todos.json");
    std::fs::write(&path, b"not json").unwrap();

    let err = LocalStore::open(&path).await.unwrap_err();
    assert!(matches!(err, StoreError::Snapshot(_)));
}

#[tokio::test]
async fn failed_snapshot_write_leaves_store_unchanged() {
    let dir = tempfile::tempdir().unwrap();
    let data_dir = dir.path().join("data");
    std::fs::create_dir(&data_dir).unwrap();

    let store = LocalStore::open(data_dir.join("todos.json")).await.unwrap();
    store.ensure_text_index().await.unwrap();
    let kept = store
        .create(NewTodo {
            title: Some("Water the plants".to_string()),
            description: None,
        })
        .await
        .unwrap();
    std::fs::remove_dir_all(&data_dir).unwrap();

    let err = store.create(NewTodo::default()).await.unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert_eq!(store.count(&TodoFilter::All).await.unwrap(), 1);

    let err = store
        .find_and_update(kept.id, TodoPatch::title("Repot the cactus"))
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert_eq!(store.find_by_id(kept.id).await.unwrap(), Some(kept.clone()));
    assert!(store.text_search("cactus", 10).await.unwrap().is_empty());

    let err = store.find_and_delete(kept.id).await.unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert_eq!(store.find_by_id(kept.id).await.unwrap(), Some(kept.clone()));
    let hits = store.text_search("plants", 10).await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].todo.id, kept.id);
}
