use super::*;

#[tokio::test]
async fn memory_store_counts_calls_and_signs_existing_keys() {
    let store = InMemoryObjectStore::new();
    assert!(matches!(
        store.sign("missing", 60).await,
        Err(StoreError::NotFound(_))
    ));

    store.put("a.jpg", b"jpeg").await.unwrap();
    let url = store.sign("a.jpg", 60).await.unwrap();
    assert_eq!(url, "memory://a.jpg?expires_in=60");
    assert!(store.contains("a.jpg"));

    store.delete("a.jpg").await.unwrap();
    store.delete("a.jpg").await.unwrap();
    assert!(!store.contains("a.jpg"));
    assert_eq!(
        (store.put_count(), store.sign_count(), store.delete_count()),
        (1, 2, 2)
    );
}

#[tokio::test]
async fn memory_store_failure_injection_is_one_shot() {
    let store = InMemoryObjectStore::new();
    store.fail_next_put();
    assert!(store.put("k", b"x").await.is_err());
    assert!(!store.contains("k"));
    store.put("k", b"x").await.unwrap();

    store.fail_next_sign();
    assert!(store.sign("k", 1).await.is_err());
    assert!(store.sign("k", 1).await.is_ok());

    store.set_fail_deletes(true);
    assert!(store.delete("k").await.is_err());
    assert!(store.contains("k"));
    store.set_fail_deletes(false);
    store.delete("k").await.unwrap();
    assert!(store.keys().is_empty());
}

#[tokio::test]
async fn fs_store_round_trips_files() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("store");
    let store = FsObjectStore::new(&dir);

    store.put("photo-strip-1.jpg", b"abc").await.unwrap();
    assert_eq!(std::fs::read(dir.join("photo-strip-1.jpg")).unwrap(), b"abc");

    let url = store.sign("photo-strip-1.jpg", 60).await.unwrap();
    assert!(url.starts_with("file://"));
    assert!(url.ends_with("photo-strip-1.jpg?expires_in=60"));

    store.delete("photo-strip-1.jpg").await.unwrap();
    store.delete("photo-strip-1.jpg").await.unwrap();
    assert!(!dir.join("photo-strip-1.jpg").exists());
    assert!(matches!(
        store.sign("photo-strip-1.jpg", 60).await,
        Err(StoreError::NotFound(_))
    ));
}

#[tokio::test]
async fn fs_store_rejects_path_like_keys() {
    let store = FsObjectStore::new("target/unused");
    for key in ["", "../x", "a/b", ".hidden"] {
        assert!(matches!(
            store.put(key, b"x").await,
            Err(StoreError::Rejected(_))
        ));
    }
}
