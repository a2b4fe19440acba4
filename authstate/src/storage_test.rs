use super::*;

#[test]
fn memory_store_set_get_remove() {
    let store = MemoryStore::new();
    assert!(store.is_empty());
    store.set_item("k", "v");
    assert_eq!(store.get_item("k").as_deref(), Some("v"));
    assert_eq!(store.len(), 1);
    store.remove_item("k");
    assert!(store.get_item("k").is_none());
}

#[test]
fn memory_store_clones_share_items() {
    let store = MemoryStore::new();
    let other = store.clone();
    other.set_item("isAdminAuth", "true");
    assert!(store.contains("isAdminAuth"));
}

#[test]
fn removing_missing_key_is_noop() {
    let store = MemoryStore::new();
    store.remove_item("missing");
    assert!(store.is_empty());
}
