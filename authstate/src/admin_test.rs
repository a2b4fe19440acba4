use super::*;
use crate::storage::MemoryStore;
use crate::test_helpers::{admin_store, directory, provider_user};

// =============================================================
// persist / clear
// =============================================================

#[test]
fn persist_writes_flag_and_record() {
    let (admin, storage) = admin_store();
    let user = provider_user("u1", "admin@example.com");
    admin.persist(&user);

    assert_eq!(storage.get_item(IS_ADMIN_AUTH_KEY).as_deref(), Some("true"));
    let stored: User = serde_json::from_str(&storage.get_item(USER_KEY).expect("record")).expect("json");
    assert_eq!(stored, user);
}

#[test]
fn clear_removes_both_keys() {
    let (admin, storage) = admin_store();
    admin.persist(&provider_user("u1", "admin@example.com"));
    storage.set_item("unrelated", "keep");
    admin.clear();

    assert!(!storage.contains(IS_ADMIN_AUTH_KEY));
    assert!(!storage.contains(USER_KEY));
    assert!(storage.contains("unrelated"));
}

// =============================================================
// load_if_valid
// =============================================================

#[test]
fn load_if_valid_requires_flag() {
    let (admin, storage) = admin_store();
    let user = local_admin_user(&directory().entries()[0]);
    storage.set_item(USER_KEY, &serde_json::to_string(&user).expect("json"));
    assert!(admin.load_if_valid().is_none());

    storage.set_item(IS_ADMIN_AUTH_KEY, "false");
    assert!(admin.load_if_valid().is_none());
}

#[test]
fn load_if_valid_accepts_directory_match_without_claim() {
    let (admin, storage) = admin_store();
    let user = User {
        id: "x".to_owned(),
        email: Some("valentina.admin@example.com".to_owned()),
        username: Some("valentina".to_owned()),
        ..User::default()
    };
    storage.set_item(IS_ADMIN_AUTH_KEY, "true");
    storage.set_item(USER_KEY, &serde_json::to_string(&user).expect("json"));
    assert_eq!(admin.load_if_valid(), Some(user));
}

#[test]
fn load_if_valid_accepts_admin_claim() {
    let (admin, _) = admin_store();
    let mut user = provider_user("u1", "ops@corp.example");
    user.app_metadata.claims_admin = Some(true);
    admin.persist(&user);
    assert_eq!(admin.load_if_valid(), Some(user));
}

#[test]
fn load_if_valid_rejects_arbitrary_records() {
    let (admin, storage) = admin_store();
    let user = User {
        id: "x".to_owned(),
        email: Some("admin@example.com".to_owned()),
        username: Some("intruder".to_owned()),
        ..User::default()
    };
    storage.set_item(IS_ADMIN_AUTH_KEY, "true");
    storage.set_item(USER_KEY, &serde_json::to_string(&user).expect("json"));
    assert!(admin.load_if_valid().is_none());
}

#[test]
fn malformed_record_is_absent_but_not_cleared() {
    let (admin, storage) = admin_store();
    storage.set_item(IS_ADMIN_AUTH_KEY, "true");
    storage.set_item(USER_KEY, "{broken");
    assert!(admin.load_if_valid().is_none());
    assert!(storage.contains(USER_KEY));
    assert!(storage.contains(IS_ADMIN_AUTH_KEY));
}

#[test]
fn persist_then_load_round_trips_every_directory_entry() {
    for entry in directory().entries() {
        let (admin, _) = admin_store();
        let user = local_admin_user(entry);
        admin.persist(&user);
        let loaded = admin.load_if_valid().expect("valid record");
        assert_eq!(loaded.username.as_deref(), Some(entry.username.as_str()));
        assert_eq!(loaded.email.as_deref(), Some(entry.email.as_str()));
        assert!(admin.directory().matches_identity(&entry.username, &entry.email));
    }
}

// =============================================================
// admin_login
// =============================================================

#[test]
fn admin_login_builds_and_persists_local_admin() {
    let (admin, storage) = admin_store();
    let user = admin.admin_login("admin", "admin").expect("admin");

    assert_eq!(user.id, "local-admin-admin");
    assert_eq!(user.email.as_deref(), Some("admin@example.com"));
    assert_eq!(user.user_metadata.full_name.as_deref(), Some("Master Administrator"));
    assert!(user.has_admin_claim());
    assert_eq!(storage.get_item(IS_ADMIN_AUTH_KEY).as_deref(), Some("true"));
    assert_eq!(admin.load_if_valid(), Some(user));
}

#[test]
fn admin_login_uses_directory_casing_for_id() {
    let (admin, _) = admin_store();
    let user = admin.admin_login("VALENTINA", "123456789").expect("admin");
    assert_eq!(user.id, "local-admin-valentina");
}

#[test]
fn admin_login_wrong_password_persists_nothing() {
    let (admin, storage) = admin_store();
    assert!(admin.admin_login("admin", "wrong").is_none());
    assert!(storage.is_empty());
}

#[test]
fn empty_directory_never_authenticates() {
    let admin = LocalAdminStore::new(MemoryStore::new(), AdminDirectory::default());
    assert!(admin.admin_login("admin", "admin").is_none());
}
