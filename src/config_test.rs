use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_owned(), (*v).to_owned())).collect();
    move |key: &str| map.get(key).cloned()
}

#[test]
fn empty_lookup_disables_provider() {
    let cfg = AuthConfig::from_lookup(|_| None).unwrap();
    assert!(cfg.supabase.is_none());
    assert!(cfg.admins.is_empty());
    assert_eq!(cfg.profile_table, DEFAULT_PROFILE_TABLE);
}

#[test]
fn url_and_key_enable_provider() {
    let cfg = AuthConfig::from_lookup(lookup(&[
        ("SUPABASE_URL", "https://abc.supabase.co/"),
        ("SUPABASE_ANON_KEY", "anon-key"),
    ]))
    .unwrap();
    assert_eq!(
        cfg.supabase,
        Some(SupabaseConfig { url: "https://abc.supabase.co".to_owned(), anon_key: "anon-key".to_owned() })
    );
}

#[test]
fn url_without_key_disables_provider() {
    let cfg = AuthConfig::from_lookup(lookup(&[("SUPABASE_URL", "https://abc.supabase.co")])).unwrap();
    assert!(cfg.supabase.is_none());
}

#[test]
fn blank_values_count_as_missing() {
    let cfg = AuthConfig::from_lookup(lookup(&[
        ("SUPABASE_URL", "  "),
        ("SUPABASE_ANON_KEY", "anon-key"),
        ("AUTH_PROFILE_TABLE", ""),
    ]))
    .unwrap();
    assert!(cfg.supabase.is_none());
    assert_eq!(cfg.profile_table, "users");
}

#[test]
fn admin_directory_is_parsed() {
    let raw = format!(
        r#"[{{"username":"admin","password_sha256":"{}","email":"admin@example.com","full_name":"Admin"}}]"#,
        authstate::credentials::hash_password("admin")
    );
    let cfg = AuthConfig::from_lookup(lookup(&[("AUTH_ADMIN_DIRECTORY", raw.as_str()), ("AUTH_PROFILE_TABLE", "profiles")]))
        .unwrap();
    assert!(cfg.admins.find("admin", "admin").is_some());
    assert_eq!(cfg.profile_table, "profiles");
}

#[test]
fn malformed_admin_directory_is_an_error() {
    let err = AuthConfig::from_lookup(lookup(&[("AUTH_ADMIN_DIRECTORY", "[{")])).unwrap_err();
    assert!(matches!(err, ConfigError::AdminDirectory(_)));
    assert!(err.to_string().starts_with("invalid AUTH_ADMIN_DIRECTORY"));
}

#[test]
fn default_config_uses_default_table() {
    let cfg = AuthConfig::default();
    assert!(cfg.supabase.is_none());
    assert_eq!(cfg.profile_table, DEFAULT_PROFILE_TABLE);
}

#[test]
fn documented_admin_entry_enables_admin_login() {
    let raw = r#"[{"username":"admin",
        "password_sha256":"8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918",
        "email":"admin@example.com","full_name":"Master Administrator"}]"#;
    let cfg = AuthConfig::from_lookup(lookup(&[("AUTH_ADMIN_DIRECTORY", raw)])).unwrap();
    assert!(cfg.admins.find("admin", "admin").is_some());
    assert!(AuthConfig::default().admins.find("admin", "admin").is_none());
}
