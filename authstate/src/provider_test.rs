use futures::FutureExt;

use super::*;

fn api_error(status: u16, code: Option<&str>, message: &str) -> ProviderError {
    ProviderError::Api { status, code: code.map(str::to_owned), message: message.to_owned() }
}

// =============================================================
// ProviderError classification
// =============================================================

#[test]
fn not_found_matches_postgrest_code() {
    assert!(api_error(406, Some("PGRST116"), "JSON object requested, multiple (or no) rows returned").is_not_found());
    assert!(!api_error(500, Some("XX000"), "boom").is_not_found());
    assert!(!ProviderError::Network("offline".to_owned()).is_not_found());
}

#[test]
fn invalid_credentials_matches_message_or_code() {
    assert!(api_error(400, None, "Invalid login credentials").is_invalid_credentials());
    assert!(api_error(400, Some("invalid_credentials"), "whatever").is_invalid_credentials());
    assert!(!api_error(400, None, "Email not confirmed").is_invalid_credentials());
    assert!(!ProviderError::NotConfigured.is_invalid_credentials());
}

#[test]
fn api_error_displays_provider_message() {
    assert_eq!(api_error(422, None, "User already registered").to_string(), "User already registered");
    assert_eq!(ProviderError::NotConfigured.to_string(), "identity provider not configured");
}

// =============================================================
// AuthBroadcaster
// =============================================================

#[test]
fn emit_reaches_every_subscriber() {
    let broadcaster = AuthBroadcaster::new();
    let mut a = broadcaster.subscribe();
    let mut b = broadcaster.subscribe();
    broadcaster.emit(AuthChange::new(AuthEvent::SignedOut, None));

    let got_a = a.next().now_or_never().flatten().expect("a");
    let got_b = b.next().now_or_never().flatten().expect("b");
    assert_eq!(got_a.event, AuthEvent::SignedOut);
    assert_eq!(got_b, got_a);
}

#[test]
fn unsubscribed_handles_are_pruned() {
    let broadcaster = AuthBroadcaster::new();
    let a = broadcaster.subscribe();
    let _b = broadcaster.subscribe();
    assert_eq!(broadcaster.subscriber_count(), 2);

    a.unsubscribe();
    broadcaster.emit(AuthChange::new(AuthEvent::SignedOut, None));
    assert_eq!(broadcaster.subscriber_count(), 1);
}

#[test]
fn dropped_handles_are_pruned() {
    let broadcaster = AuthBroadcaster::new();
    drop(broadcaster.subscribe());
    assert_eq!(broadcaster.subscriber_count(), 0);
}

#[test]
fn close_ends_streams_after_pending_events() {
    let broadcaster = AuthBroadcaster::new();
    let mut changes = broadcaster.subscribe();
    broadcaster.emit(AuthChange::new(AuthEvent::SignedOut, None));
    broadcaster.close();

    assert!(changes.next().now_or_never().flatten().is_some());
    assert_eq!(changes.next().now_or_never(), Some(None));
}

#[test]
fn no_event_pending_is_not_ready() {
    let broadcaster = AuthBroadcaster::new();
    let mut changes = broadcaster.subscribe();
    assert!(changes.next().now_or_never().is_none());
}
