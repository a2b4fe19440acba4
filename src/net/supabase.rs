//! Supabase implementation of [`IdentityProvider`].
//!
//! Client-side (hydrate): GoTrue and PostgREST calls via `gloo-net`, with
//! the session persisted under [`SESSION_KEY`].
//! Server-side (SSR): network calls return [`ProviderError::Unavailable`];
//! stored-session reads still work against whatever storage is plugged in.
//!
//! ERROR HANDLING
//! ==============
//! Without a configured project every call degrades instead of failing
//! hard: no session, sign-out succeeds, sign-in and sign-up report
//! [`ProviderError::NotConfigured`].

#![allow(clippy::unused_async)]

#[cfg(test)]
#[path = "supabase_test.rs"]
mod supabase_test;

use authstate::user::UserMetadata;
use authstate::{
    AuthBroadcaster, AuthChange, AuthChanges, AuthEvent, IdentityProvider, KeyValueStore, Profile, ProviderError,
    Session, User,
};

#[cfg(feature = "hydrate")]
use super::types::{PasswordGrant, RefreshGrant, SignUpRequest, parse_error, parse_profile, parse_session, parse_signup};
use crate::config::SupabaseConfig;

/// Storage key for the persisted provider session.
pub const SESSION_KEY: &str = "sb-auth-token";

/// Sessions this close to expiry are refreshed before being handed out.
pub const EXPIRY_MARGIN_SECS: i64 = 30;

#[cfg(any(test, feature = "hydrate"))]
const PGRST_OBJECT: &str = "application/vnd.pgrst.object+json";

#[cfg(any(test, feature = "hydrate"))]
fn token_endpoint(base: &str, grant_type: &str) -> String {
    format!("{base}/auth/v1/token?grant_type={grant_type}")
}

#[cfg(any(test, feature = "hydrate"))]
fn signup_endpoint(base: &str) -> String {
    format!("{base}/auth/v1/signup")
}

#[cfg(any(test, feature = "hydrate"))]
fn logout_endpoint(base: &str) -> String {
    format!("{base}/auth/v1/logout")
}

/// Single-row profile lookup keyed on the auth user id.
#[cfg(any(test, feature = "hydrate"))]
fn profile_endpoint(base: &str, table: &str, user_id: &str) -> String {
    format!("{base}/rest/v1/{table}?select=full_name,username,phone&auth_user_id=eq.{user_id}")
}

/// Seconds since the Unix epoch.
#[allow(clippy::cast_possible_truncation)]
fn now_secs() -> i64 {
    #[cfg(feature = "hydrate")]
    {
        (js_sys::Date::now() / 1000.0) as i64
    }
    #[cfg(not(feature = "hydrate"))]
    {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map_or(0, |d| i64::try_from(d.as_secs()).unwrap_or(i64::MAX))
    }
}

#[cfg(feature = "hydrate")]
fn network(e: &gloo_net::Error) -> ProviderError {
    ProviderError::Network(e.to_string())
}

/// Send a request and return the body of a 2xx response.
#[cfg(feature = "hydrate")]
async fn send(request: gloo_net::http::Request) -> Result<String, ProviderError> {
    let resp = request.send().await.map_err(|e| network(&e))?;
    let ok = resp.ok();
    let status = resp.status();
    let body = resp.text().await.map_err(|e| network(&e))?;
    if !ok {
        return Err(parse_error(status, &body));
    }
    Ok(body)
}

/// GoTrue + PostgREST client with a persisted session.
pub struct SupabaseClient<S> {
    config: Option<SupabaseConfig>,
    profile_table: String,
    storage: S,
    changes: AuthBroadcaster,
}

impl<S: KeyValueStore> SupabaseClient<S> {
    pub fn new(config: Option<SupabaseConfig>, profile_table: &str, storage: S) -> Self {
        Self { config, profile_table: profile_table.to_owned(), storage, changes: AuthBroadcaster::new() }
    }

    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.config.is_some()
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn config(&self) -> Result<&SupabaseConfig, ProviderError> {
        self.config.as_ref().ok_or(ProviderError::NotConfigured)
    }

    /// The persisted session, if one decodes. Unreadable records are dropped.
    #[must_use]
    pub fn stored_session(&self) -> Option<Session> {
        let raw = self.storage.get_item(SESSION_KEY)?;
        match serde_json::from_str(&raw) {
            Ok(session) => Some(session),
            Err(e) => {
                leptos::logging::warn!("dropping unreadable stored session: {e}");
                self.storage.remove_item(SESSION_KEY);
                None
            }
        }
    }

    fn store_session(&self, session: &Session) {
        if let Ok(raw) = serde_json::to_string(session) {
            self.storage.set_item(SESSION_KEY, &raw);
        }
    }

    fn clear_session(&self) {
        self.storage.remove_item(SESSION_KEY);
    }

    fn emit(&self, event: AuthEvent, session: Option<Session>) {
        self.changes.emit(AuthChange::new(event, session));
    }

    /// Exchange the refresh token for a new session.
    ///
    /// A 4xx answer means the refresh token is dead: the session is dropped
    /// and subscribers see a sign-out.
    async fn refresh(&self, session: Session) -> Result<Option<Session>, ProviderError> {
        let config = self.config()?;
        #[cfg(feature = "hydrate")]
        {
            let url = token_endpoint(&config.url, "refresh_token");
            let request = gloo_net::http::Request::post(&url)
                .header("apikey", &config.anon_key)
                .json(&RefreshGrant { refresh_token: &session.refresh_token })
                .map_err(|e| network(&e))?;
            match send(request).await {
                Ok(body) => {
                    let refreshed = parse_session(&body, now_secs())?;
                    self.store_session(&refreshed);
                    self.emit(AuthEvent::TokenRefreshed, Some(refreshed.clone()));
                    Ok(Some(refreshed))
                }
                Err(ProviderError::Api { status, message, .. }) if (400..500).contains(&status) => {
                    leptos::logging::warn!("session refresh rejected ({status}): {message}");
                    self.clear_session();
                    self.emit(AuthEvent::SignedOut, None);
                    Ok(None)
                }
                Err(e) => Err(e),
            }
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (config, session);
            Err(ProviderError::Unavailable)
        }
    }
}

#[async_trait::async_trait(?Send)]
impl<S: KeyValueStore> IdentityProvider for SupabaseClient<S> {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        let config = self.config()?;
        #[cfg(feature = "hydrate")]
        {
            let url = token_endpoint(&config.url, "password");
            let request = gloo_net::http::Request::post(&url)
                .header("apikey", &config.anon_key)
                .json(&PasswordGrant { email, password })
                .map_err(|e| network(&e))?;
            let body = send(request).await?;
            let session = parse_session(&body, now_secs())?;
            self.store_session(&session);
            self.emit(AuthEvent::SignedIn, Some(session.clone()));
            Ok(session)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (config, email, password);
            Err(ProviderError::Unavailable)
        }
    }

    async fn sign_up(&self, email: &str, password: &str, metadata: &UserMetadata) -> Result<User, ProviderError> {
        let config = self.config()?;
        #[cfg(feature = "hydrate")]
        {
            let url = signup_endpoint(&config.url);
            let request = gloo_net::http::Request::post(&url)
                .header("apikey", &config.anon_key)
                .json(&SignUpRequest { email, password, data: metadata })
                .map_err(|e| network(&e))?;
            let body = send(request).await?;
            parse_signup(&body)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (config, email, password, metadata);
            Err(ProviderError::Unavailable)
        }
    }

    async fn sign_out(&self) -> Result<(), ProviderError> {
        let session = self.stored_session();
        self.clear_session();
        if session.is_some() {
            self.emit(AuthEvent::SignedOut, None);
        }
        let (Some(config), Some(session)) = (self.config.as_ref(), session) else {
            return Ok(());
        };
        #[cfg(feature = "hydrate")]
        {
            let request = gloo_net::http::Request::post(&logout_endpoint(&config.url))
                .header("apikey", &config.anon_key)
                .header("Authorization", &format!("Bearer {}", session.access_token))
                .build()
                .map_err(|e| network(&e))?;
            send(request).await.map(|_| ())
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (config, session);
            Ok(())
        }
    }

    async fn get_session(&self) -> Result<Option<Session>, ProviderError> {
        if !self.is_configured() {
            return Ok(None);
        }
        let Some(session) = self.stored_session() else {
            return Ok(None);
        };
        if session.expires_within(now_secs(), EXPIRY_MARGIN_SECS) {
            return self.refresh(session).await;
        }
        Ok(Some(session))
    }

    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, ProviderError> {
        let config = self.config()?;
        #[cfg(feature = "hydrate")]
        {
            let url = profile_endpoint(&config.url, &self.profile_table, user_id);
            let bearer = self.stored_session().map_or_else(|| config.anon_key.clone(), |s| s.access_token);
            let request = gloo_net::http::Request::get(&url)
                .header("apikey", &config.anon_key)
                .header("Authorization", &format!("Bearer {bearer}"))
                .header("Accept", PGRST_OBJECT)
                .build()
                .map_err(|e| network(&e))?;
            let body = send(request).await?;
            parse_profile(&body)
        }
        #[cfg(not(feature = "hydrate"))]
        {
            let _ = (config, user_id, &self.profile_table);
            Err(ProviderError::Unavailable)
        }
    }

    fn on_auth_state_change(&self) -> AuthChanges {
        self.changes.subscribe()
    }
}
