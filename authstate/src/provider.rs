//! Identity provider seam and change notifications.
//!
//! DESIGN
//! ======
//! The provider owns everything credential-related: password checks, token
//! issuance, refresh. This crate only sees the resulting [`Session`] and a
//! stream of [`AuthChange`] events. Futures are `?Send` because every caller
//! runs on the browser's single event loop.

#[cfg(test)]
#[path = "provider_test.rs"]
mod provider_test;

use std::cell::RefCell;
use std::rc::Rc;

use futures::StreamExt;
use futures::channel::mpsc;

use crate::user::{Profile, Session, User, UserMetadata};

/// PostgREST code for a single-row request that matched no rows.
pub const NOT_FOUND_CODE: &str = "PGRST116";

/// Provider message for a rejected email/password pair.
pub const INVALID_CREDENTIALS_MESSAGE: &str = "Invalid login credentials";

/// Errors reported by the identity provider.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProviderError {
    /// No provider URL/key was configured.
    #[error("identity provider not configured")]
    NotConfigured,

    /// The request never produced a response.
    #[error("request failed: {0}")]
    Network(String),

    /// The provider answered with an error body. Displays the provider message.
    #[error("{message}")]
    Api { status: u16, code: Option<String>, message: String },

    /// The response body did not have the expected shape.
    #[error("response parse failed: {0}")]
    Parse(String),

    /// Network calls are only available in the browser build.
    #[error("not available on server")]
    Unavailable,
}

impl ProviderError {
    /// Provider error code, when the body carried one.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// True for "no row" answers from the profile table.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.code() == Some(NOT_FOUND_CODE)
    }

    /// True when the provider rejected the email/password pair.
    #[must_use]
    pub fn is_invalid_credentials(&self) -> bool {
        match self {
            Self::Api { code, message, .. } => {
                message == INVALID_CREDENTIALS_MESSAGE || code.as_deref() == Some("invalid_credentials")
            }
            _ => false,
        }
    }
}

/// Kind of session change reported by the provider.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthEvent {
    SignedIn,
    SignedOut,
    TokenRefreshed,
    UserUpdated,
}

/// A session change and the session that resulted from it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthChange {
    pub event: AuthEvent,
    pub session: Option<Session>,
}

impl AuthChange {
    #[must_use]
    pub fn new(event: AuthEvent, session: Option<Session>) -> Self {
        Self { event, session }
    }
}

/// Subscription handle for provider change events.
///
/// Dropping the handle or calling [`AuthChanges::unsubscribe`] stops
/// delivery; the broadcaster prunes closed subscribers on its next emit.
pub struct AuthChanges {
    rx: mpsc::UnboundedReceiver<AuthChange>,
}

impl AuthChanges {
    /// Wait for the next change. `None` once the provider is gone or the
    /// subscription was closed.
    pub async fn next(&mut self) -> Option<AuthChange> {
        self.rx.next().await
    }

    pub fn unsubscribe(mut self) {
        self.rx.close();
    }
}

/// Fan-out of [`AuthChange`] events to every live subscriber.
#[derive(Clone, Default)]
pub struct AuthBroadcaster {
    subscribers: Rc<RefCell<Vec<mpsc::UnboundedSender<AuthChange>>>>,
}

impl AuthBroadcaster {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn subscribe(&self) -> AuthChanges {
        let (tx, rx) = mpsc::unbounded();
        self.subscribers.borrow_mut().push(tx);
        AuthChanges { rx }
    }

    pub fn emit(&self, change: AuthChange) {
        self.subscribers
            .borrow_mut()
            .retain(|tx| tx.unbounded_send(change.clone()).is_ok());
    }

    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.borrow_mut().retain(|tx| !tx.is_closed());
        self.subscribers.borrow().len()
    }

    /// Close every subscription; pending events are still delivered.
    pub fn close(&self) {
        for tx in self.subscribers.borrow_mut().drain(..) {
            tx.close_channel();
        }
    }
}

/// External identity provider (sign-in, sign-up, session, profile table).
#[async_trait::async_trait(?Send)]
pub trait IdentityProvider {
    /// Exchange an email/password pair for a session.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ProviderError>;

    /// Create an account. Returns the new user; never starts a session.
    async fn sign_up(&self, email: &str, password: &str, metadata: &UserMetadata) -> Result<User, ProviderError>;

    /// End the current session.
    async fn sign_out(&self) -> Result<(), ProviderError>;

    /// Current session, refreshed if needed. `Ok(None)` when signed out.
    async fn get_session(&self) -> Result<Option<Session>, ProviderError>;

    /// Profile row for `user_id`. A missing row is an error whose
    /// [`ProviderError::is_not_found`] is true.
    async fn fetch_profile(&self, user_id: &str) -> Result<Profile, ProviderError>;

    /// Subscribe to session changes.
    fn on_auth_state_change(&self) -> AuthChanges;
}
