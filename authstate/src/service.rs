//! Auth service: provider calls plus reconciliation.
//!
//! SYSTEM CONTEXT
//! ==============
//! The controller never talks to the provider or the admin store directly;
//! it asks this service, which applies the reconciler to every session it
//! sees so the persisted admin record always agrees with the answer given.

#[cfg(test)]
#[path = "service_test.rs"]
mod service_test;

use crate::admin::LocalAdminStore;
use crate::provider::{AuthChanges, IdentityProvider, ProviderError};
use crate::reconcile::{self, Reconciliation};
use crate::storage::KeyValueStore;
use crate::user::{Session, User, UserMetadata};

/// Sign-up form fields.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Registration {
    pub full_name: String,
    pub username: String,
    pub email: String,
    pub password: String,
    pub phone: String,
}

/// Result of a successful sign-up.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegistrationOutcome {
    pub user: User,
    pub needs_confirmation: bool,
}

impl Registration {
    fn metadata(&self) -> UserMetadata {
        UserMetadata {
            full_name: Some(self.full_name.clone()),
            username: Some(self.username.clone()),
            phone: Some(self.phone.clone()),
        }
    }
}

pub struct AuthService<P, S> {
    provider: P,
    admin: LocalAdminStore<S>,
}

impl<P: IdentityProvider, S: KeyValueStore> AuthService<P, S> {
    pub fn new(provider: P, admin: LocalAdminStore<S>) -> Self {
        Self { provider, admin }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    pub fn admin(&self) -> &LocalAdminStore<S> {
        &self.admin
    }

    /// Overlay the profile row onto `user`. Never fails: a missing row or
    /// any provider error leaves the user as it was.
    pub async fn enrich(&self, user: User) -> User {
        match self.provider.fetch_profile(&user.id).await {
            Ok(profile) => user.with_profile(profile),
            Err(e) if e.is_not_found() => user,
            Err(e) => {
                log::error!("error fetching user profile for {}: {e}", user.id);
                user
            }
        }
    }

    /// Reconcile an optional provider session against the admin record.
    pub async fn reconcile(&self, session: Option<Session>) -> Reconciliation {
        match session {
            Some(session) => {
                let user = self.enrich(session.user).await;
                reconcile::with_provider_user(user, &self.admin)
            }
            None => reconcile::without_provider_session(&self.admin),
        }
    }

    /// Local-only reconciliation, used when the provider cannot be asked.
    #[must_use]
    pub fn reconcile_local(&self) -> Reconciliation {
        reconcile::without_provider_session(&self.admin)
    }

    /// Fetch the provider session and reconcile it.
    ///
    /// # Errors
    ///
    /// Returns the provider error when the session itself cannot be read;
    /// storage is left untouched in that case.
    pub async fn current(&self) -> Result<Reconciliation, ProviderError> {
        let session = self.provider.get_session().await?;
        Ok(self.reconcile(session).await)
    }

    /// Email/password sign-in followed by reconciliation.
    ///
    /// # Errors
    ///
    /// Returns the provider error unchanged; nothing is persisted on failure.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<Reconciliation, ProviderError> {
        let session = self.provider.sign_in_with_password(identifier, password).await?;
        Ok(self.reconcile(Some(session)).await)
    }

    /// Local directory sign-in. Persists the admin record on success.
    #[must_use]
    pub fn admin_login(&self, username: &str, password: &str) -> Option<User> {
        self.admin.admin_login(username, password)
    }

    /// Create a provider account. The caller stays signed out.
    ///
    /// # Errors
    ///
    /// Returns the provider error unchanged.
    pub async fn register(&self, form: &Registration) -> Result<RegistrationOutcome, ProviderError> {
        let user = self
            .provider
            .sign_up(&form.email, &form.password, &form.metadata())
            .await?;
        self.admin.clear();
        let needs_confirmation = user.needs_email_confirmation();
        Ok(RegistrationOutcome { user, needs_confirmation })
    }

    /// Provider sign-out. The admin record is cleared first, whatever the
    /// provider answers, so a sign-out event reconciled while the request is
    /// in flight cannot restore it.
    ///
    /// # Errors
    ///
    /// Returns the provider error; the local record is already cleared.
    pub async fn logout(&self) -> Result<(), ProviderError> {
        self.admin.clear();
        self.provider.sign_out().await
    }

    #[must_use]
    pub fn subscribe(&self) -> AuthChanges {
        self.provider.on_auth_state_change()
    }
}
