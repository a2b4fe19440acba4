//! Auth controller: the actions a UI context exposes.
//!
//! SYSTEM CONTEXT
//! ==============
//! Wraps [`AuthService`] with state dispatch, user-facing notices and
//! post-logout navigation. The front-end supplies the three sinks (state,
//! notices, navigation); tests supply recorders.
//!
//! LIFETIME
//! ========
//! Async results are applied only while the [`MountGuard`] is held. Releasing
//! the guard does not cancel in-flight provider calls; their results are
//! dropped on arrival. A [`AuthController::watch`] loop returns on release.

#[cfg(test)]
#[path = "controller_test.rs"]
mod controller_test;

use std::future::poll_fn;
use std::pin::pin;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::Poll;

use futures::future::{self, Either};
use futures::task::AtomicWaker;

use crate::provider::{AuthChange, AuthChanges, IdentityProvider, ProviderError};
use crate::resync::{self, ResyncPlan};
use crate::service::{AuthService, Registration, RegistrationOutcome};
use crate::state::{AuthAction, AuthState, AuthStore};
use crate::storage::KeyValueStore;
use crate::user::User;

pub const LOGIN_PATH: &str = "/login";
pub const HOME_PATH: &str = "/";

/// Notice severity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Severity {
    #[default]
    Default,
    Destructive,
}

/// Fire-and-forget message for the UI notification channel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Notice {
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
}

impl Notice {
    #[must_use]
    pub fn info(title: &str, description: Option<&str>) -> Self {
        Self { title: title.to_owned(), description: description.map(str::to_owned), severity: Severity::Default }
    }

    #[must_use]
    pub fn destructive(title: &str, description: &str) -> Self {
        Self { title: title.to_owned(), description: Some(description.to_owned()), severity: Severity::Destructive }
    }
}

pub trait Notifier {
    fn notify(&self, notice: Notice);
}

pub trait Navigator {
    fn navigate(&self, path: &str);
}

/// Shared "still mounted" flag, released on component teardown.
///
/// Release also wakes the task parked in [`MountGuard::released`], so a
/// change watcher ends with its component instead of waiting for the next
/// provider event. Only one task is woken per guard.
#[derive(Clone, Debug)]
pub struct MountGuard {
    inner: Arc<GuardState>,
}

#[derive(Debug)]
struct GuardState {
    alive: AtomicBool,
    waker: AtomicWaker,
}

impl Default for MountGuard {
    fn default() -> Self {
        Self { inner: Arc::new(GuardState { alive: AtomicBool::new(true), waker: AtomicWaker::new() }) }
    }
}

impl MountGuard {
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.inner.alive.load(Ordering::Acquire)
    }

    pub fn release(&self) {
        self.inner.alive.store(false, Ordering::Release);
        self.inner.waker.wake();
    }

    /// Resolves once the guard has been released.
    pub async fn released(&self) {
        poll_fn(|cx| {
            self.inner.waker.register(cx.waker());
            if self.is_mounted() { Poll::Pending } else { Poll::Ready(()) }
        })
        .await;
    }
}

pub struct AuthController<P, S> {
    service: AuthService<P, S>,
    store: Rc<dyn AuthStore>,
    notifier: Rc<dyn Notifier>,
    navigator: Rc<dyn Navigator>,
    guard: MountGuard,
}

impl<P: IdentityProvider, S: KeyValueStore> AuthController<P, S> {
    pub fn new(
        service: AuthService<P, S>,
        store: Rc<dyn AuthStore>,
        notifier: Rc<dyn Notifier>,
        navigator: Rc<dyn Navigator>,
    ) -> Self {
        Self { service, store, notifier, navigator, guard: MountGuard::default() }
    }

    pub fn service(&self) -> &AuthService<P, S> {
        &self.service
    }

    #[must_use]
    pub fn state(&self) -> AuthState {
        self.store.snapshot()
    }

    #[must_use]
    pub fn mount_guard(&self) -> MountGuard {
        self.guard.clone()
    }

    fn apply(&self, action: AuthAction) {
        if self.guard.is_mounted() {
            self.store.dispatch(action);
        }
    }

    /// First reconciliation after mount. A provider failure falls back to
    /// the local admin record.
    pub async fn start(&self) {
        let result = match self.service.current().await {
            Ok(result) => result,
            Err(e) => {
                log::warn!("initial session check failed: {e}");
                self.service.reconcile_local()
            }
        };
        self.apply(result.into());
    }

    /// Reconcile one provider change event into state.
    pub async fn handle_change(&self, change: AuthChange) {
        log::debug!("auth change: {:?}", change.event);
        let result = self.service.reconcile(change.session).await;
        self.apply(result.into());
    }

    /// Apply change events until the provider closes the stream or the
    /// guard is released. Release ends the wait for the next event.
    pub async fn watch(&self, mut changes: AuthChanges) {
        while self.guard.is_mounted() {
            let next = pin!(changes.next());
            let released = pin!(self.guard.released());
            let Either::Left((Some(change), _)) = future::select(next, released).await else {
                break;
            };
            self.handle_change(change).await;
        }
        changes.unsubscribe();
    }

    /// Resync after the tab became visible. Returns whether a
    /// reconciliation ran.
    pub async fn on_visible(&self) -> bool {
        if !self.guard.is_mounted() {
            return false;
        }
        let previous = self.store.snapshot();
        if resync::plan(&previous) == ResyncPlan::Skip {
            return false;
        }
        self.apply(AuthAction::SetLoading(true));
        let outcome = self.service.current().await;
        if let Err(e) = &outcome {
            log::error!("error refreshing session on visibility change: {e}");
        }
        self.apply(resync::settle(&previous, outcome));
        true
    }

    /// Provider email/password login.
    ///
    /// # Errors
    ///
    /// Returns the provider error; state ends anonymous and nothing is
    /// persisted.
    pub async fn login(&self, identifier: &str, password: &str) -> Result<User, ProviderError> {
        self.apply(AuthAction::SetLoading(true));
        let result = match self.service.login(identifier, password).await {
            Ok(result) => result,
            Err(e) => {
                if !e.is_invalid_credentials() {
                    self.notifier.notify(Notice::destructive("Login error", &e.to_string()));
                }
                self.apply(AuthAction::LoginFailure);
                return Err(e);
            }
        };
        let Some(user) = result.user else {
            self.apply(AuthAction::LoginFailure);
            return Err(ProviderError::Parse("sign-in returned no user".to_owned()));
        };
        self.apply(AuthAction::LoginSuccess { user: user.clone(), is_admin: result.is_admin });
        self.notifier.notify(Notice::info("Signed in", Some("Welcome!")));
        Ok(user)
    }

    /// Local directory login. Synchronous; no provider involved.
    pub fn admin_login(&self, username: &str, password: &str) -> bool {
        self.apply(AuthAction::SetLoading(true));
        match self.service.admin_login(username, password) {
            Some(user) => {
                let greeting = format!("Welcome {}!", admin_greeting_name(&user));
                self.apply(AuthAction::AdminLoginSuccess { user });
                self.notifier.notify(Notice::info("Admin access granted", Some(&greeting)));
                true
            }
            None => {
                self.apply(AuthAction::LoginFailure);
                false
            }
        }
    }

    /// Sign out, then send admins to the login page and everyone else home.
    pub async fn logout(&self) {
        let was_admin = self.store.snapshot().is_admin;
        self.apply(AuthAction::SetLoading(true));
        if let Err(e) = self.service.logout().await {
            log::warn!("provider sign-out failed: {e}");
        }
        self.apply(AuthAction::Logout);
        let (title, path) = if was_admin { ("Admin signed out", LOGIN_PATH) } else { ("Signed out", HOME_PATH) };
        self.notifier.notify(Notice::info(title, None));
        self.navigator.navigate(path);
    }

    /// Create an account. The caller is not signed in afterwards.
    ///
    /// # Errors
    ///
    /// Returns the provider error after notifying the user.
    pub async fn register(&self, form: &Registration) -> Result<RegistrationOutcome, ProviderError> {
        self.apply(AuthAction::SetLoading(true));
        let result = self.service.register(form).await;
        match &result {
            Ok(outcome) if outcome.needs_confirmation => self.notifier.notify(Notice::info(
                "Registration submitted",
                Some("Check your email to confirm your account."),
            )),
            Ok(_) => self
                .notifier
                .notify(Notice::info("Registration complete!", Some("You can now sign in."))),
            Err(e) => self
                .notifier
                .notify(Notice::destructive("Registration error", &e.to_string())),
        }
        self.apply(AuthAction::SetLoading(false));
        result
    }

    pub fn set_user(&self, user: Option<User>) {
        self.apply(AuthAction::SetUser(user));
    }

    pub fn set_is_admin(&self, is_admin: bool) {
        self.apply(AuthAction::SetIsAdmin(is_admin));
    }

    pub fn set_loading(&self, loading: bool) {
        self.apply(AuthAction::SetLoading(loading));
    }
}

fn admin_greeting_name(user: &User) -> &str {
    user.user_metadata
        .full_name
        .as_deref()
        .or(user.username.as_deref())
        .unwrap_or(&user.id)
}
