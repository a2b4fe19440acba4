//! Auth provider component and context accessors.
//!
//! SYSTEM CONTEXT
//! ==============
//! [`AuthProvider`] owns the session lifecycle for everything rendered
//! inside it: it builds the controller over Supabase + `localStorage`,
//! subscribes to provider changes before the first reconciliation, and
//! resyncs when the tab becomes visible. Descendants reach it through
//! [`use_auth`]. Must be mounted inside a `<Router>` (navigation after
//! logout goes through `use_navigate`).
//!
//! LIFECYCLE
//! =========
//! Unmounting releases the controller's mount guard: in-flight work that
//! resolves afterwards never writes into the disposed signal, the change
//! watcher task returns and drops its subscription, and the visibility
//! listener is removed.

#[cfg(test)]
#[path = "context_test.rs"]
mod context_test;

use std::rc::Rc;

use authstate::{
    AuthController, AuthService, AuthState, LocalAdminStore, Navigator, ProviderError, Registration,
    RegistrationOutcome, User,
};
use leptos::prelude::*;
use leptos_router::NavigateOptions;
use leptos_router::hooks::use_navigate;

use crate::config::AuthConfig;
use crate::net::supabase::SupabaseClient;
use crate::state::auth::SignalStore;
use crate::state::toast::{ToastSink, ToastState};
use crate::util::storage::BrowserStorage;
#[cfg(feature = "hydrate")]
use crate::util::visibility::VisibilityListener;

/// Controller wired to the browser backends.
pub type ClientController = AuthController<SupabaseClient<BrowserStorage>, BrowserStorage>;

/// [`Navigator`] over a router navigate function.
pub struct RouterNavigator<F>(pub F);

impl<F: Fn(&str, NavigateOptions)> Navigator for RouterNavigator<F> {
    fn navigate(&self, path: &str) {
        (self.0)(path, NavigateOptions::default());
    }
}

/// Build the controller for `config`, writing into the given signals.
pub fn build_controller(
    config: &AuthConfig,
    state: RwSignal<AuthState>,
    toasts: RwSignal<ToastState>,
    navigator: Rc<dyn Navigator>,
) -> ClientController {
    let provider = SupabaseClient::new(config.supabase.clone(), &config.profile_table, BrowserStorage);
    let admin = LocalAdminStore::new(BrowserStorage, config.admins.clone());
    AuthController::new(
        AuthService::new(provider, admin),
        Rc::new(SignalStore(state)),
        Rc::new(ToastSink(toasts)),
        navigator,
    )
}

/// Copyable handle to the auth state and its operations.
///
/// Reads (`user`, `is_admin`, `loading`) are tracked, so views re-render on
/// change.
#[derive(Clone, Copy)]
pub struct AuthHandle {
    state: RwSignal<AuthState>,
    toasts: RwSignal<ToastState>,
    controller: StoredValue<Rc<ClientController>, LocalStorage>,
}

impl AuthHandle {
    pub fn new(state: RwSignal<AuthState>, toasts: RwSignal<ToastState>, controller: Rc<ClientController>) -> Self {
        Self { state, toasts, controller: StoredValue::new_local(controller) }
    }

    pub fn state(&self) -> ReadSignal<AuthState> {
        self.state.read_only()
    }

    pub fn toasts(&self) -> RwSignal<ToastState> {
        self.toasts
    }

    pub fn user(&self) -> Option<User> {
        self.state.with(|s| s.user.clone())
    }

    pub fn is_admin(&self) -> bool {
        self.state.with(|s| s.is_admin)
    }

    pub fn loading(&self) -> bool {
        self.state.with(|s| s.loading)
    }

    fn controller(&self) -> Option<Rc<ClientController>> {
        self.controller.try_get_value()
    }

    /// Provider email/password login.
    ///
    /// # Errors
    ///
    /// Returns the provider error, or [`ProviderError::Unavailable`] once the
    /// provider component is gone.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ProviderError> {
        let controller = self.controller().ok_or(ProviderError::Unavailable)?;
        controller.login(email, password).await
    }

    pub fn admin_login(&self, username: &str, password: &str) -> bool {
        self.controller().is_some_and(|c| c.admin_login(username, password))
    }

    pub async fn logout(&self) {
        if let Some(controller) = self.controller() {
            controller.logout().await;
        }
    }

    /// Create a provider account.
    ///
    /// # Errors
    ///
    /// Returns the provider error, or [`ProviderError::Unavailable`] once the
    /// provider component is gone.
    pub async fn register(&self, form: &Registration) -> Result<RegistrationOutcome, ProviderError> {
        let controller = self.controller().ok_or(ProviderError::Unavailable)?;
        controller.register(form).await
    }

    pub fn set_user(&self, user: Option<User>) {
        if let Some(controller) = self.controller() {
            controller.set_user(user);
        }
    }

    pub fn set_is_admin(&self, is_admin: bool) {
        if let Some(controller) = self.controller() {
            controller.set_is_admin(is_admin);
        }
    }

    pub fn set_loading(&self, loading: bool) {
        if let Some(controller) = self.controller() {
            controller.set_loading(loading);
        }
    }
}

/// Provide auth state and operations to `children`.
#[component]
pub fn AuthProvider(config: AuthConfig, children: Children) -> impl IntoView {
    let state = RwSignal::new(AuthState::default());
    let toasts = RwSignal::new(ToastState::default());
    let navigator: Rc<dyn Navigator> = Rc::new(RouterNavigator(use_navigate()));
    let controller = Rc::new(build_controller(&config, state, toasts, navigator));

    let guard = controller.mount_guard();
    on_cleanup(move || guard.release());

    #[cfg(feature = "hydrate")]
    {
        let startup = Rc::clone(&controller);
        leptos::task::spawn_local(async move {
            let changes = startup.service().subscribe();
            startup.start().await;
            startup.watch(changes).await;
        });

        let resync = Rc::clone(&controller);
        let listener = VisibilityListener::install(move || {
            let resync = Rc::clone(&resync);
            leptos::task::spawn_local(async move {
                let _ = resync.on_visible().await;
            });
        });
        if listener.is_none() {
            leptos::logging::warn!("no document; tab visibility resync disabled");
        }
        let _listener = StoredValue::new_local(listener);
    }

    provide_context(state);
    provide_context(toasts);
    provide_context(AuthHandle::new(state, toasts, controller));

    children()
}

/// Auth handle from the nearest [`AuthProvider`].
///
/// # Panics
///
/// Panics when called outside an [`AuthProvider`].
pub fn use_auth() -> AuthHandle {
    expect_context::<AuthHandle>()
}
