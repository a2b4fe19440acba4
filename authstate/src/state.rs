//! Auth state machine.
//!
//! DESIGN
//! ======
//! A single reducer ([`AuthState::apply`]) owns every transition so the
//! `is_admin => user` invariant is enforced in one place, whichever sink
//! (a Leptos signal, a test cell) holds the state.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::cell::RefCell;
use std::rc::Rc;

use crate::reconcile::Reconciliation;
use crate::user::User;

/// Current authentication state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub is_admin: bool,
    pub loading: bool,
}

/// Coarse view of [`AuthState`] for guards and rendering.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthPhase {
    Loading,
    Authenticated { is_admin: bool },
    Anonymous,
}

/// Reducer input.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AuthAction {
    /// Apply a reconciliation result wholesale.
    Initialize { user: Option<User>, is_admin: bool, loading: bool },
    SetLoading(bool),
    LoginSuccess { user: User, is_admin: bool },
    LoginFailure,
    AdminLoginSuccess { user: User },
    Logout,
    SetUser(Option<User>),
    SetIsAdmin(bool),
}

impl Default for AuthState {
    /// App start: nothing known yet, first reconciliation pending.
    fn default() -> Self {
        Self { user: None, is_admin: false, loading: true }
    }
}

impl AuthState {
    #[must_use]
    pub fn anonymous() -> Self {
        Self { user: None, is_admin: false, loading: false }
    }

    #[must_use]
    pub fn phase(&self) -> AuthPhase {
        if self.loading {
            return AuthPhase::Loading;
        }
        match self.user {
            Some(_) => AuthPhase::Authenticated { is_admin: self.is_admin },
            None => AuthPhase::Anonymous,
        }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn apply(&mut self, action: AuthAction) {
        match action {
            AuthAction::Initialize { user, is_admin, loading } => {
                self.user = user;
                self.is_admin = is_admin;
                self.loading = loading;
            }
            AuthAction::SetLoading(loading) => self.loading = loading,
            AuthAction::LoginSuccess { user, is_admin } => {
                self.user = Some(user);
                self.is_admin = is_admin;
                self.loading = false;
            }
            AuthAction::AdminLoginSuccess { user } => {
                self.user = Some(user);
                self.is_admin = true;
                self.loading = false;
            }
            AuthAction::LoginFailure | AuthAction::Logout => *self = Self::anonymous(),
            AuthAction::SetUser(user) => self.user = user,
            AuthAction::SetIsAdmin(is_admin) => self.is_admin = is_admin,
        }
        if self.user.is_none() {
            self.is_admin = false;
        }
    }
}

impl From<Reconciliation> for AuthAction {
    fn from(result: Reconciliation) -> Self {
        Self::Initialize { user: result.user, is_admin: result.is_admin, loading: false }
    }
}

/// Holder of the live [`AuthState`].
pub trait AuthStore {
    fn snapshot(&self) -> AuthState;
    fn dispatch(&self, action: AuthAction);
}

/// Plain shared cell implementation of [`AuthStore`].
#[derive(Clone, Debug, Default)]
pub struct SharedAuthState {
    inner: Rc<RefCell<AuthState>>,
}

impl SharedAuthState {
    #[must_use]
    pub fn new(state: AuthState) -> Self {
        Self { inner: Rc::new(RefCell::new(state)) }
    }
}

impl AuthStore for SharedAuthState {
    fn snapshot(&self) -> AuthState {
        self.inner.borrow().clone()
    }

    fn dispatch(&self, action: AuthAction) {
        self.inner.borrow_mut().apply(action);
    }
}
