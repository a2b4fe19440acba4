//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards and user-aware components read the signal; the controller
//! writes it through [`SignalStore`], which runs every change through the
//! `authstate` reducer.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use authstate::{AuthAction, AuthState, AuthStore};
use leptos::prelude::*;

/// [`AuthStore`] over a reactive signal.
#[derive(Clone, Copy)]
pub struct SignalStore(pub RwSignal<AuthState>);

impl AuthStore for SignalStore {
    fn snapshot(&self) -> AuthState {
        self.0.try_get_untracked().unwrap_or_default()
    }

    fn dispatch(&self, action: AuthAction) {
        // A disposed signal means the provider is gone; drop the action.
        let _ = self.0.try_update(|state| state.apply(action));
    }
}
