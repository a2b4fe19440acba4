//! Framework-free authentication session core.
//!
//! This crate owns the session model shared by the `authsync` front-end:
//! the user/session types, the local admin directory and its persisted
//! record, the identity-provider seam, the reconciler that merges provider
//! and local state, and the reducer-driven auth state machine.
//!
//! ARCHITECTURE
//! ============
//! Browser and network concerns stay behind two traits, [`KeyValueStore`]
//! and [`IdentityProvider`], so every decision in this crate runs against
//! in-memory fakes in tests and against `localStorage` + Supabase in the
//! browser.

pub mod admin;
pub mod controller;
pub mod credentials;
pub mod provider;
pub mod reconcile;
pub mod resync;
pub mod service;
pub mod state;
pub mod storage;
pub mod user;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use admin::LocalAdminStore;
pub use controller::{AuthController, MountGuard, Navigator, Notice, Notifier, Severity};
pub use credentials::{AdminCredential, AdminDirectory};
pub use provider::{AuthBroadcaster, AuthChange, AuthChanges, AuthEvent, IdentityProvider, ProviderError};
pub use reconcile::Reconciliation;
pub use service::{AuthService, Registration, RegistrationOutcome};
pub use state::{AuthAction, AuthPhase, AuthState, AuthStore, SharedAuthState};
pub use storage::{KeyValueStore, MemoryStore};
pub use user::{Profile, Session, User};
