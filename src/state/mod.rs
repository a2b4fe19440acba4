//! Reactive state shared through Leptos context.
//!
//! SYSTEM CONTEXT
//! ==============
//! `auth` adapts an `RwSignal<AuthState>` to the core reducer seam; `toast`
//! holds the notification queue the auth controller writes into.

pub mod auth;
pub mod toast;
