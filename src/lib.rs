//! # authsync
//!
//! Leptos front-end glue for the `authstate` session core: a Supabase
//! adapter over `gloo-net`, `localStorage` persistence, a tab-visibility
//! resync listener, a toast channel, and the [`context::AuthProvider`]
//! component that wires them into a reactive `AuthState` signal.

pub mod config;
pub mod context;
pub mod net;
pub mod state;
pub mod util;

pub use authstate;

/// Route `log` output to the browser console and install the panic hook.
#[cfg(feature = "hydrate")]
pub fn init_logging() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
}
