//! Toast queue fed by the auth controller.
//!
//! DESIGN
//! ======
//! Newest toast first, capped at [`TOAST_LIMIT`]; older toasts fall off the
//! end. Rendering and auto-dismiss timing belong to the view layer.

#[cfg(test)]
#[path = "toast_test.rs"]
mod toast_test;

use authstate::{Notice, Notifier, Severity};
use leptos::prelude::*;

/// Maximum number of toasts kept at once.
pub const TOAST_LIMIT: usize = 3;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    /// Unique toast identifier (UUID string).
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ToastState {
    pub toasts: Vec<Toast>,
}

impl ToastState {
    /// Queue a notice and return the new toast's id.
    pub fn push(&mut self, notice: Notice) -> String {
        let id = uuid::Uuid::new_v4().to_string();
        self.toasts.insert(
            0,
            Toast { id: id.clone(), title: notice.title, description: notice.description, severity: notice.severity },
        );
        self.toasts.truncate(TOAST_LIMIT);
        id
    }

    /// Remove a toast by id. Unknown ids are ignored.
    pub fn dismiss(&mut self, id: &str) {
        self.toasts.retain(|t| t.id != id);
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }
}

/// [`Notifier`] that pushes into a toast signal.
#[derive(Clone, Copy)]
pub struct ToastSink(pub RwSignal<ToastState>);

impl Notifier for ToastSink {
    fn notify(&self, notice: Notice) {
        let _ = self.0.try_update(|state| state.push(notice));
    }
}
