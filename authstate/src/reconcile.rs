//! Session reconciliation.
//!
//! Collapses provider session state and the persisted admin record into one
//! `(user, is_admin)` answer. Precedence:
//!
//! 1. A provider user wins. Admin status is directory email membership or the
//!    provider admin claim; the admin record is rewritten to match.
//! 2. Otherwise a still-valid local admin record is used as-is.
//! 3. Otherwise the admin record is cleared and the result is anonymous.
//!
//! Every trigger (initial load, change events, visibility resync, explicit
//! login) goes through these functions so they cannot drift apart.

#[cfg(test)]
#[path = "reconcile_test.rs"]
mod reconcile_test;

use crate::admin::LocalAdminStore;
use crate::credentials::AdminDirectory;
use crate::storage::KeyValueStore;
use crate::user::User;

/// Unified reconciliation result.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Reconciliation {
    pub user: Option<User>,
    pub is_admin: bool,
}

impl Reconciliation {
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }
}

/// Admin status of an (already enriched) provider user.
#[must_use]
pub fn is_admin_user(user: &User, directory: &AdminDirectory) -> bool {
    let listed = user.email.as_deref().is_some_and(|email| directory.contains_email(email));
    listed || user.has_admin_claim()
}

/// Step 1: a provider user is present.
pub fn with_provider_user<S: KeyValueStore>(user: User, admin: &LocalAdminStore<S>) -> Reconciliation {
    let is_admin = is_admin_user(&user, admin.directory());
    if is_admin {
        admin.persist(&user);
    } else {
        admin.clear();
    }
    Reconciliation { user: Some(user), is_admin }
}

/// Steps 2 and 3: no provider session.
pub fn without_provider_session<S: KeyValueStore>(admin: &LocalAdminStore<S>) -> Reconciliation {
    match admin.load_if_valid() {
        Some(user) => Reconciliation { user: Some(user), is_admin: true },
        None => {
            admin.clear();
            Reconciliation::anonymous()
        }
    }
}
