//! Persisted local admin record.
//!
//! SYSTEM CONTEXT
//! ==============
//! Two storage keys survive reloads: `isAdminAuth` (`"true"` or absent) and
//! `user` (the JSON-serialized admin [`User`]). The record is only trusted
//! when it still matches the configured [`AdminDirectory`] or carries an
//! admin claim; arbitrary storage content never grants admin status.

#[cfg(test)]
#[path = "admin_test.rs"]
mod admin_test;

use crate::credentials::{AdminCredential, AdminDirectory};
use crate::storage::KeyValueStore;
use crate::user::{AppMetadata, User, UserMetadata};

pub const IS_ADMIN_AUTH_KEY: &str = "isAdminAuth";
pub const USER_KEY: &str = "user";

/// Id prefix for users authenticated against the local directory.
pub const LOCAL_ADMIN_ID_PREFIX: &str = "local-admin-";

/// Local admin directory plus its persisted session record.
pub struct LocalAdminStore<S> {
    storage: S,
    directory: AdminDirectory,
}

impl<S: KeyValueStore> LocalAdminStore<S> {
    pub fn new(storage: S, directory: AdminDirectory) -> Self {
        Self { storage, directory }
    }

    #[must_use]
    pub fn directory(&self) -> &AdminDirectory {
        &self.directory
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn find_admin(&self, username: &str, password: &str) -> Option<&AdminCredential> {
        self.directory.find(username, password)
    }

    /// Mark the browser as admin-authenticated for `user`.
    pub fn persist(&self, user: &User) {
        let Ok(raw) = serde_json::to_string(user) else {
            log::error!("failed to serialize admin record for {}", user.id);
            return;
        };
        self.storage.set_item(IS_ADMIN_AUTH_KEY, "true");
        self.storage.set_item(USER_KEY, &raw);
    }

    pub fn clear(&self) {
        self.storage.remove_item(IS_ADMIN_AUTH_KEY);
        self.storage.remove_item(USER_KEY);
    }

    /// Read the persisted admin record if it is still trustworthy.
    ///
    /// A record that fails to parse is reported as absent and left in place.
    #[must_use]
    pub fn load_if_valid(&self) -> Option<User> {
        if self.storage.get_item(IS_ADMIN_AUTH_KEY).as_deref() != Some("true") {
            return None;
        }
        let raw = self.storage.get_item(USER_KEY)?;
        let user: User = match serde_json::from_str(&raw) {
            Ok(user) => user,
            Err(e) => {
                log::error!("error parsing local admin record: {e}");
                return None;
            }
        };
        let listed = match (user.username.as_deref(), user.email.as_deref()) {
            (Some(username), Some(email)) => self.directory.matches_identity(username, email),
            _ => false,
        };
        (listed || user.has_admin_claim()).then_some(user)
    }

    /// Authenticate against the directory and persist the resulting user.
    #[must_use]
    pub fn admin_login(&self, username: &str, password: &str) -> Option<User> {
        let entry = self.find_admin(username, password)?;
        let user = local_admin_user(entry);
        self.persist(&user);
        Some(user)
    }
}

/// Build the session user for a directory entry.
#[must_use]
pub fn local_admin_user(entry: &AdminCredential) -> User {
    User {
        id: format!("{LOCAL_ADMIN_ID_PREFIX}{}", entry.username),
        email: Some(entry.email.clone()),
        username: Some(entry.username.clone()),
        user_metadata: UserMetadata {
            full_name: Some(entry.full_name.clone()),
            username: Some(entry.username.clone()),
            phone: None,
        },
        app_metadata: AppMetadata { claims_admin: Some(true) },
        ..User::default()
    }
}
