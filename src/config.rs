//! Auth configuration.
//!
//! Supabase settings are optional: without them the provider adapter runs
//! in a degraded mode where only the local admin directory can sign in. The
//! admin directory is a JSON array of credentials with SHA-256 password
//! digests.
//!
//! Keys:
//! - `SUPABASE_URL`, `SUPABASE_ANON_KEY`: both required to enable the provider
//! - `AUTH_ADMIN_DIRECTORY`: JSON credential array (default: empty)
//! - `AUTH_PROFILE_TABLE`: profile table name (default: `users`)
//!
//! No admin credentials ship with the crate. With the default (empty)
//! directory every local admin login fails; an `admin` / `admin` account
//! exists only once it is configured, e.g.:
//!
//! ```text
//! AUTH_ADMIN_DIRECTORY='[{"username":"admin",
//!   "password_sha256":"8c6976e5b5410415bde908bd4dee15dfb167a9c873fc4bb8a81f6f2ab448a918",
//!   "email":"admin@example.com","full_name":"Master Administrator"}]'
//! ```
//!
//! `password_sha256` is the lowercase hex SHA-256 of the password
//! (`authstate::credentials::hash_password`).

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use authstate::AdminDirectory;

pub const DEFAULT_PROFILE_TABLE: &str = "users";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid AUTH_ADMIN_DIRECTORY: {0}")]
    AdminDirectory(#[from] serde_json::Error),
}

/// Project URL and public anon key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SupabaseConfig {
    pub url: String,
    pub anon_key: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthConfig {
    pub supabase: Option<SupabaseConfig>,
    pub admins: AdminDirectory,
    pub profile_table: String,
}

impl Default for AuthConfig {
    /// Provider disabled, no admins.
    fn default() -> Self {
        Self { supabase: None, admins: AdminDirectory::default(), profile_table: DEFAULT_PROFILE_TABLE.to_owned() }
    }
}

impl AuthConfig {
    /// Build config from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if the admin directory is present but malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());

        let supabase = match (non_empty("SUPABASE_URL"), non_empty("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(SupabaseConfig { url: url.trim_end_matches('/').to_owned(), anon_key }),
            _ => None,
        };
        let admins = match non_empty("AUTH_ADMIN_DIRECTORY") {
            Some(raw) => AdminDirectory::from_json(&raw)?,
            None => AdminDirectory::default(),
        };
        let profile_table = non_empty("AUTH_PROFILE_TABLE").unwrap_or_else(|| DEFAULT_PROFILE_TABLE.to_owned());

        Ok(Self { supabase, admins, profile_table })
    }

    /// Runtime environment (native and SSR builds).
    ///
    /// # Errors
    ///
    /// Returns an error if the admin directory is malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Values captured at compile time, for the WASM bundle.
    ///
    /// # Errors
    ///
    /// Returns an error if the admin directory is malformed.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| {
            let value = match key {
                "SUPABASE_URL" => option_env!("SUPABASE_URL"),
                "SUPABASE_ANON_KEY" => option_env!("SUPABASE_ANON_KEY"),
                "AUTH_ADMIN_DIRECTORY" => option_env!("AUTH_ADMIN_DIRECTORY"),
                "AUTH_PROFILE_TABLE" => option_env!("AUTH_PROFILE_TABLE"),
                _ => None,
            };
            value.map(str::to_owned)
        })
    }
}
