//! Local admin directory.
//!
//! Operator accounts that authenticate without the identity provider. The
//! directory is supplied by configuration as a JSON array and only ever holds
//! SHA-256 password digests; it is immutable once built.

#[cfg(test)]
#[path = "credentials_test.rs"]
mod credentials_test;

use std::fmt::Write;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One operator account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCredential {
    pub username: String,
    /// Lowercase hex SHA-256 of the password.
    pub password_sha256: String,
    pub email: String,
    pub full_name: String,
}

/// Immutable table of operator accounts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AdminDirectory {
    entries: Vec<AdminCredential>,
}

fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

/// Hex SHA-256 digest of `password`, the form stored in the directory.
#[must_use]
pub fn hash_password(password: &str) -> String {
    bytes_to_hex(&Sha256::digest(password.as_bytes()))
}

impl AdminCredential {
    /// Build an entry from a plaintext password, hashing it immediately.
    #[must_use]
    pub fn with_password(username: &str, password: &str, email: &str, full_name: &str) -> Self {
        Self {
            username: username.to_owned(),
            password_sha256: hash_password(password),
            email: email.to_owned(),
            full_name: full_name.to_owned(),
        }
    }

    /// Case-insensitive username, exact password.
    fn accepts(&self, username: &str, password: &str) -> bool {
        self.username.to_lowercase() == username.to_lowercase()
            && self.password_sha256.eq_ignore_ascii_case(&hash_password(password))
    }
}

impl AdminDirectory {
    #[must_use]
    pub fn new(entries: Vec<AdminCredential>) -> Self {
        Self { entries }
    }

    /// Parse a directory from a JSON array of [`AdminCredential`] objects.
    ///
    /// # Errors
    ///
    /// Returns the serde error if the input is not a valid credential array.
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let entries: Vec<AdminCredential> = serde_json::from_str(raw)?;
        Ok(Self { entries })
    }

    #[must_use]
    pub fn entries(&self) -> &[AdminCredential] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Look up an operator by login handle and password.
    #[must_use]
    pub fn find(&self, username: &str, password: &str) -> Option<&AdminCredential> {
        self.entries.iter().find(|entry| entry.accepts(username, password))
    }

    /// True when `email` belongs to an operator account.
    #[must_use]
    pub fn contains_email(&self, email: &str) -> bool {
        self.entries.iter().any(|entry| entry.email == email)
    }

    /// True when an entry has exactly this username and email pair.
    #[must_use]
    pub fn matches_identity(&self, username: &str, email: &str) -> bool {
        self.entries
            .iter()
            .any(|entry| entry.username == username && entry.email == email)
    }
}
