//! User, session, and profile records.
//!
//! DESIGN
//! ======
//! Field names follow the identity provider's JSON user object so a provider
//! payload and a persisted admin record deserialize into the same [`User`].
//! Unknown provider fields are ignored.

#[cfg(test)]
#[path = "user_test.rs"]
mod user_test;

use serde::{Deserialize, Serialize};

/// An authenticated user, either issued by the provider or built from the
/// local admin directory.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Provider user id, or `local-admin-<username>` for local admins.
    pub id: String,
    /// Account email, if known.
    #[serde(default)]
    pub email: Option<String>,
    /// Login handle. Set for local admins and by profile enrichment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Display name from the profile table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    /// Phone number from the profile table.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Metadata supplied at sign-up.
    #[serde(default)]
    pub user_metadata: UserMetadata,
    /// Provider-controlled metadata, including the admin claim.
    #[serde(default)]
    pub app_metadata: AppMetadata,
    /// Timestamp of email confirmation, absent while confirmation is pending.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_confirmed_at: Option<String>,
    /// Linked identities; the first one carries the email verification flag.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub identities: Vec<Identity>,
}

/// User-editable metadata stored alongside the provider account.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Provider-controlled metadata.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMetadata {
    /// Admin claim granted by the provider (or set on local admins).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub claims_admin: Option<bool>,
}

/// One linked login identity.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    #[serde(default)]
    pub identity_data: IdentityData,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
}

/// Profile row fetched from the remote profile table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// A provider session: the token pair plus the user it was issued for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    /// Expiry in seconds since the Unix epoch.
    #[serde(default)]
    pub expires_at: Option<i64>,
    pub user: User,
}

impl User {
    /// True when the provider (or local admin record) carries an admin claim.
    #[must_use]
    pub fn has_admin_claim(&self) -> bool {
        self.app_metadata.claims_admin == Some(true)
    }

    /// Overlay profile fields onto the user. Profile values win, including
    /// absent ones.
    #[must_use]
    pub fn with_profile(mut self, profile: Profile) -> Self {
        self.full_name = profile.full_name;
        self.username = profile.username;
        self.phone = profile.phone;
        self
    }

    /// Whether a freshly registered account still has to confirm its email.
    ///
    /// Pending when no confirmation timestamp is set and the first identity
    /// has not verified its email. An account with no identities is not
    /// considered pending.
    #[must_use]
    pub fn needs_email_confirmation(&self) -> bool {
        self.email_confirmed_at.is_none()
            && self
                .identities
                .first()
                .is_some_and(|identity| identity.identity_data.email_verified != Some(true))
    }

    /// Best human-readable name for greetings.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.user_metadata
            .full_name
            .as_deref()
            .or(self.full_name.as_deref())
            .or(self.username.as_deref())
            .or(self.email.as_deref())
            .unwrap_or(&self.id)
    }
}

impl Session {
    /// True when the session expires within `margin_secs` of `now_secs`.
    /// Sessions without an expiry never expire.
    #[must_use]
    pub fn expires_within(&self, now_secs: i64, margin_secs: i64) -> bool {
        self.expires_at.is_some_and(|at| at <= now_secs + margin_secs)
    }
}
