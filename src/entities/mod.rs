//! Domain entities shared across gallery services.
//!
//! These are caller-supplied values: the services in this crate consume
//! them but do not own their lifecycle (the gallery database stores and
//! returns them, the mail service addresses them).

use serde::{Deserialize, Serialize};

/// A gallery user account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    /// Confirmed email address. Empty until the account is confirmed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email_address: Option<String>,
    /// Address awaiting confirmation (new accounts, address changes).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unconfirmed_email_address: Option<String>,
    /// Whether other users may contact this user through the gallery.
    #[serde(default = "default_true")]
    pub email_allowed: bool,
    /// Whether this user receives a notice when one of their packages
    /// is published.
    #[serde(default = "default_true")]
    pub notify_package_pushed: bool,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Create a confirmed user with default notification settings.
    pub fn new(username: impl Into<String>, email_address: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            email_address: Some(email_address.into()),
            unconfirmed_email_address: None,
            email_allowed: true,
            notify_package_pushed: true,
        }
    }

    /// A user is confirmed once they hold a confirmed email address.
    pub fn is_confirmed(&self) -> bool {
        self.email_address
            .as_deref()
            .map(|a| !a.is_empty())
            .unwrap_or(false)
    }

    /// The address mail should go to: the confirmed address, falling
    /// back to the unconfirmed one for not-yet-confirmed accounts.
    pub fn preferred_email(&self) -> Option<&str> {
        self.email_address
            .as_deref()
            .filter(|a| !a.is_empty())
            .or_else(|| {
                self.unconfirmed_email_address
                    .as_deref()
                    .filter(|a| !a.is_empty())
            })
    }
}

/// A package identity and its owners, independent of any version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageRegistration {
    pub id: String,
    pub owners: Vec<User>,
}

impl PackageRegistration {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            owners: Vec::new(),
        }
    }

    pub fn with_owners(id: impl Into<String>, owners: Vec<User>) -> Self {
        Self {
            id: id.into(),
            owners,
        }
    }
}

/// One published version of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Package {
    pub registration: PackageRegistration,
    pub version: String,
}

impl Package {
    pub fn new(registration: PackageRegistration, version: impl Into<String>) -> Self {
        Self {
            registration,
            version: version.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.registration.id
    }
}

/// Well-known credential kind strings.
///
/// External credentials use the `external.<provider-id>` form, where the
/// provider id refers to an entry in the configured auth providers.
pub mod credential_kinds {
    pub const PASSWORD: &str = "password.v1";
    pub const API_KEY: &str = "apikey.v1";
    pub const EXTERNAL_PREFIX: &str = "external.";

    pub fn is_password(kind: &str) -> bool {
        kind.starts_with("password.")
    }

    pub fn is_api_key(kind: &str) -> bool {
        kind.starts_with("apikey.")
    }

    pub fn is_external(kind: &str) -> bool {
        kind.starts_with(EXTERNAL_PREFIX)
    }

    /// Extract the provider id from an external credential kind.
    pub fn external_provider_id(kind: &str) -> Option<&str> {
        kind.strip_prefix(EXTERNAL_PREFIX).filter(|s| !s.is_empty())
    }
}

/// A stored login credential (password, API key, or external sign-in).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    pub kind: String,
    /// Provider-side identity for external credentials (e.g. the
    /// account name at the provider). Absent for local credentials.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<String>,
}

impl Credential {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            identity: None,
        }
    }

    pub fn external(provider_id: &str, identity: impl Into<String>) -> Self {
        Self {
            kind: format!("{}{}", credential_kinds::EXTERNAL_PREFIX, provider_id),
            identity: Some(identity.into()),
        }
    }
}
