// Copyright (c) Microsoft Corporation.
// Licensed under the MIT License.

//! The authorization bundle resolved per organization.

use std::fmt;
use std::str::FromStr;

/// Role of the acting user within an organization.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    /// Full control, including member and credential management.
    Admin,
    /// Read/write access to the organization's resources.
    Member,
    /// Read access only.
    ReadOnly,
}

impl Role {
    /// The identity-service wire spelling of this role.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::Member => "member",
            Self::ReadOnly => "read_only",
        }
    }

    /// Returns `true` for roles allowed to mutate organization resources.
    #[must_use]
    pub fn can_write(self) -> bool {
        !matches!(self, Self::ReadOnly)
    }
}

/// Error returned when parsing an unrecognized role string.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unrecognized role `{role}`")]
pub struct UnknownRole {
    /// The string that failed to parse.
    pub role: String,
}

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            "read_only" => Ok(Self::ReadOnly),
            other => Err(UnknownRole { role: other.to_string() }),
        }
    }
}

/// An organization-scoped API key.
///
/// The key is a credential: it is deliberately excluded from `Debug` output
/// and implements no `Display`. Use [`reveal`][Self::reveal] at the single
/// point where the raw key is handed to the upstream client.
///
/// # Examples
///
/// ```
/// use orgpass::ApiKey;
///
/// let key = ApiKey::new("sk-live-1234");
///
/// assert_eq!(format!("{key:?}"), "ApiKey(<redacted>)");
/// assert_eq!(key.reveal(), "sk-live-1234");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Wraps a raw API key.
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Returns the raw key for handing to the upstream client.
    #[must_use]
    pub fn reveal(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// The resolved authorization context for one organization.
///
/// This is the value the cache stores and hands out: the acting user, the
/// organization, the user's role within it, and the organization's API key.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthContext {
    /// Identifier of the acting user.
    pub user_id: String,
    /// Identifier of the organization the context is scoped to.
    pub org_id: String,
    /// The user's role within the organization.
    pub role: Role,
    /// The organization's API key for upstream calls.
    pub api_key: ApiKey,
}
