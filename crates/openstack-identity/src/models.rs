//! Keystone v2.0 data models for tokens, tenants, and users.

use crate::catalog::CatalogEntry;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// `POST /tokens` request root.
#[derive(Debug, Serialize)]
pub(crate) struct AuthRoot<'a> {
    pub auth: AuthRequest<'a>,
}

/// Body of a token request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct AuthRequest<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_credentials: Option<PasswordCredentials<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<TokenCredentials<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct PasswordCredentials<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct TokenCredentials<'a> {
    pub id: &'a str,
}

/// `POST /tokens` response root.
#[derive(Debug, Deserialize)]
pub(crate) struct AccessRoot {
    pub access: Access,
}

/// Result of a successful authentication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Access {
    /// Issued token.
    pub token: Token,
    /// Endpoints available to this token.
    #[serde(rename = "serviceCatalog", default)]
    pub service_catalog: Vec<CatalogEntry>,
    /// Authenticated user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<User>,
}

/// A Keystone token.
#[derive(Clone, Serialize, Deserialize)]
pub struct Token {
    /// Token value, sent as `X-Auth-Token`.
    pub id: String,
    /// Expiry instant.
    pub expires: DateTime<Utc>,
    /// Issue time as reported by Keystone (often without a zone suffix).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<String>,
    /// Tenant the token is scoped to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tenant: Option<Tenant>,
    /// Audit identifiers.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audit_ids: Vec<String>,
}

impl Token {
    /// Returns true if the token expires within `margin` of now.
    #[must_use]
    pub fn expires_within(&self, margin: Duration) -> bool {
        self.expires - margin <= Utc::now()
    }

    /// Returns true if the token has expired.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.expires_within(Duration::zero())
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("id", &"[REDACTED]")
            .field("expires", &self.expires)
            .field("tenant", &self.tenant)
            .finish_non_exhaustive()
    }
}

/// A tenant (project).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tenant {
    /// Tenant ID.
    pub id: String,
    /// Tenant name.
    pub name: String,
    /// Optional description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the tenant is enabled.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
}

const fn enabled_by_default() -> bool {
    true
}

/// The authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User ID.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Login name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Roles granted on the scoped tenant.
    #[serde(default)]
    pub roles: Vec<Role>,
}

/// A role assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Role name.
    pub name: String,
    /// Role ID, when Keystone includes it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// `GET /tenants` response root.
#[derive(Debug, Deserialize)]
pub(crate) struct TenantsRoot {
    pub tenants: Vec<Tenant>,
}
