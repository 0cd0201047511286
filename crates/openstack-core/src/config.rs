//! Configuration structures for OpenStack clients.
//!
//! [`CloudConfig`] describes where the identity service lives and how service
//! endpoints are chosen from its catalog. [`Credentials`] carries the secrets
//! used to obtain a token; it is never serialized and its password or token is
//! redacted from `Debug` output.

use crate::types::EndpointInterface;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;
use validator::Validate;

/// Identity endpoint, e.g. `https://keystone.example.com:5000/v2.0`.
pub const ENV_AUTH_URL: &str = "OS_AUTH_URL";
/// User name for password authentication.
pub const ENV_USERNAME: &str = "OS_USERNAME";
/// Password for password authentication.
pub const ENV_PASSWORD: &str = "OS_PASSWORD";
/// Pre-issued token, used when no user name is set.
pub const ENV_TOKEN: &str = "OS_TOKEN";
/// Tenant name scope.
pub const ENV_TENANT_NAME: &str = "OS_TENANT_NAME";
/// Tenant ID scope.
pub const ENV_TENANT_ID: &str = "OS_TENANT_ID";
/// Keystone v3 spelling of [`ENV_TENANT_NAME`], accepted as a fallback.
pub const ENV_PROJECT_NAME: &str = "OS_PROJECT_NAME";
/// Keystone v3 spelling of [`ENV_TENANT_ID`], accepted as a fallback.
pub const ENV_PROJECT_ID: &str = "OS_PROJECT_ID";
/// Region used to pick catalog endpoints.
pub const ENV_REGION_NAME: &str = "OS_REGION_NAME";
/// Endpoint interface (`public`, `internal`, `admin`).
pub const ENV_INTERFACE: &str = "OS_INTERFACE";

/// Where to authenticate and how to choose service endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CloudConfig {
    /// Identity service URL
    #[validate(url)]
    pub auth_url: String,

    /// Region used to filter catalog endpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,

    /// Endpoint interface to use from the catalog
    #[serde(default)]
    pub interface: EndpointInterface,

    /// Request timeout in seconds
    #[validate(range(min = 1, max = 300))]
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Whether to verify TLS certificates
    #[serde(default = "default_tls_verify")]
    pub tls_verify: bool,
}

const fn default_request_timeout_secs() -> u64 {
    30
}

const fn default_tls_verify() -> bool {
    true
}

impl CloudConfig {
    /// Create a configuration for the given identity URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the URL is invalid.
    pub fn new(auth_url: impl Into<String>) -> Result<Self> {
        let config = Self {
            auth_url: auth_url.into(),
            region: None,
            interface: EndpointInterface::default(),
            request_timeout_secs: default_request_timeout_secs(),
            tls_verify: default_tls_verify(),
        };

        config
            .validate()
            .map_err(|e| Error::ConfigError(format!("Invalid configuration: {e}")))?;

        Ok(config)
    }

    /// Read `OS_AUTH_URL`, `OS_REGION_NAME`, and `OS_INTERFACE` from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationFailed`] when `OS_AUTH_URL` is unset and
    /// [`Error::ConfigError`] when a value is malformed.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`CloudConfig::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// See [`CloudConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let auth_url = required(&lookup, ENV_AUTH_URL)?;
        let mut config = Self::new(auth_url)?;
        config.region = non_empty(&lookup, ENV_REGION_NAME);
        if let Some(interface) = non_empty(&lookup, ENV_INTERFACE) {
            config.interface = interface.parse()?;
        }
        Ok(config)
    }

    /// Set the catalog region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the endpoint interface.
    #[must_use]
    pub fn with_interface(mut self, interface: EndpointInterface) -> Self {
        self.interface = interface;
        self
    }

    /// Set request timeout in seconds.
    #[must_use]
    pub fn with_timeout(mut self, seconds: u64) -> Self {
        self.request_timeout_secs = seconds;
        self
    }

    /// Set whether to verify TLS certificates.
    #[must_use]
    pub fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Get the request timeout as a Duration.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Parse the identity URL.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the URL cannot serve as a base endpoint.
    pub fn parse_auth_url(&self) -> Result<Url> {
        crate::request::parse_endpoint(&self.auth_url)
    }
}

/// How to prove identity to Keystone.
#[derive(Debug)]
pub enum AuthMethod {
    /// User name and password
    Password {
        /// User name
        username: String,
        /// Password
        password: SecretString,
    },
    /// An existing token, exchanged for a (possibly tenant-scoped) one
    Token(SecretString),
}

/// Credentials plus optional tenant scope.
#[derive(Debug)]
pub struct Credentials {
    method: AuthMethod,
    tenant_name: Option<String>,
    tenant_id: Option<String>,
}

impl Credentials {
    /// Password credentials.
    #[must_use]
    pub fn password(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::Password {
                username: username.into(),
                password: SecretString::from(password.into()),
            },
            tenant_name: None,
            tenant_id: None,
        }
    }

    /// Token credentials.
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            method: AuthMethod::Token(SecretString::from(token.into())),
            tenant_name: None,
            tenant_id: None,
        }
    }

    /// Read credentials from `OS_USERNAME`/`OS_PASSWORD` (or `OS_TOKEN`) and the
    /// tenant variables.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationFailed`] when no usable credential is set.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`Credentials::from_env`] with an injectable variable source.
    ///
    /// # Errors
    ///
    /// See [`Credentials::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let credentials = match non_empty(&lookup, ENV_USERNAME) {
            Some(username) => Self::password(username, required(&lookup, ENV_PASSWORD)?),
            None => match non_empty(&lookup, ENV_TOKEN) {
                Some(token) => Self::token(token),
                None => {
                    return Err(Error::AuthenticationFailed(format!(
                        "neither {ENV_USERNAME} nor {ENV_TOKEN} is set"
                    )))
                }
            },
        };

        let tenant_name =
            non_empty(&lookup, ENV_TENANT_NAME).or_else(|| non_empty(&lookup, ENV_PROJECT_NAME));
        let tenant_id =
            non_empty(&lookup, ENV_TENANT_ID).or_else(|| non_empty(&lookup, ENV_PROJECT_ID));

        Ok(Self {
            tenant_name,
            tenant_id,
            ..credentials
        })
    }

    /// Scope the token to a tenant by name.
    #[must_use]
    pub fn with_tenant_name(mut self, tenant_name: impl Into<String>) -> Self {
        self.tenant_name = Some(tenant_name.into());
        self
    }

    /// Scope the token to a tenant by ID.
    #[must_use]
    pub fn with_tenant_id(mut self, tenant_id: impl Into<String>) -> Self {
        self.tenant_id = Some(tenant_id.into());
        self
    }

    /// The authentication method.
    #[must_use]
    pub const fn method(&self) -> &AuthMethod {
        &self.method
    }

    /// User name, for password credentials.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        match &self.method {
            AuthMethod::Password { username, .. } => Some(username),
            AuthMethod::Token(_) => None,
        }
    }

    /// Password, for password credentials.
    #[must_use]
    pub fn expose_password(&self) -> Option<&str> {
        match &self.method {
            AuthMethod::Password { password, .. } => Some(password.expose_secret()),
            AuthMethod::Token(_) => None,
        }
    }

    /// Token, for token credentials.
    #[must_use]
    pub fn expose_token(&self) -> Option<&str> {
        match &self.method {
            AuthMethod::Token(token) => Some(token.expose_secret()),
            AuthMethod::Password { .. } => None,
        }
    }

    /// Tenant name scope.
    #[must_use]
    pub fn tenant_name(&self) -> Option<&str> {
        self.tenant_name.as_deref()
    }

    /// Tenant ID scope.
    #[must_use]
    pub fn tenant_id(&self) -> Option<&str> {
        self.tenant_id.as_deref()
    }
}

fn non_empty<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key).filter(|value| !value.trim().is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    non_empty(lookup, key)
        .ok_or_else(|| Error::AuthenticationFailed(format!("environment variable {key} is not set")))
}
