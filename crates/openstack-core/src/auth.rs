//! Authentication contract shared by every service client.
//!
//! A service client never talks to Keystone itself. It asks its
//! [`Authenticator`] for a token to put in `X-Auth-Token` and for the base
//! endpoint of the service it wraps. Callers construct one authenticator per
//! session and hand it to each client as an `Arc<dyn Authenticator>`.

use crate::types::ServiceType;
use crate::{Error, Result};
use secrecy::{ExposeSecret, SecretString};
use std::collections::HashMap;
use url::Url;

/// Source of tokens and service endpoints.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait Authenticator: Send + Sync {
    /// Return a valid token, authenticating or refreshing first if needed.
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationFailed`] when no token can be obtained.
    async fn token(&self) -> Result<String>;

    /// Return the base endpoint for a service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EndpointNotFound`] when the service is not available
    /// to this session.
    async fn endpoint(&self, service: ServiceType) -> Result<Url>;
}

/// Authenticator backed by a pre-issued token and explicit endpoints.
///
/// Useful when a token was obtained out of band, or to point a client at a
/// fixed endpoint without consulting a catalog.
#[derive(Debug)]
pub struct StaticAuthenticator {
    token: SecretString,
    endpoints: HashMap<ServiceType, Url>,
}

impl StaticAuthenticator {
    /// Create an authenticator with no endpoints.
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: SecretString::from(token.into()),
            endpoints: HashMap::new(),
        }
    }

    /// Register the endpoint for a service.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if `url` is not a usable base endpoint.
    pub fn with_endpoint(mut self, service: ServiceType, url: impl AsRef<str>) -> Result<Self> {
        let url = crate::request::parse_endpoint(url.as_ref())?;
        self.endpoints.insert(service, url);
        Ok(self)
    }
}

#[async_trait::async_trait]
impl Authenticator for StaticAuthenticator {
    async fn token(&self) -> Result<String> {
        Ok(self.token.expose_secret().to_string())
    }

    async fn endpoint(&self, service: ServiceType) -> Result<Url> {
        self.endpoints
            .get(&service)
            .cloned()
            .ok_or_else(|| Error::EndpointNotFound(format!("no {service} endpoint configured")))
    }
}
