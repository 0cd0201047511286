//! Keystone-backed [`Authenticator`] with a cached, self-refreshing token.

use crate::catalog::find_endpoint;
use crate::client::{IdentityClient, IdentityClientBuilder};
use crate::models::Access;
use crate::Result;
use chrono::Duration;
use openstack_core::auth::Authenticator;
use openstack_core::config::{CloudConfig, Credentials};
use openstack_core::types::{EndpointInterface, ServiceType};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use url::Url;

/// Tokens expiring within this many seconds are renewed before use.
pub const DEFAULT_REFRESH_MARGIN_SECS: i64 = 60;

/// Authenticates against Keystone and resolves endpoints from the catalog.
///
/// The access document is cached. It is fetched on first use and again when
/// the token is within the refresh margin of its expiry.
#[derive(Debug)]
pub struct KeystoneAuthenticator {
    client: IdentityClient,
    credentials: Credentials,
    region: Option<String>,
    interface: EndpointInterface,
    refresh_margin: Duration,
    cached: RwLock<Option<Arc<Access>>>,
}

impl KeystoneAuthenticator {
    /// Create an authenticator. No request is made until a token is needed.
    #[must_use]
    pub fn new(client: IdentityClient, credentials: Credentials) -> Self {
        Self {
            client,
            credentials,
            region: None,
            interface: EndpointInterface::default(),
            refresh_margin: Duration::seconds(DEFAULT_REFRESH_MARGIN_SECS),
            cached: RwLock::new(None),
        }
    }

    /// Create an authenticator from a [`CloudConfig`], honouring its region,
    /// interface, timeout, and TLS settings.
    ///
    /// # Errors
    ///
    /// Returns [`openstack_core::Error::InvalidEndpoint`] for a malformed
    /// identity URL.
    pub fn from_config(config: &CloudConfig, credentials: Credentials) -> Result<Self> {
        let client = IdentityClientBuilder::from_config(config)?.build()?;
        let mut auth = Self::new(client, credentials).with_interface(config.interface);
        auth.region.clone_from(&config.region);
        Ok(auth)
    }

    /// Only consider catalog endpoints in `region`.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Pick `interface` URLs from the catalog.
    #[must_use]
    pub fn with_interface(mut self, interface: EndpointInterface) -> Self {
        self.interface = interface;
        self
    }

    /// Renew tokens that expire within `margin`.
    #[must_use]
    pub fn with_refresh_margin(mut self, margin: Duration) -> Self {
        self.refresh_margin = margin;
        self
    }

    /// The identity client in use.
    #[must_use]
    pub const fn client(&self) -> &IdentityClient {
        &self.client
    }

    /// Current access document, authenticating first if there is no usable token.
    ///
    /// # Errors
    ///
    /// Returns [`openstack_core::Error::AuthenticationFailed`] if Keystone
    /// rejects the credentials or cannot be reached.
    pub async fn access(&self) -> Result<Arc<Access>> {
        {
            let cached = self.cached.read().await;
            if let Some(access) = cached.as_ref().filter(|a| self.is_fresh(a)) {
                return Ok(Arc::clone(access));
            }
        }

        let mut cached = self.cached.write().await;
        // Another task may have refreshed while we waited for the lock.
        if let Some(access) = cached.as_ref().filter(|a| self.is_fresh(a)) {
            return Ok(Arc::clone(access));
        }
        if cached.is_some() {
            warn!(
                user = self.credentials.username().unwrap_or("<token>"),
                "Keystone token expiring, re-authenticating"
            );
        }

        let access = Arc::new(self.client.authenticate(&self.credentials).await?);
        *cached = Some(Arc::clone(&access));
        Ok(access)
    }

    /// Authenticate now, replacing any cached token.
    ///
    /// # Errors
    ///
    /// See [`KeystoneAuthenticator::access`].
    pub async fn authenticate(&self) -> Result<Arc<Access>> {
        let mut cached = self.cached.write().await;
        let access = Arc::new(self.client.authenticate(&self.credentials).await?);
        *cached = Some(Arc::clone(&access));
        Ok(access)
    }

    /// Drop the cached token so the next call re-authenticates.
    pub async fn invalidate(&self) {
        debug!("Keystone token invalidated");
        self.cached.write().await.take();
    }

    fn is_fresh(&self, access: &Access) -> bool {
        !access.token.expires_within(self.refresh_margin)
    }
}

#[async_trait::async_trait]
impl Authenticator for KeystoneAuthenticator {
    async fn token(&self) -> Result<String> {
        Ok(self.access().await?.token.id.clone())
    }

    async fn endpoint(&self, service: ServiceType) -> Result<Url> {
        let access = self.access().await?;
        find_endpoint(
            &access.service_catalog,
            service,
            self.region.as_deref(),
            self.interface,
        )
    }
}

/// Build a [`KeystoneAuthenticator`] from `OS_*` environment variables and
/// authenticate once.
///
/// # Errors
///
/// Returns [`openstack_core::Error::AuthenticationFailed`] when a required
/// variable is missing or Keystone rejects the credentials.
pub async fn authenticate_from_env() -> Result<KeystoneAuthenticator> {
    authenticate_from_lookup(|key| std::env::var(key).ok()).await
}

/// Same as [`authenticate_from_env`] with an injectable variable source.
///
/// # Errors
///
/// See [`authenticate_from_env`].
pub async fn authenticate_from_lookup<F>(lookup: F) -> Result<KeystoneAuthenticator>
where
    F: Fn(&str) -> Option<String>,
{
    let config = CloudConfig::from_lookup(&lookup)?;
    let credentials = Credentials::from_lookup(&lookup)?;
    let auth = KeystoneAuthenticator::from_config(&config, credentials)?;
    auth.authenticate().await?;
    Ok(auth)
}

#[cfg(test)]
mod tests {
    use super::*;
    use openstack_core::Error;
    use serde_json::json;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn access_body(server_uri: &str, token: &str, expires: &str) -> serde_json::Value {
        json!({
            "access": {
                "token": {"id": token, "expires": expires},
                "serviceCatalog": [
                    {
                        "type": "compute",
                        "name": "nova",
                        "endpoints": [
                            {"region": "RegionOne", "publicURL": format!("{server_uri}/one/v2/t1")},
                            {"region": "RegionTwo", "publicURL": format!("{server_uri}/two/v2/t1"),
                             "internalURL": format!("{server_uri}/internal/v2/t1")}
                        ]
                    },
                    {
                        "type": "network",
                        "name": "neutron",
                        "endpoints": [{"region": "RegionOne", "publicURL": format!("{server_uri}/neutron")}]
                    }
                ]
            }
        })
    }

    async fn keystone(expires: &str, times: u64) -> MockServer {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.0/tokens"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(access_body(&server.uri(), "tok", expires)),
            )
            .expect(times)
            .mount(&server)
            .await;
        server
    }

    fn authenticator(server: &MockServer) -> KeystoneAuthenticator {
        KeystoneAuthenticator::new(
            IdentityClient::new(server.uri()).unwrap(),
            Credentials::password("demo", "secret").with_tenant_name("demo"),
        )
    }

    #[tokio::test]
    async fn token_is_cached() {
        let server = keystone("2099-01-01T00:00:00Z", 1).await;
        let auth = authenticator(&server);

        assert_eq!(auth.token().await.unwrap(), "tok");
        assert_eq!(auth.token().await.unwrap(), "tok");
        let url = auth.endpoint(ServiceType::Network).await.unwrap();
        assert_eq!(url.path(), "/neutron");
    }

    #[tokio::test]
    async fn expiring_token_is_renewed() {
        let server = keystone("2000-01-01T00:00:00Z", 2).await;
        let auth = authenticator(&server);

        auth.token().await.unwrap();
        auth.token().await.unwrap();
    }

    #[tokio::test]
    async fn invalidate_forces_reauthentication() {
        let server = keystone("2099-01-01T00:00:00Z", 2).await;
        let auth = authenticator(&server);

        auth.token().await.unwrap();
        auth.invalidate().await;
        auth.token().await.unwrap();
    }

    #[tokio::test]
    async fn endpoint_honours_region_and_interface() {
        let server = keystone("2099-01-01T00:00:00Z", 1).await;
        let auth = authenticator(&server)
            .with_region("RegionTwo")
            .with_interface(EndpointInterface::Internal);

        let url = auth.endpoint(ServiceType::Compute).await.unwrap();
        assert_eq!(url.path(), "/internal/v2/t1");

        let err = auth.endpoint(ServiceType::Network).await.unwrap_err();
        assert!(matches!(err, Error::EndpointNotFound(_)));
    }

    #[tokio::test]
    async fn from_lookup_authenticates_eagerly() {
        let server = keystone("2099-01-01T00:00:00Z", 1).await;
        let vars: HashMap<String, String> = [
            ("OS_AUTH_URL", server.uri()),
            ("OS_USERNAME", "demo".to_owned()),
            ("OS_PASSWORD", "secret".to_owned()),
            ("OS_TENANT_NAME", "demo".to_owned()),
            ("OS_REGION_NAME", "RegionTwo".to_owned()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_owned(), v))
        .collect();

        let auth = authenticate_from_lookup(move |key: &str| vars.get(key).cloned())
            .await
            .unwrap();
        let url = auth.endpoint(ServiceType::Compute).await.unwrap();
        assert_eq!(url.path(), "/two/v2/t1");
    }

    #[tokio::test]
    async fn from_lookup_without_credentials() {
        let err = authenticate_from_lookup(|key: &str| {
            (key == "OS_AUTH_URL").then(|| "http://127.0.0.1:1".to_owned())
        })
        .await
        .unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailed(_)));
    }

    #[tokio::test]
    async fn rejected_credentials_surface_from_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.0/tokens"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = authenticator(&server).token().await.unwrap_err();
        assert!(err.is_unauthorized());
    }
}
