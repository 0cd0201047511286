//! Asynchronous Keystone v2.0 client.

use crate::models::{
    Access, AccessRoot, AuthRequest, AuthRoot, PasswordCredentials, Tenant, TenantsRoot,
    TokenCredentials,
};
use crate::Result;
use openstack_core::auth::StaticAuthenticator;
use openstack_core::client::{ClientConfig, IDENTITY_DEFAULT_TIMEOUT};
use openstack_core::config::{AuthMethod, CloudConfig, Credentials};
use openstack_core::request::{join_segments, parse_endpoint};
use openstack_core::types::ServiceType;
use openstack_core::{Error, QueryParams, ServiceClient};
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::{Client, StatusCode};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use url::Url;

const USER_AGENT: &str = concat!("openstack-identity/", env!("CARGO_PKG_VERSION"));
const API_VERSION: &str = "v2.0";

/// Builder for [`IdentityClient`].
#[derive(Debug, Clone)]
pub struct IdentityClientBuilder {
    auth_url: Url,
    http_config: ClientConfig,
}

impl IdentityClientBuilder {
    /// Create a new builder for the given identity URL.
    ///
    /// A URL without a path (`https://keystone:5000`) gets `/v2.0` appended.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the URL is malformed.
    pub fn new(auth_url: impl AsRef<str>) -> Result<Self> {
        let mut url = parse_endpoint(auth_url.as_ref())?;
        if url.path() == "/" {
            url = join_segments(&url, &[API_VERSION])?;
        }

        let config =
            ClientConfig::new().with_timeout(Duration::from_secs(IDENTITY_DEFAULT_TIMEOUT));

        Ok(Self {
            auth_url: url,
            http_config: config,
        })
    }

    /// Create a builder from a [`CloudConfig`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidEndpoint`] if the configured URL is malformed.
    pub fn from_config(config: &CloudConfig) -> Result<Self> {
        let builder = Self::new(&config.auth_url)?;
        let http_config = builder
            .http_config
            .clone()
            .with_timeout(config.timeout())
            .with_tls_verify(config.tls_verify);
        Ok(builder.with_http_config(http_config))
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Build the client instance.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the HTTP client cannot be built.
    pub fn build(self) -> Result<IdentityClient> {
        Ok(IdentityClient {
            http: self.http_config.build_http_client(USER_AGENT)?,
            auth_url: self.auth_url,
            logging: self.http_config.enable_logging,
        })
    }
}

/// Asynchronous client for Keystone v2.0.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: Client,
    auth_url: Url,
    logging: bool,
}

impl IdentityClient {
    /// Construct directly from an identity URL.
    ///
    /// # Errors
    ///
    /// See [`IdentityClientBuilder::new`] and [`IdentityClientBuilder::build`].
    pub fn new(auth_url: impl AsRef<str>) -> Result<Self> {
        IdentityClientBuilder::new(auth_url)?.build()
    }

    /// Access the identity URL.
    #[must_use]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// Exchange credentials for a token and service catalog (`POST /tokens`).
    ///
    /// # Errors
    ///
    /// Returns [`Error::AuthenticationFailed`] when the identity service is
    /// unreachable or rejects the request, and [`Error::DecodeError`] when the
    /// response is not a valid access document.
    pub async fn authenticate(&self, credentials: &Credentials) -> Result<Access> {
        let url = join_segments(&self.auth_url, &["tokens"])?;
        let body = AuthRoot {
            auth: auth_request(credentials),
        };

        if self.logging {
            info!(
                url = %url,
                user = credentials.username().unwrap_or("<token>"),
                "Keystone authentication"
            );
        }

        let response = self
            .http
            .post(url.clone())
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                Error::AuthenticationFailed(format!(
                    "identity service unreachable at {url}: {}",
                    Error::from(err)
                ))
            })?;

        let status = response.status();
        let bytes = response.bytes().await.map_err(|err| {
            Error::AuthenticationFailed(format!("failed to read identity response: {err}"))
        })?;

        if !status.is_success() {
            return Err(rejected(status, &bytes));
        }

        let root: AccessRoot = serde_json::from_slice(&bytes).map_err(|err| {
            Error::DecodeError(format!("Failed to parse Keystone access document: {err}"))
        })?;

        if self.logging {
            debug!(
                expires = %root.access.token.expires,
                services = root.access.service_catalog.len(),
                "Keystone token issued"
            );
        }

        Ok(root.access)
    }

    /// List the tenants the token's user belongs to (`GET /tenants`).
    ///
    /// # Errors
    ///
    /// Transport, status, and decode errors are returned unchanged.
    pub async fn list_tenants(&self, token: &str) -> Result<Vec<Tenant>> {
        let auth = StaticAuthenticator::new(token)
            .with_endpoint(ServiceType::Identity, self.auth_url.as_str())?;
        let service = ServiceClient::from_parts(
            ServiceType::Identity,
            Arc::new(auth),
            self.http.clone(),
            self.logging,
        );
        let url = service.resource_url(&["tenants"]).await?;
        let root: TenantsRoot = service.get_json(url, &QueryParams::new()).await?;
        Ok(root.tenants)
    }
}

fn auth_request(credentials: &Credentials) -> AuthRequest<'_> {
    let (password_credentials, token) = match credentials.method() {
        AuthMethod::Password { username, .. } => (
            Some(PasswordCredentials {
                username,
                password: credentials.expose_password().unwrap_or_default(),
            }),
            None,
        ),
        AuthMethod::Token(_) => (
            None,
            Some(TokenCredentials {
                id: credentials.expose_token().unwrap_or_default(),
            }),
        ),
    };

    AuthRequest {
        password_credentials,
        token,
        tenant_name: credentials.tenant_name(),
        tenant_id: credentials.tenant_id(),
    }
}

fn rejected(status: StatusCode, bytes: &[u8]) -> Error {
    let fault = Error::status(status.as_u16(), String::from_utf8_lossy(bytes).into_owned());
    let detail = fault
        .fault_message()
        .unwrap_or_else(|| fault.to_string());
    Error::AuthenticationFailed(format!("identity service returned {status}: {detail}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn access_body(server_uri: &str, token: &str) -> serde_json::Value {
        json!({
            "access": {
                "token": {
                    "id": token,
                    "expires": "2099-01-01T00:00:00Z",
                    "issued_at": "2024-05-01T10:00:00.000000",
                    "tenant": {"id": "t1", "name": "demo", "enabled": true}
                },
                "serviceCatalog": [
                    {
                        "type": "compute",
                        "name": "nova",
                        "endpoints": [{"region": "RegionOne", "publicURL": format!("{server_uri}/v2/t1")}]
                    }
                ],
                "user": {"id": "u1", "name": "demo", "roles": [{"name": "member"}]}
            }
        })
    }

    #[test]
    fn builder_appends_version_to_bare_host() {
        let client = IdentityClient::new("https://keystone.example.com:5000").unwrap();
        assert_eq!(
            client.auth_url().as_str(),
            "https://keystone.example.com:5000/v2.0"
        );

        let client = IdentityClient::new("https://keystone.example.com/identity/v2.0").unwrap();
        assert_eq!(client.auth_url().path(), "/identity/v2.0");
    }

    #[test]
    fn builder_rejects_malformed_url() {
        assert!(matches!(
            IdentityClient::new("keystone").unwrap_err(),
            Error::InvalidEndpoint(_)
        ));
    }

    #[tokio::test]
    async fn authenticate_with_password() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.0/tokens"))
            .and(header("Content-Type", "application/json"))
            .and(body_json(json!({
                "auth": {
                    "passwordCredentials": {"username": "demo", "password": "secret"},
                    "tenantName": "demo"
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(access_body(&server.uri(), "tok-1")))
            .expect(1)
            .mount(&server)
            .await;

        let client = IdentityClient::new(server.uri()).unwrap();
        let access = client
            .authenticate(&Credentials::password("demo", "secret").with_tenant_name("demo"))
            .await
            .unwrap();

        assert_eq!(access.token.id, "tok-1");
        assert_eq!(access.token.tenant.as_ref().map(|t| t.name.as_str()), Some("demo"));
        assert_eq!(access.service_catalog.len(), 1);
        assert_eq!(access.user.unwrap().roles[0].name, "member");
    }

    #[tokio::test]
    async fn authenticate_with_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.0/tokens"))
            .and(body_json(json!({"auth": {"token": {"id": "unscoped"}, "tenantId": "t1"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(access_body(&server.uri(), "scoped")))
            .mount(&server)
            .await;

        let client = IdentityClient::new(server.uri()).unwrap();
        let access = client
            .authenticate(&Credentials::token("unscoped").with_tenant_id("t1"))
            .await
            .unwrap();
        assert_eq!(access.token.id, "scoped");
    }

    #[tokio::test]
    async fn rejected_credentials_are_authentication_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.0/tokens"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "The request you have made requires authentication.", "code": 401, "title": "Unauthorized"}
            })))
            .mount(&server)
            .await;

        let client = IdentityClient::new(server.uri()).unwrap();
        let err = client
            .authenticate(&Credentials::password("demo", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(
            &err,
            Error::AuthenticationFailed(msg) if msg.contains("401") && msg.contains("requires authentication")
        ));
    }

    #[tokio::test]
    async fn unreachable_identity_is_authentication_failure() {
        let client = IdentityClient::new("http://127.0.0.1:1/v2.0").unwrap();
        let err = client
            .authenticate(&Credentials::password("demo", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::AuthenticationFailed(msg) if msg.contains("unreachable")));
    }

    #[tokio::test]
    async fn malformed_access_document_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v2.0/tokens"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access": {"token": {}}})))
            .mount(&server)
            .await;

        let client = IdentityClient::new(server.uri()).unwrap();
        let err = client
            .authenticate(&Credentials::password("demo", "secret"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DecodeError(_)));
    }

    #[tokio::test]
    async fn list_tenants_uses_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v2.0/tenants"))
            .and(header("X-Auth-Token", "tok-1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "tenants_links": [],
                "tenants": [
                    {"id": "t1", "name": "demo", "description": null, "enabled": true},
                    {"id": "t2", "name": "ops", "enabled": false}
                ]
            })))
            .mount(&server)
            .await;

        let client = IdentityClient::new(server.uri()).unwrap();
        let tenants = client.list_tenants("tok-1").await.unwrap();
        assert_eq!(tenants.len(), 2);
        assert!(!tenants[1].enabled);
    }
}
