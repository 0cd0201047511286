//! Asynchronous Nova v2 client implementation.

use crate::models::{
    CreateKeyPairRequest, CreateServerRequest, CreatedServer, Flavor, FlavorListParams,
    FlavorSummary, KeyPair, KeyPairsRoot, Server, ServerListParams, ServerSummary,
    UpdateServerRequest,
};
use crate::Result;
use openstack_core::client::{ClientConfig, COMPUTE_DEFAULT_TIMEOUT};
use openstack_core::ids::ServerId;
use openstack_core::request::parse_endpoint;
use openstack_core::types::ServiceType;
use openstack_core::{Authenticator, QueryParams, ServiceClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("openstack-compute/", env!("CARGO_PKG_VERSION"));

/// Builder for [`ComputeClient`].
#[derive(Clone)]
pub struct ComputeClientBuilder {
    auth: Arc<dyn Authenticator>,
    http_config: ClientConfig,
    endpoint: Option<Url>,
}

impl ComputeClientBuilder {
    /// Create a new builder using `auth` for tokens and endpoint lookup.
    #[must_use]
    pub fn new(auth: Arc<dyn Authenticator>) -> Self {
        let config =
            ClientConfig::new().with_timeout(Duration::from_secs(COMPUTE_DEFAULT_TIMEOUT));

        Self {
            auth,
            http_config: config,
            endpoint: None,
        }
    }

    /// Override the HTTP client configuration.
    #[must_use]
    pub fn with_http_config(mut self, config: ClientConfig) -> Self {
        self.http_config = config;
        self
    }

    /// Use `endpoint` instead of the catalog's compute endpoint.
    ///
    /// # Errors
    ///
    /// Returns [`openstack_core::Error::InvalidEndpoint`] if the URL is malformed.
    pub fn with_endpoint(mut self, endpoint: impl AsRef<str>) -> Result<Self> {
        self.endpoint = Some(parse_endpoint(endpoint.as_ref())?);
        Ok(self)
    }

    /// Build the client instance.
    ///
    /// # Errors
    ///
    /// Returns [`openstack_core::Error::ConfigError`] if the HTTP client cannot
    /// be built.
    pub fn build(self) -> Result<ComputeClient> {
        let mut service = ServiceClient::new(
            ServiceType::Compute,
            self.auth,
            &self.http_config,
            USER_AGENT,
        )?;
        if let Some(endpoint) = self.endpoint {
            service = service.with_endpoint_override(endpoint);
        }
        Ok(ComputeClient { service })
    }
}

/// Asynchronous client for Nova.
#[derive(Debug, Clone)]
pub struct ComputeClient {
    service: ServiceClient,
}

impl ComputeClient {
    /// Construct with default settings.
    ///
    /// # Errors
    ///
    /// See [`ComputeClientBuilder::build`].
    pub fn new(auth: Arc<dyn Authenticator>) -> Result<Self> {
        ComputeClientBuilder::new(auth).build()
    }

    /// List keypairs.
    pub async fn list_keypairs(&self) -> Result<Vec<KeyPair>> {
        let url = self.service.resource_url(&["os-keypairs"]).await?;
        let root: KeyPairsRoot = self.service.get_json(url, &QueryParams::new()).await?;
        Ok(root.keypairs.into_iter().map(|entry| entry.keypair).collect())
    }

    /// Fetch a keypair by name.
    pub async fn get_keypair(&self, name: &str) -> Result<KeyPair> {
        let url = self.service.item_url(&["os-keypairs"], name).await?;
        self.service
            .get_keyed(url, &QueryParams::new(), "keypair")
            .await
    }

    /// Create or import a keypair.
    pub async fn create_keypair(&self, request: &CreateKeyPairRequest) -> Result<KeyPair> {
        let url = self.service.resource_url(&["os-keypairs"]).await?;
        let keypair: KeyPair = self.service.post_keyed(url, "keypair", request).await?;
        debug!(name = %keypair.name, fingerprint = %keypair.fingerprint, "keypair created");
        Ok(keypair)
    }

    /// Delete a keypair.
    pub async fn delete_keypair(&self, name: &str) -> Result<()> {
        let url = self.service.item_url(&["os-keypairs"], name).await?;
        self.service.delete(url).await
    }

    /// List servers (ID and name only).
    pub async fn list_servers(&self, params: &ServerListParams) -> Result<Vec<ServerSummary>> {
        let url = self.service.resource_url(&["servers"]).await?;
        self.service
            .get_keyed(url, &params.to_query(), "servers")
            .await
    }

    /// List servers with full details.
    pub async fn list_servers_detail(&self, params: &ServerListParams) -> Result<Vec<Server>> {
        let url = self.service.resource_url(&["servers", "detail"]).await?;
        self.service
            .get_keyed(url, &params.to_query(), "servers")
            .await
    }

    /// Fetch a server by ID.
    pub async fn get_server(&self, id: ServerId) -> Result<Server> {
        let url = self.server_url(id).await?;
        self.service
            .get_keyed(url, &QueryParams::new(), "server")
            .await
    }

    /// Boot a server. The returned record carries the ID and admin password;
    /// poll [`ComputeClient::get_server`] for its status.
    pub async fn create_server(&self, request: &CreateServerRequest) -> Result<CreatedServer> {
        let url = self.service.resource_url(&["servers"]).await?;
        let created: CreatedServer = self.service.post_keyed(url, "server", request).await?;
        debug!(id = %created.id, name = %request.name, "server boot requested");
        Ok(created)
    }

    /// Update mutable server attributes.
    pub async fn update_server(
        &self,
        id: ServerId,
        request: &UpdateServerRequest,
    ) -> Result<Server> {
        let url = self.server_url(id).await?;
        self.service.put_keyed(url, "server", request).await
    }

    /// Rename a server.
    pub async fn rename_server(&self, id: ServerId, name: impl Into<String>) -> Result<Server> {
        let request = UpdateServerRequest {
            name: Some(name.into()),
            ..UpdateServerRequest::default()
        };
        self.update_server(id, &request).await
    }

    /// Delete a server.
    pub async fn delete_server(&self, id: ServerId) -> Result<()> {
        let url = self.server_url(id).await?;
        self.service.delete(url).await
    }

    /// List flavors (ID and name only).
    pub async fn list_flavors(&self, params: &FlavorListParams) -> Result<Vec<FlavorSummary>> {
        let url = self.service.resource_url(&["flavors"]).await?;
        self.service
            .get_keyed(url, &params.to_query(), "flavors")
            .await
    }

    /// List flavors with full details.
    pub async fn list_flavors_detail(&self, params: &FlavorListParams) -> Result<Vec<Flavor>> {
        let url = self.service.resource_url(&["flavors", "detail"]).await?;
        self.service
            .get_keyed(url, &params.to_query(), "flavors")
            .await
    }

    /// Fetch a flavor by ID.
    pub async fn get_flavor(&self, id: &str) -> Result<Flavor> {
        let url = self.service.item_url(&["flavors"], id).await?;
        self.service
            .get_keyed(url, &QueryParams::new(), "flavor")
            .await
    }

    async fn server_url(&self, id: ServerId) -> Result<Url> {
        let id = id.to_string();
        self.service.item_url(&["servers"], &id).await
    }
}
