//! Asynchronous Neutron v2.0 client implementation.

use crate::models::{
    CreateNetworkRequest, CreatePortRequest, CreateSubnetRequest, Network, NetworkListParams,
    Port, PortListParams, Subnet, SubnetListParams, UpdateNetworkRequest, UpdateSubnetRequest,
};
use crate::Result;
use openstack_core::client::{ClientConfig, NETWORK_DEFAULT_TIMEOUT};
use openstack_core::ids::{NetworkId, PortId, SubnetId};
use openstack_core::request::parse_endpoint;
use openstack_core::types::ServiceType;
use openstack_core::{Authenticator, QueryParams, ServiceClient};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;
use url::Url;

const USER_AGENT: &str = concat!("openstack-network/", env!("CARGO_PKG_VERSION"));

/// Neutron catalog entries usually omit the API version.
const API_VERSION: &str = "v2.0";

/// Builder for [`NetworkClient`].
#[derive(Clone)]
pub struct NetworkClientBuilder {
    auth: Arc<dyn Authenticator>,
    http_config: ClientConfig,
    endpoint: Option<Url>,
}

impl NetworkClientBuilder {
    /// Create a new builder using `auth` for tokens and endpoint lookup.
    #[must_use]
    pub fn new(auth: Arc<dyn Authenticator>) -> Self {
        let config =
            ClientConfig::new().with_timeout(Duration::from_secs(NETWORK_DEFAULT_TIMEOUT));

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

    /// Use `endpoint` instead of the catalog's network endpoint.
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
    pub fn build(self) -> Result<NetworkClient> {
        let mut service = ServiceClient::new(
            ServiceType::Network,
            self.auth,
            &self.http_config,
            USER_AGENT,
        )?
        .with_version_segment(API_VERSION);
        if let Some(endpoint) = self.endpoint {
            service = service.with_endpoint_override(endpoint);
        }
        Ok(NetworkClient { service })
    }
}

/// Asynchronous client for Neutron.
#[derive(Debug, Clone)]
pub struct NetworkClient {
    service: ServiceClient,
}

impl NetworkClient {
    /// Construct with default settings.
    ///
    /// # Errors
    ///
    /// See [`NetworkClientBuilder::build`].
    pub fn new(auth: Arc<dyn Authenticator>) -> Result<Self> {
        NetworkClientBuilder::new(auth).build()
    }

    /// List networks.
    pub async fn list_networks(&self, params: &NetworkListParams) -> Result<Vec<Network>> {
        let url = self.service.resource_url(&["networks"]).await?;
        self.service
            .get_keyed(url, &params.to_query(), "networks")
            .await
    }

    /// Fetch a network by ID.
    pub async fn get_network(&self, id: NetworkId) -> Result<Network> {
        let url = self.item_url("networks", id).await?;
        self.service
            .get_keyed(url, &QueryParams::new(), "network")
            .await
    }

    /// Create a network.
    pub async fn create_network(&self, request: &CreateNetworkRequest) -> Result<Network> {
        let url = self.service.resource_url(&["networks"]).await?;
        let network: Network = self.service.post_keyed(url, "network", request).await?;
        debug!(id = %network.id, name = %network.name, "network created");
        Ok(network)
    }

    /// Update an existing network.
    pub async fn update_network(
        &self,
        id: NetworkId,
        request: &UpdateNetworkRequest,
    ) -> Result<Network> {
        let url = self.item_url("networks", id).await?;
        self.service.put_keyed(url, "network", request).await
    }

    /// Delete a network.
    pub async fn delete_network(&self, id: NetworkId) -> Result<()> {
        let url = self.item_url("networks", id).await?;
        self.service.delete(url).await
    }

    /// List subnets.
    pub async fn list_subnets(&self, params: &SubnetListParams) -> Result<Vec<Subnet>> {
        let url = self.service.resource_url(&["subnets"]).await?;
        self.service
            .get_keyed(url, &params.to_query(), "subnets")
            .await
    }

    /// Fetch a subnet by ID.
    pub async fn get_subnet(&self, id: SubnetId) -> Result<Subnet> {
        let url = self.item_url("subnets", id).await?;
        self.service
            .get_keyed(url, &QueryParams::new(), "subnet")
            .await
    }

    /// Create a subnet.
    pub async fn create_subnet(&self, request: &CreateSubnetRequest) -> Result<Subnet> {
        let url = self.service.resource_url(&["subnets"]).await?;
        let subnet: Subnet = self.service.post_keyed(url, "subnet", request).await?;
        debug!(id = %subnet.id, cidr = %subnet.cidr, "subnet created");
        Ok(subnet)
    }

    /// Update an existing subnet.
    pub async fn update_subnet(
        &self,
        id: SubnetId,
        request: &UpdateSubnetRequest,
    ) -> Result<Subnet> {
        let url = self.item_url("subnets", id).await?;
        self.service.put_keyed(url, "subnet", request).await
    }

    /// Delete a subnet.
    pub async fn delete_subnet(&self, id: SubnetId) -> Result<()> {
        let url = self.item_url("subnets", id).await?;
        self.service.delete(url).await
    }

    /// List ports.
    pub async fn list_ports(&self, params: &PortListParams) -> Result<Vec<Port>> {
        let url = self.service.resource_url(&["ports"]).await?;
        self.service
            .get_keyed(url, &params.to_query(), "ports")
            .await
    }

    /// Fetch a port by ID.
    pub async fn get_port(&self, id: PortId) -> Result<Port> {
        let url = self.item_url("ports", id).await?;
        self.service
            .get_keyed(url, &QueryParams::new(), "port")
            .await
    }

    /// Create a port.
    pub async fn create_port(&self, request: &CreatePortRequest) -> Result<Port> {
        let url = self.service.resource_url(&["ports"]).await?;
        let port: Port = self.service.post_keyed(url, "port", request).await?;
        debug!(id = %port.id, mac = %port.mac_address, "port created");
        Ok(port)
    }

    /// Delete a port.
    pub async fn delete_port(&self, id: PortId) -> Result<()> {
        let url = self.item_url("ports", id).await?;
        self.service.delete(url).await
    }

    async fn item_url(&self, collection: &str, id: impl ToString) -> Result<Url> {
        let id = id.to_string();
        self.service.item_url(&[collection], &id).await
    }
}
