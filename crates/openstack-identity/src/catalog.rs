//! Keystone v2.0 service catalog and endpoint selection.

use openstack_core::request::parse_endpoint;
use openstack_core::types::{EndpointInterface, ServiceType};
use openstack_core::{Error, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// One service in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Service type (`compute`, `network`, ...).
    #[serde(rename = "type")]
    pub service_type: String,
    /// Service name (`nova`, `neutron`, ...).
    #[serde(default)]
    pub name: String,
    /// Endpoints, one per region.
    #[serde(default)]
    pub endpoints: Vec<CatalogEndpoint>,
}

/// Endpoint URLs of one service in one region.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEndpoint {
    /// Endpoint ID.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Region name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Public URL.
    #[serde(rename = "publicURL", default, skip_serializing_if = "Option::is_none")]
    pub public_url: Option<String>,
    /// Internal URL.
    #[serde(rename = "internalURL", default, skip_serializing_if = "Option::is_none")]
    pub internal_url: Option<String>,
    /// Admin URL.
    #[serde(rename = "adminURL", default, skip_serializing_if = "Option::is_none")]
    pub admin_url: Option<String>,
}

impl CatalogEndpoint {
    /// URL for the requested interface.
    #[must_use]
    pub fn url(&self, interface: EndpointInterface) -> Option<&str> {
        match interface {
            EndpointInterface::Public => self.public_url.as_deref(),
            EndpointInterface::Internal => self.internal_url.as_deref(),
            EndpointInterface::Admin => self.admin_url.as_deref(),
        }
    }
}

/// Pick the endpoint of `service` from `catalog`.
///
/// When `region` is given only endpoints in that region qualify; otherwise the
/// first endpoint exposing `interface` wins.
///
/// # Errors
///
/// Returns [`Error::EndpointNotFound`] when nothing qualifies and
/// [`Error::InvalidEndpoint`] when the catalog URL is malformed.
pub fn find_endpoint(
    catalog: &[CatalogEntry],
    service: ServiceType,
    region: Option<&str>,
    interface: EndpointInterface,
) -> Result<Url> {
    let entries: Vec<&CatalogEntry> = catalog
        .iter()
        .filter(|entry| entry.service_type == service.catalog_type())
        .collect();
    if entries.is_empty() {
        return Err(Error::EndpointNotFound(format!(
            "service catalog has no {service} service"
        )));
    }

    let url = entries
        .iter()
        .flat_map(|entry| entry.endpoints.iter())
        .filter(|endpoint| match region {
            Some(r) => endpoint.region.as_deref() == Some(r),
            None => true,
        })
        .find_map(|endpoint| endpoint.url(interface))
        .ok_or_else(|| {
            let region = region.map_or_else(String::new, |r| format!(" in region {r}"));
            Error::EndpointNotFound(format!("no {interface} {service} endpoint{region}"))
        })?;

    parse_endpoint(url)
}
