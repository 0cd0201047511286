//! Nova v2 data models: keypairs, servers, and flavors.

use chrono::{DateTime, Utc};
use openstack_core::ids::{ImageId, NetworkId, ServerId};
use openstack_core::types::Link;
use openstack_core::QueryParams;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

// Keypairs

/// An SSH keypair registered with Nova.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    /// Keypair name, unique per user.
    pub name: String,
    /// OpenSSH public key.
    pub public_key: String,
    /// Key fingerprint.
    #[serde(default)]
    pub fingerprint: String,
    /// Private key, only returned when Nova generated the pair.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub private_key: Option<String>,
    /// Owning user.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Parameters for creating or importing a keypair.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateKeyPairRequest {
    /// Keypair name.
    pub name: String,
    /// Public key to import. Nova generates a pair when this is `None`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_key: Option<String>,
}

impl CreateKeyPairRequest {
    /// Import an existing public key.
    #[must_use]
    pub fn import(name: impl Into<String>, public_key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public_key: Some(public_key.into()),
        }
    }

    /// Ask Nova to generate the pair.
    #[must_use]
    pub fn generate(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            public_key: None,
        }
    }
}

/// `GET /os-keypairs` wraps every element in its own `keypair` object.
#[derive(Debug, Deserialize)]
pub(crate) struct KeyPairsRoot {
    pub keypairs: Vec<KeyPairEntry>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct KeyPairEntry {
    pub keypair: KeyPair,
}

// Servers

/// Reference to a related resource (flavor or image) embedded in a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceRef {
    /// Resource ID.
    pub id: String,
    /// Links to the resource.
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Server entry returned by `GET /servers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerSummary {
    /// Server ID.
    pub id: ServerId,
    /// Server name.
    pub name: String,
    /// Links to the server.
    #[serde(default)]
    pub links: Vec<Link>,
}

/// An address attached to a server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerAddress {
    /// IP address.
    pub addr: String,
    /// 4 or 6.
    pub version: u8,
    /// `fixed` or `floating`.
    #[serde(
        rename = "OS-EXT-IPS:type",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub address_type: Option<String>,
    /// MAC address of the port.
    #[serde(
        rename = "OS-EXT-IPS-MAC:mac_addr",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub mac_addr: Option<String>,
}

/// Full server representation (`GET /servers/detail`, `GET /servers/{id}`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    /// Server ID.
    pub id: ServerId,
    /// Server name.
    pub name: String,
    /// Lifecycle status (`ACTIVE`, `BUILD`, `ERROR`, ...).
    pub status: String,
    /// Owning tenant.
    #[serde(default)]
    pub tenant_id: String,
    /// Creating user.
    #[serde(default)]
    pub user_id: String,
    /// Image the server was booted from. Empty for volume-backed servers.
    #[serde(default, deserialize_with = "image_ref")]
    pub image: Option<ResourceRef>,
    /// Flavor of the server.
    pub flavor: ResourceRef,
    /// Addresses keyed by network name.
    #[serde(default)]
    pub addresses: HashMap<String, Vec<ServerAddress>>,
    /// User metadata.
    #[serde(default)]
    pub metadata: HashMap<String, String>,
    /// Injected keypair name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    /// Build progress in percent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<u8>,
    /// Opaque host identifier.
    #[serde(rename = "hostId", default)]
    pub host_id: String,
    /// Public IPv4 address, if configured.
    #[serde(rename = "accessIPv4", default)]
    pub access_ipv4: String,
    /// Public IPv6 address, if configured.
    #[serde(rename = "accessIPv6", default)]
    pub access_ipv6: String,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last update timestamp.
    pub updated: DateTime<Utc>,
    /// Links to the server.
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Server {
    /// Returns true if the server is running.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == "ACTIVE"
    }
}

fn image_ref<'de, D>(deserializer: D) -> Result<Option<ResourceRef>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum ImageField {
        Ref(ResourceRef),
        Empty(String),
    }

    Ok(match Option::<ImageField>::deserialize(deserializer)? {
        Some(ImageField::Ref(image)) => Some(image),
        Some(ImageField::Empty(_)) | None => None,
    })
}

/// A network to attach on boot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerNetwork {
    /// Network ID.
    pub uuid: NetworkId,
    /// Requested fixed IP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ip: Option<String>,
}

impl From<NetworkId> for ServerNetwork {
    fn from(uuid: NetworkId) -> Self {
        Self {
            uuid,
            fixed_ip: None,
        }
    }
}

/// A security group by name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroupRef {
    /// Security group name.
    pub name: String,
}

/// Parameters for booting a server.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateServerRequest {
    /// Server name.
    pub name: String,
    /// Image to boot.
    #[serde(rename = "imageRef", skip_serializing_if = "Option::is_none")]
    pub image_ref: Option<ImageId>,
    /// Flavor ID.
    #[serde(rename = "flavorRef")]
    pub flavor_ref: String,
    /// Keypair to inject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key_name: Option<String>,
    /// Networks to attach.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub networks: Vec<ServerNetwork>,
    /// Security groups.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub security_groups: Vec<SecurityGroupRef>,
    /// User metadata.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    /// Base64-encoded user data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_data: Option<String>,
    /// Availability zone.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
}

/// Response to a boot request.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedServer {
    /// Assigned server ID.
    pub id: ServerId,
    /// Generated administrator password, unless disabled by the cloud.
    #[serde(rename = "adminPass", default)]
    pub admin_pass: Option<String>,
    /// Links to the server.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Security groups applied.
    #[serde(default)]
    pub security_groups: Vec<SecurityGroupRef>,
}

/// Mutable server attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateServerRequest {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New public IPv4 address.
    #[serde(rename = "accessIPv4", skip_serializing_if = "Option::is_none")]
    pub access_ipv4: Option<String>,
    /// New public IPv6 address.
    #[serde(rename = "accessIPv6", skip_serializing_if = "Option::is_none")]
    pub access_ipv6: Option<String>,
}

/// Filters for listing servers.
#[derive(Debug, Clone, Default)]
pub struct ServerListParams {
    /// Name (regular expression match on the server side).
    pub name: Option<String>,
    /// Status.
    pub status: Option<String>,
    /// Booted from this image.
    pub image: Option<ImageId>,
    /// Using this flavor.
    pub flavor: Option<String>,
    /// Changed since this instant.
    pub changes_since: Option<DateTime<Utc>>,
}

impl ServerListParams {
    /// Convert the params into URL query pairs.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.push_opt("name", self.name.as_deref());
        query.push_opt("status", self.status.as_deref());
        query.push_opt("image", self.image);
        query.push_opt("flavor", self.flavor.as_deref());
        query.push_opt(
            "changes-since",
            self.changes_since.map(|since| since.to_rfc3339()),
        );
        query
    }
}

// Flavors

/// Flavor entry returned by `GET /flavors`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlavorSummary {
    /// Flavor ID (not necessarily a UUID).
    pub id: String,
    /// Flavor name.
    pub name: String,
    /// Links to the flavor.
    #[serde(default)]
    pub links: Vec<Link>,
}

/// Full flavor representation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Flavor {
    /// Flavor ID.
    pub id: String,
    /// Flavor name.
    pub name: String,
    /// Memory in MiB.
    pub ram: u64,
    /// Virtual CPUs.
    pub vcpus: u32,
    /// Root disk in GiB.
    pub disk: u64,
    /// Ephemeral disk in GiB.
    #[serde(rename = "OS-FLV-EXT-DATA:ephemeral", default)]
    pub ephemeral: u64,
    /// Swap in MiB. Nova reports "no swap" as an empty string.
    #[serde(default, deserialize_with = "swap_mib")]
    pub swap: u64,
    /// Network bandwidth factor.
    #[serde(default = "default_rxtx_factor")]
    pub rxtx_factor: f64,
    /// Whether every tenant may use the flavor.
    #[serde(rename = "os-flavor-access:is_public", default = "default_public")]
    pub is_public: bool,
    /// Links to the flavor.
    #[serde(default)]
    pub links: Vec<Link>,
}

const fn default_rxtx_factor() -> f64 {
    1.0
}

const fn default_public() -> bool {
    true
}

fn swap_mib<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Swap {
        Size(u64),
        Empty(String),
    }

    match Swap::deserialize(deserializer)? {
        Swap::Size(size) => Ok(size),
        Swap::Empty(text) if text.is_empty() => Ok(0),
        Swap::Empty(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

/// Filters for listing flavors.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlavorListParams {
    /// Minimum root disk in GiB.
    pub min_disk: Option<u64>,
    /// Minimum memory in MiB.
    pub min_ram: Option<u64>,
}

impl FlavorListParams {
    /// Convert the params into URL query pairs.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.push_opt("minDisk", self.min_disk);
        query.push_opt("minRam", self.min_ram);
        query
    }
}
