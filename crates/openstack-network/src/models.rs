//! Neutron v2.0 data models: networks, subnets, and ports.

use openstack_core::ids::{NetworkId, PortId, SubnetId};
use openstack_core::{Error, QueryParams};
use serde::{Deserialize, Serialize};
use std::fmt;

/// IP protocol version of a subnet. Encoded as the JSON integer 4 or 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum IpVersion {
    /// IPv4
    V4,
    /// IPv6
    V6,
}

impl TryFrom<u8> for IpVersion {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            4 => Ok(Self::V4),
            6 => Ok(Self::V6),
            other => Err(Error::DecodeError(format!(
                "unsupported IP version {other}"
            ))),
        }
    }
}

impl From<IpVersion> for u8 {
    fn from(version: IpVersion) -> Self {
        match version {
            IpVersion::V4 => 4,
            IpVersion::V6 => 6,
        }
    }
}

impl fmt::Display for IpVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", u8::from(*self))
    }
}

/// A range of addresses handed out by DHCP.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllocationPool {
    /// First address.
    pub start: String,
    /// Last address.
    pub end: String,
}

/// A static route pushed to hosts on a subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostRoute {
    /// Next hop address.
    pub nexthop: String,
    /// Destination CIDR.
    pub destination: String,
}

// Networks

/// A Neutron network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    /// Network ID.
    pub id: NetworkId,
    /// Network name.
    #[serde(default)]
    pub name: String,
    /// Operational status (`ACTIVE`, `DOWN`, ...).
    #[serde(default)]
    pub status: String,
    /// Administrative state.
    #[serde(default = "default_true")]
    pub admin_state_up: bool,
    /// Visible to all tenants.
    #[serde(default)]
    pub shared: bool,
    /// Owning tenant.
    #[serde(default)]
    pub tenant_id: String,
    /// Subnets on this network.
    #[serde(default)]
    pub subnets: Vec<SubnetId>,
    /// External (provider) network.
    #[serde(rename = "router:external", default)]
    pub external: bool,
    /// Maximum transmission unit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtu: Option<u32>,
}

/// Parameters for creating a network.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CreateNetworkRequest {
    /// Network name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Administrative state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// Share with all tenants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    /// Create on behalf of another tenant (admin only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tenant_id: Option<String>,
}

/// Mutable network attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateNetworkRequest {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New administrative state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// New sharing flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
}

/// Filters for listing networks.
#[derive(Debug, Clone, Default)]
pub struct NetworkListParams {
    /// Filter by name.
    pub name: Option<String>,
    /// Filter by status.
    pub status: Option<String>,
    /// Filter by owning tenant.
    pub tenant_id: Option<String>,
    /// Filter by sharing flag.
    pub shared: Option<bool>,
    /// Filter by external flag.
    pub external: Option<bool>,
}

impl NetworkListParams {
    /// Convert the params into URL query pairs.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.push_opt("name", self.name.as_deref());
        query.push_opt("status", self.status.as_deref());
        query.push_opt("tenant_id", self.tenant_id.as_deref());
        query.push_opt("shared", self.shared);
        query.push_opt("router:external", self.external);
        query
    }
}

// Subnets

/// A Neutron subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subnet {
    /// Subnet ID.
    pub id: SubnetId,
    /// Subnet name.
    #[serde(default)]
    pub name: String,
    /// Parent network.
    pub network_id: NetworkId,
    /// Owning tenant.
    #[serde(default)]
    pub tenant_id: String,
    /// Whether DHCP is enabled.
    #[serde(default)]
    pub enable_dhcp: bool,
    /// DNS servers handed out by DHCP.
    #[serde(default)]
    pub dns_nameservers: Vec<String>,
    /// DHCP allocation ranges.
    #[serde(default)]
    pub allocation_pools: Vec<AllocationPool>,
    /// Static host routes.
    #[serde(default)]
    pub host_routes: Vec<HostRoute>,
    /// IP version.
    pub ip_version: IpVersion,
    /// Gateway address; `None` when the subnet has no gateway.
    #[serde(default)]
    pub gateway_ip: Option<String>,
    /// Address range in CIDR notation.
    pub cidr: String,
}

/// Parameters for creating a subnet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateSubnetRequest {
    /// Parent network.
    pub network_id: NetworkId,
    /// IP version.
    pub ip_version: IpVersion,
    /// Address range in CIDR notation.
    pub cidr: String,
    /// DHCP allocation ranges. Neutron derives one from the CIDR when empty.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub allocation_pools: Vec<AllocationPool>,
    /// Subnet name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Gateway address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_ip: Option<String>,
    /// Enable DHCP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_dhcp: Option<bool>,
    /// DNS servers.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dns_nameservers: Vec<String>,
    /// Static host routes.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub host_routes: Vec<HostRoute>,
}

impl CreateSubnetRequest {
    /// Minimal request: network, version, and CIDR.
    #[must_use]
    pub fn new(network_id: NetworkId, ip_version: IpVersion, cidr: impl Into<String>) -> Self {
        Self {
            network_id,
            ip_version,
            cidr: cidr.into(),
            allocation_pools: Vec::new(),
            name: None,
            gateway_ip: None,
            enable_dhcp: None,
            dns_nameservers: Vec::new(),
            host_routes: Vec::new(),
        }
    }

    /// Add an allocation pool.
    #[must_use]
    pub fn with_allocation_pool(mut self, start: impl Into<String>, end: impl Into<String>) -> Self {
        self.allocation_pools.push(AllocationPool {
            start: start.into(),
            end: end.into(),
        });
        self
    }

    /// Set the subnet name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// Mutable subnet attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UpdateSubnetRequest {
    /// New name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New gateway address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_ip: Option<String>,
    /// Toggle DHCP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_dhcp: Option<bool>,
    /// Replace DNS servers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dns_nameservers: Option<Vec<String>>,
    /// Replace host routes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host_routes: Option<Vec<HostRoute>>,
}

/// Filters for listing subnets.
#[derive(Debug, Clone, Default)]
pub struct SubnetListParams {
    /// Filter by name.
    pub name: Option<String>,
    /// Filter by parent network.
    pub network_id: Option<NetworkId>,
    /// Filter by IP version.
    pub ip_version: Option<IpVersion>,
    /// Filter by CIDR.
    pub cidr: Option<String>,
    /// Filter by owning tenant.
    pub tenant_id: Option<String>,
}

impl SubnetListParams {
    /// Convert the params into URL query pairs.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.push_opt("name", self.name.as_deref());
        query.push_opt("network_id", self.network_id);
        query.push_opt("ip_version", self.ip_version);
        query.push_opt("cidr", self.cidr.as_deref());
        query.push_opt("tenant_id", self.tenant_id.as_deref());
        query
    }
}

// Ports

/// An address assigned to a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixedIp {
    /// Subnet the address belongs to.
    pub subnet_id: SubnetId,
    /// The address. Neutron picks one when omitted on create.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ip_address: Option<String>,
}

/// A Neutron port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Port ID.
    pub id: PortId,
    /// Port name.
    #[serde(default)]
    pub name: String,
    /// Parent network.
    pub network_id: NetworkId,
    /// Owning tenant.
    #[serde(default)]
    pub tenant_id: String,
    /// MAC address.
    pub mac_address: String,
    /// Administrative state.
    #[serde(default = "default_true")]
    pub admin_state_up: bool,
    /// Operational status.
    #[serde(default)]
    pub status: String,
    /// Assigned addresses.
    #[serde(default)]
    pub fixed_ips: Vec<FixedIp>,
    /// Attached device (server ID, router ID, ...).
    #[serde(default)]
    pub device_id: String,
    /// Kind of attached device (`compute:nova`, `network:dhcp`, ...).
    #[serde(default)]
    pub device_owner: String,
    /// Security group IDs.
    #[serde(default)]
    pub security_groups: Vec<String>,
}

/// Parameters for creating a port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreatePortRequest {
    /// Parent network.
    pub network_id: NetworkId,
    /// Port name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Requested addresses.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fixed_ips: Vec<FixedIp>,
    /// Administrative state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// Requested MAC address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mac_address: Option<String>,
    /// Security group IDs.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_groups: Option<Vec<String>>,
}

impl CreatePortRequest {
    /// Minimal request on `network_id`.
    #[must_use]
    pub fn new(network_id: NetworkId) -> Self {
        Self {
            network_id,
            name: None,
            fixed_ips: Vec::new(),
            admin_state_up: None,
            mac_address: None,
            security_groups: None,
        }
    }
}

/// Filters for listing ports.
#[derive(Debug, Clone, Default)]
pub struct PortListParams {
    /// Filter by parent network.
    pub network_id: Option<NetworkId>,
    /// Filter by attached device.
    pub device_id: Option<String>,
    /// Filter by device kind.
    pub device_owner: Option<String>,
    /// Filter by MAC address.
    pub mac_address: Option<String>,
}

impl PortListParams {
    /// Convert the params into URL query pairs.
    #[must_use]
    pub fn to_query(&self) -> QueryParams {
        let mut query = QueryParams::new();
        query.push_opt("network_id", self.network_id);
        query.push_opt("device_id", self.device_id.as_deref());
        query.push_opt("device_owner", self.device_owner.as_deref());
        query.push_opt("mac_address", self.mac_address.as_deref());
        query
    }
}

const fn default_true() -> bool {
    true
}
