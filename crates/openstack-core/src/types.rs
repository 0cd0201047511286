//! Core OpenStack domain types.
//!
//! Service types as they appear in the Keystone service catalog, endpoint
//! interfaces, and the `links` structure shared by most resource payloads.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Token header attached to every authenticated request.
pub const AUTH_TOKEN_HEADER: &str = "X-Auth-Token";

/// OpenStack services known to this workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    /// Keystone
    Identity,
    /// Nova
    Compute,
    /// Neutron
    Network,
}

impl ServiceType {
    /// Returns the catalog `type` string for this service.
    #[must_use]
    pub const fn catalog_type(&self) -> &'static str {
        match self {
            Self::Identity => "identity",
            Self::Compute => "compute",
            Self::Network => "network",
        }
    }

    /// Returns all known services.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Identity, Self::Compute, Self::Network]
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.catalog_type())
    }
}

impl FromStr for ServiceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|service| service.catalog_type() == s)
            .ok_or_else(|| Error::ConfigError(format!("Unknown service type: {s}")))
    }
}

/// Which of a catalog entry's URLs to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointInterface {
    /// `publicURL`
    #[default]
    Public,
    /// `internalURL`
    Internal,
    /// `adminURL`
    Admin,
}

impl EndpointInterface {
    /// Returns the interface name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for EndpointInterface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EndpointInterface {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().trim_end_matches("url") {
            "public" => Ok(Self::Public),
            "internal" => Ok(Self::Internal),
            "admin" => Ok(Self::Admin),
            _ => Err(Error::ConfigError(format!("Unknown endpoint interface: {s}"))),
        }
    }
}

/// A link to a resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    /// Link target
    pub href: String,
    /// Relation (`self`, `bookmark`, ...)
    pub rel: String,
}
