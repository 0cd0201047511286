//! # openstack-network
//!
//! Neutron v2.0 client: networks, subnets, and ports.
//!
//! Catalog entries for Neutron usually point at the service root
//! (`https://cloud:9696`); the client appends `v2.0` unless the endpoint
//! already ends with it.

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod models;

pub use client::{NetworkClient, NetworkClientBuilder};
pub use models::{
    AllocationPool, CreateNetworkRequest, CreatePortRequest, CreateSubnetRequest, FixedIp,
    HostRoute, IpVersion, Network, NetworkListParams, Port, PortListParams, Subnet,
    SubnetListParams, UpdateNetworkRequest, UpdateSubnetRequest,
};

/// Result type used throughout this crate.
pub type Result<T> = openstack_core::Result<T>;
