//! # openstack-compute
//!
//! Nova v2 client: keypairs, servers, and flavors.
//!
//! The client takes any [`Authenticator`](openstack_core::Authenticator) and
//! resolves its endpoint from it on every call, so a refreshed token or catalog
//! is picked up without rebuilding the client.
//!
//! ```no_run
//! use openstack_compute::{ComputeClient, CreateKeyPairRequest};
//! use std::sync::Arc;
//!
//! # async fn example() -> openstack_compute::Result<()> {
//! let auth = openstack_identity::authenticate_from_env().await?;
//! let compute = ComputeClient::new(Arc::new(auth))?;
//! let keypair = compute
//!     .create_keypair(&CreateKeyPairRequest::generate("deploy"))
//!     .await?;
//! println!("{}", keypair.fingerprint);
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod client;
pub mod models;

pub use client::{ComputeClient, ComputeClientBuilder};
pub use models::{
    CreateKeyPairRequest, CreateServerRequest, CreatedServer, Flavor, FlavorListParams,
    FlavorSummary, KeyPair, ResourceRef, SecurityGroupRef, Server, ServerAddress,
    ServerListParams, ServerNetwork, ServerSummary, UpdateServerRequest,
};

/// Result type used throughout this crate.
pub type Result<T> = openstack_core::Result<T>;
