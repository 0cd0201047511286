//! # openstack-identity
//!
//! Keystone v2.0 client for OpenStack.
//!
//! [`IdentityClient`] exchanges credentials for a token and service catalog.
//! [`KeystoneAuthenticator`] wraps it as an
//! [`Authenticator`](openstack_core::Authenticator): it caches the token,
//! renews it shortly before expiry, and resolves each service's endpoint from
//! the catalog by region and interface.
//!
//! ## Example
//!
//! ```no_run
//! use openstack_identity::authenticate_from_env;
//! use openstack_core::{Authenticator, ServiceType};
//!
//! # async fn example() -> openstack_identity::Result<()> {
//! let auth = authenticate_from_env().await?;
//! let compute = auth.endpoint(ServiceType::Compute).await?;
//! println!("compute endpoint: {compute}");
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod authenticator;
pub mod catalog;
pub mod client;
pub mod models;

pub use authenticator::{authenticate_from_env, authenticate_from_lookup, KeystoneAuthenticator};
pub use catalog::{find_endpoint, CatalogEndpoint, CatalogEntry};
pub use client::{IdentityClient, IdentityClientBuilder};
pub use models::{Access, Role, Tenant, Token, User};

/// Result type used throughout this crate.
pub type Result<T> = openstack_core::Result<T>;
