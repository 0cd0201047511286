//! # openstack-core
//!
//! Core types and utilities for working with OpenStack service APIs.
//!
//! This crate provides the error taxonomy, configuration, authentication
//! contract, and the HTTP/JSON transport that the service crates
//! (`openstack-identity`, `openstack-compute`, `openstack-network`) build on.
//!
//! ## Modules
//!
//! - [`error`] - Error taxonomy and HTTP status classification
//! - [`ids`] - Strongly-typed resource identifiers
//! - [`types`] - Service types, endpoint interfaces, links
//! - [`config`] - Cloud configuration and credentials (explicit or from environment)
//! - [`client`] - HTTP client configuration and per-service timeouts
//! - [`request`] - Request URL construction
//! - [`query`] - Query-string builder for list filters
//! - [`auth`] - The [`Authenticator`](auth::Authenticator) contract
//! - [`transport`] - Authenticated JSON request execution

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod query;
pub mod request;
pub mod transport;
pub mod types;

// Re-export commonly used types
pub use auth::{Authenticator, StaticAuthenticator};
pub use error::{Error, Result};
pub use query::QueryParams;
pub use transport::ServiceClient;
pub use types::ServiceType;
