//! HTTP client configuration.
//!
//! Each service crate builds its `reqwest` client from a [`ClientConfig`], starting
//! from the service-specific default timeout below.

use crate::{Error, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;

// Service-specific timeout configurations (in seconds)

/// Default timeout for Identity (Keystone) requests
pub const IDENTITY_DEFAULT_TIMEOUT: u64 = 15;

/// Default timeout for Compute (Nova) requests
pub const COMPUTE_DEFAULT_TIMEOUT: u64 = 30;

/// Default timeout for Networking (Neutron) requests
pub const NETWORK_DEFAULT_TIMEOUT: u64 = 20;

/// Default connect timeout for every service
pub const DEFAULT_CONNECT_TIMEOUT: u64 = 10;

/// HTTP client configuration.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Request timeout
    pub timeout: Duration,

    /// TCP/TLS connect timeout
    pub connect_timeout: Duration,

    /// Whether TLS certificates are verified
    pub tls_verify: bool,

    /// Enable request/response logging
    pub enable_logging: bool,

    /// Enable response compression
    pub enable_compression: bool,
}

impl ClientConfig {
    /// Create a new client configuration with default values.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(DEFAULT_CONNECT_TIMEOUT),
            tls_verify: true,
            enable_logging: true,
            enable_compression: true,
        }
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set connect timeout.
    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Enable or disable TLS certificate verification.
    #[must_use]
    pub const fn with_tls_verify(mut self, verify: bool) -> Self {
        self.tls_verify = verify;
        self
    }

    /// Enable or disable logging.
    #[must_use]
    pub const fn with_logging(mut self, enabled: bool) -> Self {
        self.enable_logging = enabled;
        self
    }

    /// Enable or disable compression.
    #[must_use]
    pub const fn with_compression(mut self, enabled: bool) -> Self {
        self.enable_compression = enabled;
        self
    }

    /// Build a `reqwest` client honouring this configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the TLS backend cannot be initialised.
    pub fn build_http_client(&self, user_agent: &str) -> Result<Client> {
        let mut builder = ClientBuilder::new()
            .user_agent(user_agent)
            .timeout(self.timeout)
            .connect_timeout(self.connect_timeout);

        if !self.enable_compression {
            builder = builder.no_gzip();
        }
        if !self.tls_verify {
            builder = builder.danger_accept_invalid_certs(true);
        }

        builder
            .build()
            .map_err(|err| Error::ConfigError(format!("Failed to build HTTP client: {err}")))
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new()
    }
}
