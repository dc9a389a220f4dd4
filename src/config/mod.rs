//! Configuration types for the WebCRM SDK.
//!
//! # Overview
//!
//! - [`CrmConfig`]: credentials, endpoint and transport settings
//! - [`CrmConfigBuilder`]: a builder for constructing [`CrmConfig`] instances
//! - [`ApiKey`]: a validated API key with masked debug output
//! - [`EndpointUri`]: the normalized base URL of the API
//!
//! # Example
//!
//! ```rust
//! use webcrm::{ApiKey, CrmConfig};
//!
//! let config = CrmConfig::builder()
//!     .tenant("my-tenant")
//!     .login("api-user")
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(
//!     config.endpoint_uri().as_str(),
//!     "https://my-tenant.crm.infopark.net/api2/"
//! );
//! ```

mod newtypes;

pub use newtypes::{ApiKey, EndpointUri};

use std::time::Duration;

use crate::error::ConfigError;

/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(25);

/// Configuration for a [`crate::CrmClient`].
///
/// Holds the API user credentials and the endpoint every request is sent
/// to. A config is validated once when built; the client created from it
/// never re-reads ambient state.
///
/// # Thread Safety
///
/// `CrmConfig` is `Clone`, `Send`, and `Sync`.
#[derive(Clone, Debug)]
pub struct CrmConfig {
    api_key: ApiKey,
    login: String,
    tenant: Option<String>,
    endpoint_uri: EndpointUri,
    timeout: Duration,
    user_agent_prefix: Option<String>,
}

impl CrmConfig {
    /// Creates a new builder for constructing a `CrmConfig`.
    #[must_use]
    pub fn builder() -> CrmConfigBuilder {
        CrmConfigBuilder::new()
    }

    /// Returns the API key.
    #[must_use]
    pub const fn api_key(&self) -> &ApiKey {
        &self.api_key
    }

    /// Returns the login of the API user.
    #[must_use]
    pub fn login(&self) -> &str {
        &self.login
    }

    /// Returns the tenant, if one was configured.
    #[must_use]
    pub fn tenant(&self) -> Option<&str> {
        self.tenant.as_deref()
    }

    /// Returns the base URL all resource paths are resolved against.
    #[must_use]
    pub const fn endpoint_uri(&self) -> &EndpointUri {
        &self.endpoint_uri
    }

    /// Returns the per-request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the user agent prefix, if configured.
    #[must_use]
    pub fn user_agent_prefix(&self) -> Option<&str> {
        self.user_agent_prefix.as_deref()
    }
}

// Verify CrmConfig is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CrmConfig>();
};

/// Builder for constructing [`CrmConfig`] instances.
///
/// `api_key`, `login` and either `tenant` or `endpoint` are required. When
/// both `tenant` and `endpoint` are set, `endpoint` wins.
///
/// # Defaults
///
/// - `timeout`: 25 seconds
/// - `user_agent_prefix`: `None`
#[derive(Debug, Default)]
pub struct CrmConfigBuilder {
    api_key: Option<ApiKey>,
    login: Option<String>,
    tenant: Option<String>,
    endpoint: Option<String>,
    timeout: Option<Duration>,
    user_agent_prefix: Option<String>,
}

impl CrmConfigBuilder {
    /// Creates a new builder with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: ApiKey) -> Self {
        self.api_key = Some(key);
        self
    }

    /// Sets the login of the API user (required).
    #[must_use]
    pub fn login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    /// Sets the tenant name. Required unless an endpoint is given.
    #[must_use]
    pub fn tenant(mut self, tenant: impl Into<String>) -> Self {
        self.tenant = Some(tenant.into());
        self
    }

    /// Sets an explicit endpoint, e.g. `crm.example.com/api2`.
    #[must_use]
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into());
        self
    }

    /// Sets the per-request timeout.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Sets the user agent prefix for HTTP requests.
    #[must_use]
    pub fn user_agent_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.user_agent_prefix = Some(prefix.into());
        self
    }

    /// Builds the [`CrmConfig`].
    ///
    /// Required keys are checked in the order `api_key`, `login`, `tenant`.
    /// An empty string counts as missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequiredField`] for the first missing
    /// key, or [`ConfigError::InvalidEndpoint`] if the endpoint cannot be
    /// parsed.
    pub fn build(self) -> Result<CrmConfig, ConfigError> {
        let api_key = self
            .api_key
            .ok_or(ConfigError::MissingRequiredField { field: "api_key" })?;
        let login = non_blank(self.login)
            .ok_or(ConfigError::MissingRequiredField { field: "login" })?;
        let tenant = non_blank(self.tenant);

        let endpoint_uri = match (non_blank(self.endpoint), tenant.as_deref()) {
            (Some(endpoint), _) => EndpointUri::from_endpoint(&endpoint)?,
            (None, Some(tenant)) => EndpointUri::from_tenant(tenant)?,
            (None, None) => return Err(ConfigError::MissingRequiredField { field: "tenant" }),
        };

        Ok(CrmConfig {
            api_key,
            login,
            tenant,
            endpoint_uri,
            timeout: self.timeout.unwrap_or(DEFAULT_TIMEOUT),
            user_agent_prefix: self.user_agent_prefix,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
