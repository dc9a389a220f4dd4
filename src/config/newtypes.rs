//! Validated newtype wrappers for configuration values.
//!
//! This module provides type-safe wrappers around string values that validate
//! their contents on construction. Invalid values are rejected with clear error messages.

use crate::error::ConfigError;
use reqwest::Url;
use std::fmt;

/// A validated WebCRM API key.
///
/// The key is non-empty and masked in debug output so that it does not end
/// up in logs by accident.
///
/// # Example
///
/// ```rust
/// use webcrm::ApiKey;
///
/// let key = ApiKey::new("my-api-key").unwrap();
/// assert_eq!(key.as_ref(), "my-api-key");
/// assert_eq!(format!("{:?}", key), "ApiKey(*****)");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// Creates a new validated API key.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::EmptyApiKey`] if the key is empty.
    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.is_empty() {
            return Err(ConfigError::EmptyApiKey);
        }
        Ok(Self(key))
    }
}

impl AsRef<str> for ApiKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(*****)")
    }
}

/// The base URL every API path is resolved against.
///
/// Built either from an explicit endpoint or from the tenant name. The URL
/// always ends with a `/` so that relative paths such as `contacts/123`
/// join below it instead of replacing its last segment.
///
/// # Example
///
/// ```rust
/// use webcrm::EndpointUri;
///
/// let uri = EndpointUri::from_tenant("acme").unwrap();
/// assert_eq!(uri.as_str(), "https://acme.crm.infopark.net/api2/");
///
/// let uri = EndpointUri::from_endpoint("crm.example.com/api2").unwrap();
/// assert_eq!(uri.as_str(), "https://crm.example.com/api2/");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EndpointUri(Url);

impl EndpointUri {
    /// Builds the default endpoint of a hosted tenant.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the tenant name does not
    /// form a valid host name.
    pub fn from_tenant(tenant: &str) -> Result<Self, ConfigError> {
        Self::parse(format!("https://{tenant}.crm.infopark.net/api2/"))
    }

    /// Normalizes an explicit endpoint.
    ///
    /// `https://` is prepended unless the value already starts with `http`,
    /// and a trailing `/` is appended if missing.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidEndpoint`] if the result is not a valid URL.
    pub fn from_endpoint(endpoint: &str) -> Result<Self, ConfigError> {
        let mut url = if endpoint.starts_with("http") {
            endpoint.to_string()
        } else {
            format!("https://{endpoint}")
        };
        if !url.ends_with('/') {
            url.push('/');
        }
        Self::parse(url)
    }

    fn parse(url: String) -> Result<Self, ConfigError> {
        match Url::parse(&url) {
            Ok(parsed) if parsed.has_host() => Ok(Self(parsed)),
            _ => Err(ConfigError::InvalidEndpoint { endpoint: url }),
        }
    }

    /// Returns the endpoint as a string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Returns the parsed URL.
    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.0
    }
}

impl fmt::Display for EndpointUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str())
    }
}
