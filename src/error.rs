//! Configuration error types for the WebCRM SDK.
//!
//! Errors raised by the API itself live in [`crate::clients::CrmError`];
//! this module only covers problems detected before any request is sent.
//!
//! # Error Handling
//!
//! All configuration constructors return `Result<T, ConfigError>` so that a
//! misconfigured client fails fast instead of on its first request.
//!
//! # Example
//!
//! ```rust
//! use webcrm::{ApiKey, ConfigError};
//!
//! let result = ApiKey::new("");
//! assert!(matches!(result, Err(ConfigError::EmptyApiKey)));
//! ```

use thiserror::Error;

/// Errors that can occur while building a [`crate::CrmConfig`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// API key cannot be empty.
    #[error("API key cannot be empty. Please provide the API key of your WebCRM API user.")]
    EmptyApiKey,

    /// A required configuration key is missing.
    #[error("Missing required configuration key: {field}")]
    MissingRequiredField {
        /// The name of the missing key.
        field: &'static str,
    },

    /// The endpoint could not be parsed as a URL.
    #[error("Invalid endpoint '{endpoint}'. Please provide a host name or a full URL.")]
    InvalidEndpoint {
        /// The endpoint that was provided.
        endpoint: String,
    },
}
