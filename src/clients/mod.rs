//! HTTP plumbing and the client context for the WebCRM API.
//!
//! # Overview
//!
//! - [`CrmClient`]: the context object passed to every operation
//! - [`RestApi`]: the transport that sends JSON requests and translates errors
//! - [`HttpMethod`]: the supported HTTP verbs
//! - [`HttpResponse`]: a response before its body is interpreted
//! - [`CrmError`] and [`ClientError`]: the error taxonomy
//!
//! # Example
//!
//! ```rust,ignore
//! use webcrm::{ApiKey, CrmClient, CrmConfig};
//!
//! let config = CrmConfig::builder()
//!     .tenant("my-tenant")
//!     .login("api-user")
//!     .api_key(ApiKey::new("my-api-key").unwrap())
//!     .build()
//!     .unwrap();
//!
//! let client = CrmClient::new(&config);
//! let types = client.rest_api().get("types", None, None).await?;
//! ```
//!
//! # Error Translation
//!
//! Non-2xx responses are mapped by the `id` field of the error body, e.g.
//! `conflict` becomes [`ClientError::ResourceConflict`]. Responses without
//! a known `id` fall back to their status code.

mod client;
mod errors;
mod http_method;
mod http_response;
mod rest_api;

pub use client::CrmClient;
pub use errors::{ClientError, CrmError, UnmetPrecondition, ValidationError};
pub use http_method::HttpMethod;
pub use http_response::HttpResponse;
pub use rest_api::{Headers, RestApi, SDK_VERSION};
