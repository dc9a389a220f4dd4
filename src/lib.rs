//! # WebCRM Rust SDK
//!
//! A Rust SDK for the JustRelate WebCRM REST API, providing type-safe
//! configuration, typed resources, lazy batched fetching and paginated
//! search.
//!
//! ## Overview
//!
//! This SDK provides:
//! - Type-safe configuration via [`CrmConfig`] and [`CrmConfigBuilder`]
//! - A [`CrmClient`] context object carrying the configured transport
//! - Typed resources ([`Contact`], [`Account`], [`Activity`], ...) with
//!   find, create, update, delete, change log and merge capabilities
//! - [`ItemEnumerator`] for lazy, order-preserving multi-get of any items
//! - [`SearchConfigurator`] for building searches fluently
//! - File uploads through the [`attachments`] store
//! - Typed errors mirroring the API's error ids
//!
//! ## Quick Start
//!
//! ```rust
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
//! assert_eq!(
//!     client.rest_api().endpoint().as_str(),
//!     "https://my-tenant.crm.infopark.net/api2/"
//! );
//! ```
//!
//! ## Working With Resources
//!
//! ```rust,ignore
//! use webcrm::{AttributeProvider, Contact, Findable, Modifiable};
//! use serde_json::json;
//!
//! let mut contact = Contact::create(&client, &json!({
//!     "last_name": "Smith",
//!     "language": "en",
//! }))
//! .await?;
//!
//! contact.update(&client, &json!({"first_name": "Jane"})).await?;
//! println!("{:?}", contact.attribute("first_name"));
//!
//! // Any item, whatever its type
//! let item = client.find("e70a7123f499c5e0e9972ab4dbfb8fe3").await?;
//! println!("{} {:?}", item.base_type(), item.id());
//! ```
//!
//! ## Searching
//!
//! ```rust,ignore
//! use webcrm::{Contact, Searchable};
//!
//! let search = Contact::where_("last_name", "equals", "Smith")
//!     .sort_by("updated_at")
//!     .desc()
//!     .limit(250);
//!
//! let found = search.perform_search(&client).await?;
//! println!("{} of {} contacts", found.len(), found.total());
//!
//! let mut cursor = found.cursor(&client);
//! while let Some(contact) = cursor.next().await? {
//!     println!("{contact:?}");
//! }
//! ```
//!
//! ## Logging
//!
//! Requests and responses are logged through [`tracing`]: the method, path
//! and status at `info`, bodies at `debug` with password fields masked.
//!
//! ## Design Principles
//!
//! - **No global state**: every operation takes a [`CrmClient`] explicitly
//! - **Fail-fast validation**: configuration is validated on build
//! - **Thread-safe**: the client is `Send + Sync`
//! - **Async-first**: designed for use with the Tokio runtime
//! - **Reload after write**: the server's answer replaces local attributes

pub mod attachments;
pub mod clients;
pub mod config;
pub mod error;
pub mod rest;

// Re-export public types at crate root for convenience
pub use config::{ApiKey, CrmConfig, CrmConfigBuilder, EndpointUri};
pub use error::ConfigError;

// Re-export client types
pub use clients::{ClientError, CrmClient, CrmError, HttpMethod, RestApi};

// Re-export the resource model
pub use rest::resources::{
    Account, Activity, Collection, Comment, CommentAttachment, Contact, Event, EventContact,
    Mailing, MailingRecipient, TemplateSet, Type,
};
pub use rest::{
    AttributeProvider, AttributeValue, BaseType, ChangeLoggable, CrmResource, Findable,
    ItemEnumerator, MergeAndDeletable, Modifiable, Resource, SearchConfigurator, Searchable,
};
