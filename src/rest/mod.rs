//! Resource model, batched fetching and search for the WebCRM API.
//!
//! This module provides:
//!
//! - **[`Attributes`] and [`AttributeProvider`]**: decoded, immutable
//!   attribute sets with timestamp parsing and reference resolution
//! - **[`Resource`] and [`CrmResource`]**: untyped and typed resources with
//!   identity, paths and reload
//! - **Capability traits**: [`Findable`], [`Modifiable`],
//!   [`ChangeLoggable`], [`MergeAndDeletable`] and [`Searchable`]
//! - **[`ItemEnumerator`]**: lazy, order-preserving multi-get in batches of 100
//! - **[`SearchConfigurator`] and [`search()`]**: immutable search building
//!   and paginated execution
//! - **[`resources`]**: the typed resources (Contact, Account, ...)
//!
//! # Example
//!
//! ```rust,ignore
//! use webcrm::rest::{AttributeProvider, Searchable};
//! use webcrm::Contact;
//!
//! let smiths = Contact::where_("last_name", "equals", "Smith").limit(10);
//! let found = smiths.perform_search(&client).await?;
//! println!("{} of {} Smiths", found.len(), found.total());
//!
//! for contact in found.to_vec(&client).await? {
//!     println!("{:?}", contact.attribute("email"));
//! }
//! ```

mod attributes;
mod changes;
mod enumerator;
mod path;
mod resource;
pub mod resources;
pub mod search;

pub use attributes::{AttributeProvider, AttributeValue, Attributes, Resolved};
pub use changes::{Change, ChangeDetail, ChangeLoggable, DEFAULT_CHANGES_LIMIT};
pub use enumerator::{ItemCursor, ItemEnumerator, BATCH_SIZE};
pub use path::{member_path, pluralize, singularize, underscore};
pub use resource::{
    BaseType, CrmResource, Findable, MergeAndDeletable, Modifiable, Resource, ResourceAction,
};
pub use search::{
    search, Filter, Limit, SearchConfigurator, SearchSettings, Searchable, SortOrder,
    SERVER_LIMIT,
};
