//! Resource identity, paths and the capability traits.
//!
//! Two layers make up the resource model:
//!
//! - [`Resource`] is the untyped form every multi-get or search result
//!   decodes into. Its [`BaseType`] comes from the `base_type` field of the
//!   payload.
//! - Typed wrappers such as [`crate::Contact`] implement [`CrmResource`]
//!   and opt into capabilities by implementing the marker-style traits
//!   [`Findable`], [`Modifiable`] and [`MergeAndDeletable`] (plus
//!   [`crate::rest::ChangeLoggable`] and [`crate::rest::Searchable`]).
//!   All capability methods have default implementations.
//!
//! Writes follow a reload-after-write pattern: the server's answer replaces
//! the local attribute set wholesale.
//!
//! # Example
//!
//! ```rust,ignore
//! use webcrm::{Contact, Findable, Modifiable};
//! use serde_json::json;
//!
//! let mut contact = Contact::find(&client, "e70a7123f499c5e0e9972ab4dbfb8fe3").await?;
//! contact.update(&client, &json!({"last_name": "Smith"})).await?;
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use serde_json::{json, Value};

use crate::clients::{CrmClient, CrmError, Headers};
use crate::rest::attributes::{AttributeProvider, AttributeValue, Attributes};
use crate::rest::path::{member_path, pluralize, underscore};
use crate::rest::resources::Type;

/// The variant tag selecting which kind of resource a payload describes.
///
/// Unknown tags are kept in [`BaseType::Other`] so that new server-side
/// types still decode.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum BaseType {
    /// An organisation.
    Account,
    /// A task, call, note or ticket.
    Activity,
    /// A stored search.
    Collection,
    /// A person.
    Contact,
    /// An event contacts can register for.
    Event,
    /// The registration of a contact for an event.
    EventContact,
    /// A newsletter.
    Mailing,
    /// A newsletter subscription, identified by email address.
    MailingRecipient,
    /// The singleton holding all templates.
    TemplateSet,
    /// A custom type definition.
    Type,
    /// Any other tag.
    Other(String),
}

impl BaseType {
    /// Returns the tag as sent by the server, e.g. `EventContact`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Account => "Account",
            Self::Activity => "Activity",
            Self::Collection => "Collection",
            Self::Contact => "Contact",
            Self::Event => "Event",
            Self::EventContact => "EventContact",
            Self::Mailing => "Mailing",
            Self::MailingRecipient => "MailingRecipient",
            Self::TemplateSet => "TemplateSet",
            Self::Type => "Type",
            Self::Other(tag) => tag,
        }
    }

    /// Returns the snake_case name, e.g. `event_contact`.
    #[must_use]
    pub fn resource_name(&self) -> String {
        underscore(self.as_str())
    }

    /// Returns the collection path, e.g. `event_contacts`.
    ///
    /// The template set is a singleton and lives at `template_set`.
    #[must_use]
    pub fn resource_path(&self) -> String {
        match self {
            Self::TemplateSet => self.resource_name(),
            _ => pluralize(&self.resource_name()),
        }
    }
}

impl From<&str> for BaseType {
    fn from(tag: &str) -> Self {
        match tag {
            "Account" => Self::Account,
            "Activity" => Self::Activity,
            "Collection" => Self::Collection,
            "Contact" => Self::Contact,
            "Event" => Self::Event,
            "EventContact" => Self::EventContact,
            "Mailing" => Self::Mailing,
            "MailingRecipient" => Self::MailingRecipient,
            "TemplateSet" => Self::TemplateSet,
            "Type" => Self::Type,
            other => Self::Other(other.to_string()),
        }
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An untyped resource.
///
/// Two resources are equal when they have the same [`BaseType`] and the
/// same `id`; the hash is consistent with that, so resources can be used as
/// map keys.
#[derive(Clone)]
pub struct Resource {
    base_type: BaseType,
    attributes: Attributes,
}

impl Resource {
    /// Creates a resource from decoded attributes.
    #[must_use]
    pub const fn new(base_type: BaseType, attributes: Attributes) -> Self {
        Self {
            base_type,
            attributes,
        }
    }

    /// Decodes a payload, taking the variant from its `base_type` field.
    ///
    /// A payload without `base_type` decodes as `BaseType::Other("")`.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::InvalidResponse`] if the payload is not an object.
    pub fn from_json(value: Value) -> Result<Self, CrmError> {
        let base_type = BaseType::from(value.get("base_type").and_then(Value::as_str).unwrap_or(""));
        Ok(Self::new(base_type, Attributes::from_value(value)?))
    }

    /// Returns the variant of this resource.
    #[must_use]
    pub const fn base_type(&self) -> &BaseType {
        &self.base_type
    }

    /// Returns the `id` attribute; `None` before creation.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.attributes.id()
    }

    /// Returns the collection path of this resource's variant.
    #[must_use]
    pub fn resource_path(&self) -> String {
        self.base_type.resource_path()
    }

    /// Returns `resource_path/id`, or `resource_path` when there is no id.
    ///
    /// The template set is always addressed as `template_set`.
    #[must_use]
    pub fn instance_path(&self) -> String {
        let path = self.resource_path();
        match self.id() {
            Some(id) if self.base_type != BaseType::TemplateSet => member_path(&path, id),
            _ => path,
        }
    }

    /// Returns the `If-Match` header carrying the current `version`.
    #[must_use]
    pub fn if_match_header(&self) -> Headers {
        let version = match self.attributes.get("version") {
            Some(AttributeValue::Json(Value::String(s))) => s.clone(),
            Some(AttributeValue::Json(Value::Null)) | None => String::new(),
            Some(other) => other.to_json().to_string(),
        };
        Headers::from([("If-Match".to_string(), version)])
    }

    /// Fetches the current representation and replaces the attributes.
    ///
    /// # Errors
    ///
    /// Propagates transport errors; the attributes are unchanged on error.
    pub async fn reload(&mut self, client: &CrmClient) -> Result<&mut Self, CrmError> {
        let body = client.rest_api().get(&self.instance_path(), None, None).await?;
        self.load_attributes(body)?;
        Ok(self)
    }

    /// Fetches the type definition named by `type_id`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::ResourceNotFound`] without a network
    /// call if `type_id` is missing or blank.
    pub async fn type_(&self, client: &CrmClient) -> Result<Type, CrmError> {
        let type_id = self
            .attribute("type_id")
            .and_then(AttributeValue::as_str)
            .unwrap_or_default();
        Type::find(client, type_id).await
    }

    /// Converts into a typed resource if the variant matches.
    ///
    /// # Errors
    ///
    /// Returns the resource unchanged if its variant is not `T::BASE_TYPE`.
    pub fn into_typed<T: CrmResource>(self) -> Result<T, Self> {
        if self.base_type == T::BASE_TYPE {
            Ok(T::from_resource(self))
        } else {
            Err(self)
        }
    }

    /// Replaces the attributes with a freshly decoded payload.
    pub(crate) fn load_attributes(&mut self, value: Value) -> Result<(), CrmError> {
        self.attributes = Attributes::from_value(value)?;
        Ok(())
    }
}

impl AttributeProvider for Resource {
    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

impl PartialEq for Resource {
    fn eq(&self, other: &Self) -> bool {
        self.base_type == other.base_type && self.id() == other.id()
    }
}

impl Eq for Resource {}

impl Hash for Resource {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.base_type.hash(state);
        self.id().hash(state);
    }
}

impl fmt::Debug for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resource")
            .field("base_type", &self.base_type)
            .field("id", &self.id())
            .finish()
    }
}

/// A typed resource.
///
/// Implementors wrap a [`Resource`] whose variant is [`Self::BASE_TYPE`].
#[allow(async_fn_in_trait)]
pub trait CrmResource: Sized + Send + Sync {
    /// The variant this type represents.
    const BASE_TYPE: BaseType;

    /// Wraps an untyped resource without checking its variant.
    fn from_resource(resource: Resource) -> Self;

    /// Returns the wrapped resource.
    fn as_resource(&self) -> &Resource;

    /// Returns the wrapped resource mutably.
    fn as_resource_mut(&mut self) -> &mut Resource;

    /// Unwraps into the untyped resource.
    fn into_resource(self) -> Resource;

    /// Decodes a payload as this type.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::InvalidResponse`] if the payload is not an object.
    fn from_json(value: Value) -> Result<Self, CrmError> {
        Ok(Self::from_resource(Resource::new(
            Self::BASE_TYPE,
            Attributes::from_value(value)?,
        )))
    }

    /// Returns the collection path of this type.
    fn resource_path() -> String {
        Self::BASE_TYPE.resource_path()
    }

    /// Returns the `id` attribute.
    fn id(&self) -> Option<&str> {
        self.as_resource().id()
    }

    /// Returns the path of this instance.
    fn instance_path(&self) -> String {
        self.as_resource().instance_path()
    }

    /// Returns the `If-Match` header for writes.
    fn if_match_header(&self) -> Headers {
        self.as_resource().if_match_header()
    }

    /// Fetches the current representation and replaces the attributes.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    async fn reload(&mut self, client: &CrmClient) -> Result<&mut Self, CrmError> {
        self.as_resource_mut().reload(client).await?;
        Ok(self)
    }

    /// Fetches the type definition named by `type_id`.
    ///
    /// # Errors
    ///
    /// See [`Resource::type_`].
    async fn type_(&self, client: &CrmClient) -> Result<Type, CrmError> {
        self.as_resource().type_(client).await
    }

    /// Sends a request below this instance's path and replaces the
    /// attributes with the response.
    ///
    /// # Errors
    ///
    /// Propagates transport errors; the attributes are unchanged on error.
    async fn perform_action(
        &mut self,
        client: &CrmClient,
        action: ResourceAction<'_>,
    ) -> Result<&mut Self, CrmError> {
        let body = action.send(client, &self.instance_path()).await?;
        self.as_resource_mut().load_attributes(body)?;
        Ok(self)
    }
}

impl<T: CrmResource> AttributeProvider for T {
    fn attributes(&self) -> &Attributes {
        self.as_resource().attributes()
    }
}

/// A request to a sub-path of a resource, e.g. `contacts/{id}/set_password`.
#[derive(Clone, Copy, Debug)]
pub struct ResourceAction<'a> {
    method: crate::clients::HttpMethod,
    action: &'a str,
    payload: Option<&'a Value>,
}

impl<'a> ResourceAction<'a> {
    /// Creates a PUT action.
    #[must_use]
    pub const fn put(action: &'a str, payload: &'a Value) -> Self {
        Self {
            method: crate::clients::HttpMethod::Put,
            action,
            payload: Some(payload),
        }
    }

    /// Creates a POST action.
    #[must_use]
    pub const fn post(action: &'a str, payload: &'a Value) -> Self {
        Self {
            method: crate::clients::HttpMethod::Post,
            action,
            payload: Some(payload),
        }
    }

    /// Creates a GET action.
    #[must_use]
    pub const fn get(action: &'a str) -> Self {
        Self {
            method: crate::clients::HttpMethod::Get,
            action,
            payload: None,
        }
    }

    /// Sends the action below `base_path`.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub async fn send(&self, client: &CrmClient, base_path: &str) -> Result<Value, CrmError> {
        let path = format!("{base_path}/{}", self.action);
        client
            .rest_api()
            .request(self.method, &path, self.payload, None)
            .await
    }
}

/// Types that can be fetched by id.
#[allow(async_fn_in_trait)]
pub trait Findable: CrmResource {
    /// Fetches a resource by id.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::ResourceNotFound`] without a network
    /// call if `id` is blank; otherwise propagates transport errors.
    async fn find(client: &CrmClient, id: &str) -> Result<Self, CrmError> {
        if id.trim().is_empty() {
            return Err(CrmError::not_found(
                "Items could not be found.",
                vec![id.to_string()],
            ));
        }
        let body = client
            .rest_api()
            .get(&member_path(&Self::resource_path(), id), None, None)
            .await?;
        Self::from_json(body)
    }
}

/// Types that can be created, updated and deleted.
#[allow(async_fn_in_trait)]
pub trait Modifiable: CrmResource {
    /// Creates a resource and returns the server's representation.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::InvalidKeys`] or
    /// [`crate::ClientError::InvalidValues`] for rejected attributes.
    async fn create(client: &CrmClient, attributes: &Value) -> Result<Self, CrmError> {
        let body = client
            .rest_api()
            .post(&Self::resource_path(), Some(attributes), None)
            .await?;
        Self::from_json(body)
    }

    /// Updates the resource, guarded by its current `version`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::ResourceConflict`] if the resource has
    /// been changed since it was loaded. Local state is untouched on error.
    async fn update(&mut self, client: &CrmClient, attributes: &Value) -> Result<&mut Self, CrmError> {
        let body = client
            .rest_api()
            .put(&self.instance_path(), Some(attributes), Some(&self.if_match_header()))
            .await?;
        self.as_resource_mut().load_attributes(body)?;
        Ok(self)
    }

    /// Deletes the resource, guarded by its current `version`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::ResourceConflict`] on a version mismatch.
    async fn delete(self, client: &CrmClient) -> Result<(), CrmError> {
        client
            .rest_api()
            .delete(&self.instance_path(), None, Some(&self.if_match_header()))
            .await?;
        Ok(())
    }
}

/// Types whose items can be merged into another item of the same type.
#[allow(async_fn_in_trait)]
pub trait MergeAndDeletable: CrmResource {
    /// Merges this item into `merge_into_id` and deletes it.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    async fn merge_and_delete(self, client: &CrmClient, merge_into_id: &str) -> Result<(), CrmError> {
        let payload = json!({ "merge_into_id": merge_into_id });
        ResourceAction::post("merge_and_delete", &payload)
            .send(client, &self.instance_path())
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn resource(base_type: BaseType, value: Value) -> Resource {
        Resource::new(base_type, Attributes::from_value(value).unwrap())
    }

    #[test]
    fn test_base_type_round_trips_tags() {
        for tag in ["Account", "Contact", "EventContact", "TemplateSet", "Type"] {
            assert_eq!(BaseType::from(tag).as_str(), tag);
        }
        assert_eq!(BaseType::from("Unicorn"), BaseType::Other("Unicorn".to_string()));
    }

    #[test]
    fn test_resource_paths() {
        assert_eq!(BaseType::Contact.resource_path(), "contacts");
        assert_eq!(BaseType::Activity.resource_path(), "activities");
        assert_eq!(BaseType::EventContact.resource_path(), "event_contacts");
        assert_eq!(BaseType::TemplateSet.resource_path(), "template_set");
        assert_eq!(BaseType::Other("MyItem".into()).resource_path(), "my_items");
    }

    #[test]
    fn test_instance_path_with_and_without_id() {
        let with_id = resource(BaseType::Contact, json!({"id": "abc"}));
        let without_id = resource(BaseType::Contact, json!({}));

        assert_eq!(with_id.instance_path(), "contacts/abc");
        assert_eq!(without_id.instance_path(), "contacts");
    }

    #[test]
    fn test_template_set_is_addressed_without_id() {
        let set = resource(BaseType::TemplateSet, json!({"id": "xyz"}));
        assert_eq!(set.instance_path(), "template_set");
    }

    #[test]
    fn test_from_json_dispatches_on_base_type() {
        let r = Resource::from_json(json!({"id": "1", "base_type": "Account"})).unwrap();
        assert_eq!(r.base_type(), &BaseType::Account);

        let unknown = Resource::from_json(json!({"id": "2"})).unwrap();
        assert_eq!(unknown.base_type(), &BaseType::Other(String::new()));
    }

    #[test]
    fn test_equality_uses_variant_and_id() {
        let a = resource(BaseType::Contact, json!({"id": "1", "name": "a"}));
        let b = resource(BaseType::Contact, json!({"id": "1", "name": "b"}));
        let other_id = resource(BaseType::Contact, json!({"id": "2"}));
        let other_type = resource(BaseType::Account, json!({"id": "1"}));

        assert_eq!(a, b);
        assert_ne!(a, other_id);
        assert_ne!(a, other_type);
    }

    #[test]
    fn test_resources_are_interchangeable_as_set_members() {
        let mut set = HashSet::new();
        set.insert(resource(BaseType::Contact, json!({"id": "1", "v": 1})));
        set.insert(resource(BaseType::Contact, json!({"id": "1", "v": 2})));
        set.insert(resource(BaseType::Account, json!({"id": "1"})));

        assert_eq!(set.len(), 2);
        assert!(set.contains(&resource(BaseType::Contact, json!({"id": "1"}))));
    }

    #[test]
    fn test_if_match_header_carries_version() {
        let r = resource(BaseType::Contact, json!({"id": "1", "version": 7}));
        assert_eq!(r.if_match_header().get("If-Match").map(String::as_str), Some("7"));

        let r = resource(BaseType::Contact, json!({"id": "1", "version": "v3"}));
        assert_eq!(r.if_match_header().get("If-Match").map(String::as_str), Some("v3"));
    }

    #[test]
    fn test_debug_shows_type_and_id() {
        let r = resource(BaseType::Contact, json!({"id": "abc"}));
        assert_eq!(format!("{r:?}"), r#"Resource { base_type: Contact, id: Some("abc") }"#);
    }
}
