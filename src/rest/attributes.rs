//! Decoded attribute sets and the two-tier attribute accessor.
//!
//! Every resource is backed by an [`Attributes`] value built once from the
//! JSON object the server returned. The set is never edited in place: a
//! reload or write replaces it wholesale.
//!
//! # Timestamps
//!
//! Keys ending in `_at` are decoded into [`DateTime<Utc>`]. When a value
//! cannot be parsed the decoded attribute is `null`, and the original value
//! stays available through [`Attributes::raw`].
//!
//! # References
//!
//! [`AttributeProvider::resolve`] looks up a name in this order:
//!
//! 1. the literal attribute `name`
//! 2. `name_id`, fetched as a single item
//! 3. `singular(name)_ids`, fetched as a list of items
//!
//! A literal attribute always wins over a reference with the same name.
//! Reference lookups are not memoized; each call fetches again.
//!
//! # Example
//!
//! ```rust,ignore
//! use webcrm::rest::Resolved;
//! use webcrm::{Activity, AttributeProvider, Findable};
//!
//! let activity = Activity::find(&client, "abc").await?;
//! if let Some(Resolved::Items(contacts)) = activity.resolve(&client, "contacts").await? {
//!     for contact in contacts.to_vec(&client).await? {
//!         println!("{:?}", contact.attribute("email"));
//!     }
//! }
//! ```

use std::collections::HashMap;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_json::{Map, Value};

use crate::clients::{CrmClient, CrmError};
use crate::rest::enumerator::ItemEnumerator;
use crate::rest::path::singularize;
use crate::rest::resource::{Findable, Resource};
use crate::rest::resources::Type;

const TIMESTAMP_SUFFIX: &str = "_at";

/// A decoded attribute value.
#[derive(Clone, Debug, PartialEq)]
pub enum AttributeValue {
    /// Any JSON value, including `null`.
    Json(Value),
    /// A parsed timestamp attribute.
    Timestamp(DateTime<Utc>),
}

impl AttributeValue {
    /// Returns the JSON value, or `None` for timestamps.
    #[must_use]
    pub const fn as_json(&self) -> Option<&Value> {
        match self {
            Self::Json(value) => Some(value),
            Self::Timestamp(_) => None,
        }
    }

    /// Returns the string value, if this is a JSON string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        self.as_json().and_then(Value::as_str)
    }

    /// Returns the integer value, if this is a JSON integer.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        self.as_json().and_then(Value::as_i64)
    }

    /// Returns the boolean value, if this is a JSON boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        self.as_json().and_then(Value::as_bool)
    }

    /// Returns the timestamp, if this is a decoded timestamp.
    #[must_use]
    pub const fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Timestamp(t) => Some(*t),
            Self::Json(_) => None,
        }
    }

    /// Returns `true` for JSON `null`.
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Json(Value::Null))
    }

    /// Converts the value back to JSON. Timestamps become RFC 3339 strings.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Json(value) => value.clone(),
            Self::Timestamp(t) => Value::String(t.to_rfc3339()),
        }
    }
}

impl From<Value> for AttributeValue {
    fn from(value: Value) -> Self {
        Self::Json(value)
    }
}

/// An immutable set of decoded attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Attributes {
    values: HashMap<String, AttributeValue>,
    raw: HashMap<String, AttributeValue>,
}

impl Attributes {
    /// Decodes a JSON object.
    #[must_use]
    pub fn from_map(map: Map<String, Value>) -> Self {
        let mut values = HashMap::with_capacity(map.len());
        let mut raw = HashMap::new();

        for (key, value) in map {
            if key.ends_with(TIMESTAMP_SUFFIX) {
                let decoded = parse_timestamp(&value)
                    .map_or(AttributeValue::Json(Value::Null), AttributeValue::Timestamp);
                raw.insert(key.clone(), AttributeValue::Json(value));
                values.insert(key, decoded);
            } else {
                values.insert(key, AttributeValue::Json(value));
            }
        }

        Self { values, raw }
    }

    /// Decodes a JSON value that must be an object. `null` yields an empty set.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::InvalidResponse`] for any other kind of value.
    pub fn from_value(value: Value) -> Result<Self, CrmError> {
        match value {
            Value::Object(map) => Ok(Self::from_map(map)),
            Value::Null => Ok(Self::default()),
            other => Err(CrmError::InvalidResponse {
                message: format!("expected a JSON object, got {other}"),
            }),
        }
    }

    /// Returns the decoded value of an attribute.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttributeValue> {
        self.values.get(name)
    }

    /// Returns the undecoded value of an attribute.
    ///
    /// Falls back to the decoded value for attributes that were not
    /// transformed while decoding.
    #[must_use]
    pub fn raw(&self, name: &str) -> Option<&AttributeValue> {
        self.raw.get(name).or_else(|| self.values.get(name))
    }

    /// Returns `true` if the attribute is present, even when `null`.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Returns all decoded attributes.
    #[must_use]
    pub const fn all(&self) -> &HashMap<String, AttributeValue> {
        &self.values
    }

    /// Returns the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Returns the `id` attribute as a string.
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        self.get("id").and_then(AttributeValue::as_str)
    }
}

fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?.trim();
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Some(t.with_timezone(&Utc));
    }
    if let Ok(t) = DateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S %z") {
        return Some(t.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
}

/// The outcome of [`AttributeProvider::resolve`].
#[derive(Debug)]
pub enum Resolved {
    /// A literal attribute.
    Attribute(AttributeValue),
    /// The item referenced by a `name_id` attribute.
    Item(Resource),
    /// The items referenced by a `name_ids` attribute.
    Items(ItemEnumerator),
    /// The type definition referenced by `type_id`.
    Type(Type),
}

/// Read access to the attributes of a resource.
#[allow(async_fn_in_trait)]
pub trait AttributeProvider {
    /// Returns the backing attribute set.
    fn attributes(&self) -> &Attributes;

    /// Returns the decoded value of an attribute, `None` if unknown.
    fn attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes().get(name)
    }

    /// Returns the undecoded value of an attribute.
    fn raw_attribute(&self, name: &str) -> Option<&AttributeValue> {
        self.attributes().raw(name)
    }

    /// Returns all decoded attributes.
    fn all_attributes(&self) -> &HashMap<String, AttributeValue> {
        self.attributes().all()
    }

    /// Resolves a name to a literal attribute or a referenced item.
    ///
    /// The literal attribute wins. Otherwise `name_id` is fetched through
    /// [`CrmClient::find`], and `singular(name)_ids` becomes an
    /// [`ItemEnumerator`]. A `null` reference resolves to `None`.
    ///
    /// `type` is the exception: `type_id` is fetched from
    /// `types/{type_id}` as a [`Type`].
    ///
    /// # Errors
    ///
    /// Propagates errors from fetching a `name_id` reference. An empty
    /// `name_ids` list is reported as [`crate::ClientError::ResourceNotFound`]
    /// like [`CrmClient::find_many`].
    async fn resolve(&self, client: &CrmClient, name: &str) -> Result<Option<Resolved>, CrmError> {
        let attributes = self.attributes();

        if let Some(value) = attributes.get(name) {
            return Ok(Some(Resolved::Attribute(value.clone())));
        }

        if let Some(reference) = attributes.get(&format!("{name}_id")) {
            return match reference.as_str() {
                Some(id) if name == "type" => Ok(Some(Resolved::Type(Type::find(client, id).await?))),
                Some(id) => Ok(Some(Resolved::Item(client.find(id).await?))),
                None => Ok(None),
            };
        }

        if let Some(references) = attributes.get(&format!("{}_ids", singularize(name))) {
            let ids = references
                .as_json()
                .and_then(Value::as_array)
                .map(|ids| {
                    ids.iter()
                        .filter_map(Value::as_str)
                        .map(String::from)
                        .collect::<Vec<_>>()
                });
            return match ids {
                Some(ids) => Ok(Some(Resolved::Items(client.find_many(ids)?))),
                None => Ok(None),
            };
        }

        Ok(None)
    }
}

impl AttributeProvider for Attributes {
    fn attributes(&self) -> &Attributes {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn decode(value: Value) -> Attributes {
        Attributes::from_value(value).unwrap()
    }

    #[test]
    fn test_empty_set_returns_none_for_unknown_keys() {
        let attributes = Attributes::default();
        assert!(attributes.attribute("unknown_key").is_none());
        assert!(attributes.all_attributes().is_empty());
    }

    #[test]
    fn test_plain_values_round_trip() {
        let attributes = decode(json!({
            "foo": "bar",
            "blub": 2342,
            "bla": null,
            "my_hash": {"abc": "xyz"}
        }));

        assert_eq!(attributes.attribute("foo").and_then(AttributeValue::as_str), Some("bar"));
        assert_eq!(attributes.attribute("blub").and_then(AttributeValue::as_i64), Some(2342));
        assert!(attributes.attribute("bla").unwrap().is_null());
        assert_eq!(
            attributes.attribute("my_hash").unwrap().to_json(),
            json!({"abc": "xyz"})
        );
        assert_eq!(attributes.len(), 4);
    }

    #[test]
    fn test_timestamps_are_decoded_to_utc() {
        let attributes = decode(json!({
            "started_at": "2014-11-10T10:34:00Z",
            "updated_at": "2014-11-10T11:34:00+01:00"
        }));
        let expected = Utc.with_ymd_and_hms(2014, 11, 10, 10, 34, 0).unwrap();

        assert_eq!(attributes.attribute("started_at").unwrap().as_timestamp(), Some(expected));
        assert_eq!(attributes.attribute("updated_at").unwrap().as_timestamp(), Some(expected));
    }

    #[test]
    fn test_unparseable_timestamps_are_null_with_raw_value() {
        let attributes = decode(json!({
            "deleted_at": null,
            "located_at": "This is not a date, but ends with _at"
        }));

        assert!(attributes.attribute("located_at").unwrap().is_null());
        assert!(attributes.attribute("deleted_at").unwrap().is_null());
        assert_eq!(
            attributes.raw_attribute("located_at").and_then(AttributeValue::as_str),
            Some("This is not a date, but ends with _at")
        );
        assert!(attributes.raw_attribute("deleted_at").unwrap().is_null());
    }

    #[test]
    fn test_raw_returns_original_timestamp_string() {
        let attributes = decode(json!({"started_at": "2014-11-10T10:34:00Z"}));
        assert_eq!(
            attributes.raw_attribute("started_at").and_then(AttributeValue::as_str),
            Some("2014-11-10T10:34:00Z")
        );
    }

    #[test]
    fn test_raw_falls_back_to_decoded_value() {
        let attributes = decode(json!({"foo": "bar"}));
        assert_eq!(attributes.raw_attribute("foo").and_then(AttributeValue::as_str), Some("bar"));
        assert!(attributes.raw_attribute("unknown").is_none());
    }

    #[test]
    fn test_naive_timestamps_are_read_as_utc() {
        let attributes = decode(json!({"created_at": "2014-11-10 10:34:00"}));
        let expected = Utc.with_ymd_and_hms(2014, 11, 10, 10, 34, 0).unwrap();
        assert_eq!(attributes.attribute("created_at").unwrap().as_timestamp(), Some(expected));
    }

    #[test]
    fn test_from_value_rejects_non_objects() {
        assert!(Attributes::from_value(json!([1, 2])).is_err());
        assert!(Attributes::from_value(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_id_accessor() {
        assert_eq!(decode(json!({"id": "abc"})).id(), Some("abc"));
        assert_eq!(decode(json!({})).id(), None);
    }
}
