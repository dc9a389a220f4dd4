//! Type resource.
//!
//! Types describe the base type of an item and its custom attributes.
//! Types are addressed by name, e.g. `contact` or `support-case`.

use serde_json::Value;

use crate::clients::{CrmClient, CrmError};
use crate::rest::{ChangeLoggable, CrmResource, Findable, Modifiable};

crm_resource! {
    /// A type definition.
    Type => Type { id, item_base_type }
}

impl Findable for Type {}
impl Modifiable for Type {}
impl ChangeLoggable for Type {}

impl Type {
    /// Fetches all types.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::InvalidResponse`] if the response is not a list
    /// of objects.
    pub async fn all(client: &CrmClient) -> Result<Vec<Self>, CrmError> {
        match client.rest_api().get(&Self::resource_path(), None, None).await? {
            Value::Array(items) => items.into_iter().map(Self::from_json).collect(),
            Value::Null => Ok(Vec::new()),
            other => Err(CrmError::InvalidResponse {
                message: format!("expected a list of types, got {other}"),
            }),
        }
    }
}
