//! Collection resource.
//!
//! A collection is a stored search. Its output is computed on the server
//! and read back as a list of ids.

use serde_json::{json, Value};

use crate::clients::{CrmClient, CrmError};
use crate::rest::{
    ChangeLoggable, CrmResource, Findable, ItemEnumerator, Modifiable, ResourceAction, Searchable,
};

crm_resource! {
    /// A stored search over items of any type.
    Collection => Collection { id, title }
}

impl Findable for Collection {}
impl Modifiable for Collection {}
impl ChangeLoggable for Collection {}
impl Searchable for Collection {}

impl Collection {
    /// Recomputes the output and reloads the collection.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub async fn compute(&mut self, client: &CrmClient) -> Result<&mut Self, CrmError> {
        let payload = json!({});
        self.perform_action(client, ResourceAction::put("compute", &payload))
            .await
    }

    /// Returns the ids of the last computed output.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::InvalidResponse`] if the server does not answer
    /// with a list of ids.
    pub async fn output_ids(&self, client: &CrmClient) -> Result<Vec<String>, CrmError> {
        let body = ResourceAction::get("output_ids")
            .send(client, &self.instance_path())
            .await?;
        match body {
            Value::Array(ids) => Ok(ids
                .into_iter()
                .filter_map(|id| id.as_str().map(String::from))
                .collect()),
            Value::Null => Ok(Vec::new()),
            other => Err(CrmError::InvalidResponse {
                message: format!("expected a list of ids, got {other}"),
            }),
        }
    }

    /// Returns a lazy enumerator over the last computed output.
    ///
    /// # Errors
    ///
    /// See [`Collection::output_ids`].
    pub async fn output_items(&self, client: &CrmClient) -> Result<ItemEnumerator, CrmError> {
        Ok(ItemEnumerator::new(self.output_ids(client).await?))
    }
}
