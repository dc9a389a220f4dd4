//! Template set resource.
//!
//! There is exactly one template set per tenant. It is loaded with
//! [`TemplateSet::singleton`] and always lives at `template_set`.

use serde_json::{json, Value};

use crate::clients::{CrmClient, CrmError};
use crate::rest::{ChangeLoggable, CrmResource, ResourceAction};

crm_resource! {
    /// The templates used for emails and password pages.
    TemplateSet => TemplateSet { id }
}

impl ChangeLoggable for TemplateSet {}

impl TemplateSet {
    /// Fetches the template set.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub async fn singleton(client: &CrmClient) -> Result<Self, CrmError> {
        let body = client.rest_api().get(&Self::resource_path(), None, None).await?;
        Self::from_json(body)
    }

    /// Updates templates, guarded by the current `version`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::ResourceConflict`] on a version
    /// mismatch.
    pub async fn update(&mut self, client: &CrmClient, attributes: &Value) -> Result<&mut Self, CrmError> {
        let body = client
            .rest_api()
            .put(&self.instance_path(), Some(attributes), Some(&self.if_match_header()))
            .await?;
        self.0.load_attributes(body)?;
        Ok(self)
    }

    /// Renders `templates` with `context` without saving them.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub async fn render_preview(
        &self,
        client: &CrmClient,
        templates: &Value,
        context: &Value,
    ) -> Result<Value, CrmError> {
        let payload = json!({ "templates": templates, "context": context });
        ResourceAction::post("render_preview", &payload)
            .send(client, &self.instance_path())
            .await
    }
}
