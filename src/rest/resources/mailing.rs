//! Mailing resource.

use serde_json::{json, Value};

use crate::clients::{CrmClient, CrmError};
use crate::rest::{
    ChangeLoggable, CrmResource, Findable, Modifiable, ResourceAction, Searchable,
};

crm_resource! {
    /// A newsletter sent to the contacts of a collection.
    Mailing => Mailing { id, title }
}

impl Findable for Mailing {}
impl Modifiable for Mailing {}
impl ChangeLoggable for Mailing {}
impl Searchable for Mailing {}

impl Mailing {
    /// Renders the mailing as `contact_id` would receive it.
    ///
    /// Returns the rendered parts as sent by the server, e.g. `email_from`,
    /// `email_subject`, `text_body` and `html_body`.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub async fn render_preview(&self, client: &CrmClient, contact_id: &str) -> Result<Value, CrmError> {
        let payload = json!({ "render_for_contact_id": contact_id });
        ResourceAction::post("render_preview", &payload)
            .send(client, &self.instance_path())
            .await
    }

    /// Sends a proof email rendered for `contact_id` to the API user.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub async fn send_me_a_proof_email(&self, client: &CrmClient, contact_id: &str) -> Result<Value, CrmError> {
        let payload = json!({ "render_for_contact_id": contact_id });
        ResourceAction::post("send_me_a_proof_email", &payload)
            .send(client, &self.instance_path())
            .await
    }

    /// Sends the mailing to a single contact.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::ItemStatePreconditionFailed`] if the
    /// mailing has not been released yet.
    pub async fn send_single_email(&self, client: &CrmClient, recipient_contact_id: &str) -> Result<Value, CrmError> {
        let payload = json!({ "recipient_contact_id": recipient_contact_id });
        ResourceAction::post("send_single_email", &payload)
            .send(client, &self.instance_path())
            .await
    }

    /// Releases the mailing for delivery and reloads it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::ItemStatePreconditionFailed`] if the
    /// mailing cannot be released, e.g. because it has no collection.
    pub async fn release(&mut self, client: &CrmClient) -> Result<&mut Self, CrmError> {
        let payload = json!({});
        self.perform_action(client, ResourceAction::post("release", &payload))
            .await
    }
}
