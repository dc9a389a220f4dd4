//! Mailing recipient resource.
//!
//! A mailing recipient is identified by its email address and holds the
//! newsletter subscriptions (`topic_names`) and the consent state of that
//! address.

use serde_json::Value;

use crate::clients::{CrmClient, CrmError};
use crate::rest::{member_path, CrmResource};

crm_resource! {
    /// The newsletter subscription state of an email address.
    MailingRecipient => MailingRecipient { id, active, consent, topic_names }
}

impl MailingRecipient {
    /// Fetches the recipient for an email address.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::ResourceNotFound`] without a network
    /// call if `email` is blank.
    pub async fn find(client: &CrmClient, email: &str) -> Result<Self, CrmError> {
        if email.trim().is_empty() {
            return Err(CrmError::not_found(
                "Items could not be found.",
                vec![email.to_string()],
            ));
        }
        let body = client
            .rest_api()
            .get(&member_path(&Self::resource_path(), email), None, None)
            .await?;
        Self::from_json(body)
    }

    /// Updates the recipient, guarded by its current `version`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::ResourceConflict`] on a version
    /// mismatch. Local state is untouched on error.
    pub async fn update(&mut self, client: &CrmClient, attributes: &Value) -> Result<&mut Self, CrmError> {
        let body = client
            .rest_api()
            .put(&self.instance_path(), Some(attributes), Some(&self.if_match_header()))
            .await?;
        self.0.load_attributes(body)?;
        Ok(self)
    }
}
