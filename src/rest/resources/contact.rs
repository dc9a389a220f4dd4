//! Contact resource.
//!
//! Besides the common capabilities, contacts carry the password management
//! of the WebCRM login:
//!
//! ```rust,ignore
//! use webcrm::Contact;
//!
//! match Contact::authenticate_or_none(&client, "jane@example.com", "secret").await? {
//!     Some(contact) => println!("welcome back {contact:?}"),
//!     None => println!("wrong login or password"),
//! }
//! ```

use serde_json::{json, Value};

use crate::clients::{ClientError, CrmClient, CrmError};
use crate::rest::{
    ChangeLoggable, CrmResource, Findable, MergeAndDeletable, Modifiable, ResourceAction,
    Searchable,
};

crm_resource! {
    /// A person.
    Contact => Contact { id, last_name, first_name, email }
}

impl Findable for Contact {}
impl Modifiable for Contact {}
impl ChangeLoggable for Contact {}
impl MergeAndDeletable for Contact {}
impl Searchable for Contact {}

impl Contact {
    /// Returns the contact matching `login` and `password`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthenticationFailed`] if the credentials do
    /// not match.
    pub async fn authenticate(client: &CrmClient, login: &str, password: &str) -> Result<Self, CrmError> {
        let payload = json!({ "login": login, "password": password });
        let body = ResourceAction::put("authenticate", &payload)
            .send(client, &Self::resource_path())
            .await?;
        Self::from_json(body)
    }

    /// Like [`Contact::authenticate`], but returns `None` for wrong
    /// credentials.
    ///
    /// # Errors
    ///
    /// Propagates every error except a failed authentication.
    pub async fn authenticate_or_none(
        client: &CrmClient,
        login: &str,
        password: &str,
    ) -> Result<Option<Self>, CrmError> {
        match Self::authenticate(client, login, password).await {
            Ok(contact) => Ok(Some(contact)),
            Err(CrmError::Client(ClientError::AuthenticationFailed { .. })) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Sets a new password and reloads the contact.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub async fn set_password(&mut self, client: &CrmClient, new_password: &str) -> Result<&mut Self, CrmError> {
        let payload = json!({ "password": new_password });
        self.perform_action(client, ResourceAction::put("set_password", &payload))
            .await
    }

    /// Generates a token for [`Contact::set_password_by_token`].
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::InvalidResponse`] if the response has no token.
    pub async fn generate_password_token(&self, client: &CrmClient) -> Result<String, CrmError> {
        let payload = json!({});
        let body = ResourceAction::post("generate_password_token", &payload)
            .send(client, &self.instance_path())
            .await?;
        body.get("token")
            .and_then(Value::as_str)
            .map(String::from)
            .ok_or_else(|| CrmError::InvalidResponse {
                message: "password token response without token".to_string(),
            })
    }

    /// Sets the password of the contact a token was generated for.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidValues`] if the token is invalid or
    /// expired.
    pub async fn set_password_by_token(
        client: &CrmClient,
        new_password: &str,
        token: &str,
    ) -> Result<Self, CrmError> {
        let payload = json!({ "password": new_password, "token": token });
        let body = ResourceAction::put("set_password_by_token", &payload)
            .send(client, &Self::resource_path())
            .await?;
        Self::from_json(body)
    }

    /// Removes the password and reloads the contact.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub async fn clear_password(&mut self, client: &CrmClient) -> Result<&mut Self, CrmError> {
        let payload = json!({});
        self.perform_action(client, ResourceAction::put("clear_password", &payload))
            .await
    }

    /// Sends the contact an email containing a password token.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub async fn send_password_token_email(&self, client: &CrmClient) -> Result<Value, CrmError> {
        let payload = json!({});
        ResourceAction::post("send_password_token_email", &payload)
            .send(client, &self.instance_path())
            .await
    }
}
