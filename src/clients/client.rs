//! The context object every API operation runs against.

use crate::clients::errors::CrmError;
use crate::clients::rest_api::RestApi;
use crate::config::CrmConfig;
use crate::rest::{search, ItemEnumerator, Resource, SearchSettings};

/// A configured connection to one WebCRM tenant.
///
/// All operations of the SDK take a `&CrmClient` as their first argument;
/// there is no global state. Create the client once and share it.
///
/// # Thread Safety
///
/// `CrmClient` is `Send + Sync`. Wrap it in an `Arc` to share it between
/// tasks.
///
/// # Example
///
/// ```rust,ignore
/// use webcrm::{ApiKey, CrmClient, CrmConfig};
///
/// let config = CrmConfig::builder()
///     .tenant("my-tenant")
///     .login("api-user")
///     .api_key(ApiKey::new("my-api-key")?)
///     .build()?;
/// let client = CrmClient::new(&config);
///
/// let item = client.find("e70a7123f499c5e0e9972ab4dbfb8fe3").await?;
/// ```
#[derive(Debug)]
pub struct CrmClient {
    api: RestApi,
}

// Verify CrmClient is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<CrmClient>();
};

impl CrmClient {
    /// Creates a client for the given configuration.
    #[must_use]
    pub fn new(config: &CrmConfig) -> Self {
        Self {
            api: RestApi::new(config),
        }
    }

    /// Returns the transport.
    #[must_use]
    pub const fn rest_api(&self) -> &RestApi {
        &self.api
    }

    /// Fetches a single item of any type.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::ResourceNotFound`] without a network
    /// call if `id` is blank, or if the server does not know the id.
    pub async fn find(&self, id: &str) -> Result<Resource, CrmError> {
        if id.trim().is_empty() {
            return Err(CrmError::not_found(
                "Items could not be found.",
                vec![id.to_string()],
            ));
        }
        ItemEnumerator::new(vec![id.to_string()])
            .first(self)
            .await?
            .ok_or_else(|| CrmError::not_found("Items could not be found.", vec![id.to_string()]))
    }

    /// Returns a lazy enumerator over items of any type.
    ///
    /// Nothing is fetched until the enumerator is iterated.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::ResourceNotFound`] with an empty id list
    /// if `ids` is empty.
    pub fn find_many<I, S>(&self, ids: I) -> Result<ItemEnumerator, CrmError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ids: Vec<String> = ids.into_iter().map(Into::into).collect();
        if ids.is_empty() {
            return Err(CrmError::not_found("Items could not be found.", Vec::new()));
        }
        Ok(ItemEnumerator::new(ids))
    }

    /// Searches items of all types.
    ///
    /// # Errors
    ///
    /// See [`crate::rest::search`].
    pub async fn search(&self, settings: &SearchSettings) -> Result<ItemEnumerator, CrmError> {
        search::search(self, settings).await
    }
}
