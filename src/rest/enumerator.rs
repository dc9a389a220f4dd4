//! Lazy, batched access to a list of items by id.
//!
//! An [`ItemEnumerator`] holds an ordered id list and fetches the items
//! through the `mget` endpoint in batches of [`BATCH_SIZE`]. Nothing is
//! fetched until the enumerator is iterated, and every iteration fetches
//! again.
//!
//! Items are yielded in the order of the id list, duplicates included,
//! regardless of the order the server returns them in. If the server omits
//! an id of a batch, iteration fails with
//! [`crate::ClientError::ResourceNotFound`] listing the missing ids.
//!
//! # Example
//!
//! ```rust,ignore
//! use webcrm::ItemEnumerator;
//!
//! let items = client.find_many(["id-1", "id-2"])?;
//! assert_eq!(items.len(), 2);
//!
//! // Pull-style: stops fetching when the loop stops.
//! let mut cursor = items.cursor(&client);
//! while let Some(item) = cursor.next().await? {
//!     println!("{item:?}");
//! }
//!
//! // Push-style.
//! items.each(&client, |item| println!("{item:?}")).await?;
//! ```

use std::collections::HashMap;
use std::fmt;
use std::slice::Chunks;
use std::vec::IntoIter;

use serde_json::{json, Value};

use crate::clients::{CrmClient, CrmError};
use crate::rest::resource::Resource;

/// Maximum number of ids per `mget` request.
pub const BATCH_SIZE: usize = 100;

/// An ordered list of item ids plus the total number of matching items.
#[derive(Clone, PartialEq, Eq, Default)]
pub struct ItemEnumerator {
    ids: Vec<String>,
    total: usize,
}

impl ItemEnumerator {
    /// Creates an enumerator whose total is the number of ids.
    #[must_use]
    pub fn new(ids: Vec<String>) -> Self {
        let total = ids.len();
        Self { ids, total }
    }

    /// Creates an enumerator with an explicit total, e.g. from a search.
    #[must_use]
    pub const fn with_total(ids: Vec<String>, total: usize) -> Self {
        Self { ids, total }
    }

    /// Returns the ids.
    #[must_use]
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    /// Returns the number of ids. Does not touch the network.
    #[must_use]
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    /// Returns `true` if there are no ids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Returns the total number of matching items, which may exceed
    /// [`Self::len`] for a limited search.
    #[must_use]
    pub const fn total(&self) -> usize {
        self.total
    }

    /// Returns a cursor that fetches one batch at a time.
    #[must_use]
    pub fn cursor<'a>(&'a self, client: &'a CrmClient) -> ItemCursor<'a> {
        ItemCursor {
            client,
            batches: self.ids.chunks(BATCH_SIZE),
            buffer: Vec::new().into_iter(),
        }
    }

    /// Calls `f` for every item, in id order.
    ///
    /// # Errors
    ///
    /// Stops at the first failing batch and returns its error.
    pub async fn each<F>(&self, client: &CrmClient, mut f: F) -> Result<(), CrmError>
    where
        F: FnMut(Resource),
    {
        let mut cursor = self.cursor(client);
        while let Some(item) = cursor.next().await? {
            f(item);
        }
        Ok(())
    }

    /// Fetches all items.
    ///
    /// # Errors
    ///
    /// Returns the error of the first failing batch.
    pub async fn to_vec(&self, client: &CrmClient) -> Result<Vec<Resource>, CrmError> {
        let mut items = Vec::with_capacity(self.ids.len());
        self.each(client, |item| items.push(item)).await?;
        Ok(items)
    }

    /// Fetches the first item only; at most one batch is requested.
    ///
    /// # Errors
    ///
    /// Returns the error of the first batch.
    pub async fn first(&self, client: &CrmClient) -> Result<Option<Resource>, CrmError> {
        self.cursor(client).next().await
    }
}

impl fmt::Debug for ItemEnumerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemEnumerator")
            .field("length", &self.ids.len())
            .field("total", &self.total)
            .finish()
    }
}

/// Pull-style iteration over an [`ItemEnumerator`].
///
/// A batch is requested only when the items of the previous one are used
/// up. Dropping the cursor early skips the remaining requests.
pub struct ItemCursor<'a> {
    client: &'a CrmClient,
    batches: Chunks<'a, String>,
    buffer: IntoIter<Resource>,
}

impl ItemCursor<'_> {
    /// Returns the next item, or `None` once every id has been yielded.
    ///
    /// # Errors
    ///
    /// Returns the error of the batch request, including
    /// [`crate::ClientError::ResourceNotFound`] for ids the server omitted.
    pub async fn next(&mut self) -> Result<Option<Resource>, CrmError> {
        loop {
            if let Some(item) = self.buffer.next() {
                return Ok(Some(item));
            }
            let Some(batch) = self.batches.next() else {
                return Ok(None);
            };
            self.buffer = fetch_batch(self.client, batch).await?.into_iter();
        }
    }
}

impl fmt::Debug for ItemCursor<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ItemCursor")
            .field("buffered", &self.buffer.len())
            .field("remaining_batches", &self.batches.len())
            .finish()
    }
}

/// Fetches one batch through `mget` and orders it like `ids`.
async fn fetch_batch(client: &CrmClient, ids: &[String]) -> Result<Vec<Resource>, CrmError> {
    tracing::debug!("fetching batch of {} items", ids.len());
    let body = client
        .rest_api()
        .get("mget", Some(&json!({ "ids": ids })), None)
        .await?;

    let payloads = match body {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => {
            return Err(CrmError::InvalidResponse {
                message: format!("mget returned {other} instead of a list"),
            })
        }
    };

    let mut by_id = HashMap::with_capacity(payloads.len());
    for payload in payloads {
        let item = Resource::from_json(payload)?;
        if let Some(id) = item.id().map(String::from) {
            by_id.insert(id, item);
        }
    }

    let mut missing = Vec::new();
    let mut items = Vec::with_capacity(ids.len());
    for id in ids {
        match by_id.get(id) {
            Some(item) => items.push(item.clone()),
            None => missing.push(id.clone()),
        }
    }

    if missing.is_empty() {
        Ok(items)
    } else {
        Err(CrmError::not_found("Items could not be found.", missing))
    }
}
