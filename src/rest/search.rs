//! Search configuration and paginated search.
//!
//! The server answers at most [`SERVER_LIMIT`] ids per search request.
//! [`search`] requests consecutive pages until the client's limit is
//! satisfied or no more matching items remain, then returns an
//! [`ItemEnumerator`] over the collected ids.
//!
//! [`SearchConfigurator`] builds the parameters fluently. Each builder
//! method returns a new configurator and leaves the original untouched.
//! The search itself runs at most once per configurator.
//!
//! # Example
//!
//! ```rust,ignore
//! use serde_json::Value;
//! use webcrm::{Contact, Searchable};
//!
//! let contacts = Contact::where_("last_name", "equals", "Smith")
//!     .and_not("email", "is_blank", Value::Null)
//!     .sort_by("created_at")
//!     .desc()
//!     .limit(20);
//!
//! for contact in contacts.to_vec(&client).await? {
//!     println!("{contact:?}");
//! }
//! println!("{} matches in total", contacts.total(&client).await?);
//! ```

use std::sync::Arc;

use serde::Deserialize;
use serde_json::{json, Map, Value};
use tokio::sync::OnceCell;

use crate::clients::{CrmClient, CrmError};
use crate::rest::enumerator::ItemEnumerator;
use crate::rest::resource::{CrmResource, Resource};

/// Maximum number of ids the server returns per search request.
pub const SERVER_LIMIT: usize = 100;

/// A single search condition. All filters of a search must match.
#[derive(Clone, Debug, PartialEq)]
pub struct Filter {
    /// The attribute to test.
    pub field: String,
    /// The condition, e.g. `equals`, `contains_word_prefixes` or `is_blank`.
    pub condition: String,
    /// The operand; `null` for conditions without one.
    pub value: Value,
}

impl Filter {
    /// Creates a filter.
    #[must_use]
    pub fn new(field: impl Into<String>, condition: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            condition: condition.into(),
            value: value.into(),
        }
    }

    /// Creates a filter whose condition is negated with the `not_` prefix.
    #[must_use]
    pub fn negated(field: impl Into<String>, condition: &str, value: impl Into<Value>) -> Self {
        Self::new(field, format!("not_{condition}"), value)
    }

    fn to_json(&self) -> Value {
        json!({
            "field": self.field,
            "condition": self.condition,
            "value": self.value,
        })
    }
}

/// How many results a search should return.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Limit {
    /// At most this many results.
    Count(usize),
    /// All matching results.
    #[default]
    Unlimited,
}

impl From<usize> for Limit {
    fn from(count: usize) -> Self {
        Self::Count(count)
    }
}

/// Sort direction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SortOrder {
    /// Ascending.
    Asc,
    /// Descending.
    Desc,
}

impl SortOrder {
    /// Returns the wire name, `asc` or `desc`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

/// The parameters of a search.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchSettings {
    /// Conditions that must all match.
    pub filters: Vec<Filter>,
    /// Free-text query.
    pub query: Option<String>,
    /// Maximum number of results.
    pub limit: Limit,
    /// Number of matching items to skip.
    pub offset: usize,
    /// Attribute to sort by.
    pub sort_by: Option<String>,
    /// Sort direction.
    pub sort_order: Option<SortOrder>,
}

impl SearchSettings {
    fn page_params(&self, limit: usize, offset: usize) -> Value {
        let mut params = Map::new();
        if !self.filters.is_empty() {
            params.insert(
                "filters".to_string(),
                Value::Array(self.filters.iter().map(Filter::to_json).collect()),
            );
        }
        if let Some(query) = &self.query {
            params.insert("query".to_string(), json!(query));
        }
        params.insert("limit".to_string(), json!(limit));
        params.insert("offset".to_string(), json!(offset));
        if let Some(sort_by) = &self.sort_by {
            params.insert("sort_by".to_string(), json!(sort_by));
        }
        if let Some(sort_order) = self.sort_order {
            params.insert("sort_order".to_string(), json!(sort_order.as_str()));
        }
        Value::Object(params)
    }
}

#[derive(Debug, Deserialize)]
struct SearchPage {
    #[serde(default)]
    results: Vec<SearchHit>,
    #[serde(default)]
    total: usize,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    id: String,
}

/// Runs a search, requesting as many pages as needed.
///
/// Requests pages of at most [`SERVER_LIMIT`] ids until either the limit
/// is reached or the ids beyond the initial offset are exhausted. The
/// `total` of the first page is taken as a snapshot for the whole search.
/// A limit of zero returns an empty enumerator without any request.
///
/// # Errors
///
/// Propagates transport errors; returns [`CrmError::InvalidResponse`] if a
/// page does not have the expected shape.
pub async fn search(client: &CrmClient, settings: &SearchSettings) -> Result<ItemEnumerator, CrmError> {
    if settings.limit == Limit::Count(0) {
        return Ok(ItemEnumerator::default());
    }

    let mut remaining = settings.limit;
    let mut offset = settings.offset;
    let mut ids: Vec<String> = Vec::new();
    let mut total: Option<usize> = None;

    loop {
        let page_limit = match remaining {
            Limit::Count(n) => n.min(SERVER_LIMIT),
            Limit::Unlimited => SERVER_LIMIT,
        };
        let params = settings.page_params(page_limit, offset);
        let body = client.rest_api().post("search", Some(&params), None).await?;
        let page: SearchPage = serde_json::from_value(body).map_err(|e| CrmError::InvalidResponse {
            message: format!("search page: {e}"),
        })?;

        let returned = page.results.len();
        ids.extend(page.results.into_iter().map(|hit| hit.id));
        let snapshot = *total.get_or_insert(page.total);

        let available = snapshot.saturating_sub(settings.offset);
        let wanted = match settings.limit {
            Limit::Count(n) => n.min(available),
            Limit::Unlimited => available,
        };
        if ids.len() >= wanted || returned == 0 {
            break;
        }

        remaining = match remaining {
            Limit::Count(n) if n <= SERVER_LIMIT => break,
            Limit::Count(n) => Limit::Count(n - SERVER_LIMIT),
            Limit::Unlimited => Limit::Unlimited,
        };
        offset += SERVER_LIMIT;
    }

    tracing::debug!("search collected {} ids", ids.len());
    Ok(ItemEnumerator::with_total(ids, total.unwrap_or_default()))
}

/// Fluent, immutable builder for searches.
///
/// Cloning a configurator shares its memoized result.
#[derive(Clone, Debug, Default)]
pub struct SearchConfigurator {
    settings: SearchSettings,
    result: Arc<OnceCell<ItemEnumerator>>,
}

impl SearchConfigurator {
    /// Creates a configurator without filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a configurator from existing settings.
    #[must_use]
    pub fn from_settings(settings: SearchSettings) -> Self {
        Self {
            settings,
            result: Arc::default(),
        }
    }

    /// Returns the current settings.
    #[must_use]
    pub const fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    fn with(&self, change: impl FnOnce(&mut SearchSettings)) -> Self {
        let mut settings = self.settings.clone();
        change(&mut settings);
        Self::from_settings(settings)
    }

    /// Adds a filter.
    #[must_use]
    pub fn add_filter(
        &self,
        field: impl Into<String>,
        condition: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        let filter = Filter::new(field, condition, value);
        self.with(|s| s.filters.push(filter))
    }

    /// Alias for [`Self::add_filter`].
    #[must_use]
    pub fn and(
        &self,
        field: impl Into<String>,
        condition: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        self.add_filter(field, condition, value)
    }

    /// Adds a filter with the negated condition (`not_` prefix).
    #[must_use]
    pub fn add_negated_filter(&self, field: impl Into<String>, condition: &str, value: impl Into<Value>) -> Self {
        let filter = Filter::negated(field, condition, value);
        self.with(|s| s.filters.push(filter))
    }

    /// Alias for [`Self::add_negated_filter`].
    #[must_use]
    pub fn and_not(&self, field: impl Into<String>, condition: &str, value: impl Into<Value>) -> Self {
        self.add_negated_filter(field, condition, value)
    }

    /// Sets the free-text query.
    #[must_use]
    pub fn query(&self, query: impl Into<String>) -> Self {
        let query = query.into();
        self.with(|s| s.query = Some(query))
    }

    /// Limits the number of results.
    #[must_use]
    pub fn limit(&self, limit: usize) -> Self {
        self.with(|s| s.limit = Limit::Count(limit))
    }

    /// Removes the limit.
    #[must_use]
    pub fn unlimited(&self) -> Self {
        self.with(|s| s.limit = Limit::Unlimited)
    }

    /// Skips the first `offset` matching items.
    #[must_use]
    pub fn offset(&self, offset: usize) -> Self {
        self.with(|s| s.offset = offset)
    }

    /// Sorts by an attribute.
    #[must_use]
    pub fn sort_by(&self, attribute: impl Into<String>) -> Self {
        let attribute = attribute.into();
        self.with(|s| s.sort_by = Some(attribute))
    }

    /// Sets the sort direction.
    #[must_use]
    pub fn sort_order(&self, order: SortOrder) -> Self {
        self.with(|s| s.sort_order = Some(order))
    }

    /// Sorts ascending.
    #[must_use]
    pub fn asc(&self) -> Self {
        self.sort_order(SortOrder::Asc)
    }

    /// Sorts descending.
    #[must_use]
    pub fn desc(&self) -> Self {
        self.sort_order(SortOrder::Desc)
    }

    /// Runs the search, or returns the result of an earlier run.
    ///
    /// # Errors
    ///
    /// See [`search`]. A failed search is not memoized.
    pub async fn perform_search(&self, client: &CrmClient) -> Result<&ItemEnumerator, CrmError> {
        self.result
            .get_or_try_init(|| search(client, &self.settings))
            .await
    }

    /// Calls `f` for every found item.
    ///
    /// # Errors
    ///
    /// Propagates search and fetch errors.
    pub async fn each<F>(&self, client: &CrmClient, f: F) -> Result<(), CrmError>
    where
        F: FnMut(Resource),
    {
        self.perform_search(client).await?.each(client, f).await
    }

    /// Fetches all found items.
    ///
    /// # Errors
    ///
    /// Propagates search and fetch errors.
    pub async fn to_vec(&self, client: &CrmClient) -> Result<Vec<Resource>, CrmError> {
        self.perform_search(client).await?.to_vec(client).await
    }

    /// Fetches at most `n` items.
    ///
    /// # Errors
    ///
    /// Propagates search and fetch errors.
    pub async fn take(&self, client: &CrmClient, n: usize) -> Result<Vec<Resource>, CrmError> {
        self.limit(n).to_vec(client).await
    }

    /// Fetches the first found item.
    ///
    /// # Errors
    ///
    /// Propagates search and fetch errors.
    pub async fn first(&self, client: &CrmClient) -> Result<Option<Resource>, CrmError> {
        let limited = self.limit(1);
        let found = limited.perform_search(client).await?;
        found.first(client).await
    }

    /// Returns the total number of matching items.
    ///
    /// # Errors
    ///
    /// Propagates search errors.
    pub async fn total(&self, client: &CrmClient) -> Result<usize, CrmError> {
        Ok(self.perform_search(client).await?.total())
    }
}

/// Types that can be searched for.
///
/// Every search is scoped to the type with a `base_type equals` filter.
#[allow(async_fn_in_trait)]
pub trait Searchable: CrmResource {
    /// Returns a configurator scoped to this type.
    #[must_use]
    fn search_configurator() -> SearchConfigurator {
        SearchConfigurator::new().add_filter("base_type", "equals", Self::BASE_TYPE.as_str())
    }

    /// Returns the oldest item of this type.
    ///
    /// # Errors
    ///
    /// Propagates search and fetch errors.
    async fn first(client: &CrmClient) -> Result<Option<Self>, CrmError> {
        let found = Self::search_configurator()
            .sort_by("created_at")
            .first(client)
            .await?;
        Ok(found.map(Self::from_resource))
    }

    /// Returns all items of this type, oldest first.
    ///
    /// # Errors
    ///
    /// Propagates search errors.
    async fn all(client: &CrmClient) -> Result<ItemEnumerator, CrmError> {
        Self::search_configurator()
            .sort_by("created_at")
            .unlimited()
            .perform_search(client)
            .await
            .cloned()
    }

    /// Starts a search with one filter.
    #[must_use]
    fn where_(field: impl Into<String>, condition: impl Into<String>, value: impl Into<Value>) -> SearchConfigurator {
        Self::search_configurator().and(field, condition, value)
    }

    /// Starts a search with one negated filter.
    #[must_use]
    fn where_not(field: impl Into<String>, condition: &str, value: impl Into<Value>) -> SearchConfigurator {
        Self::search_configurator().and_not(field, condition, value)
    }

    /// Starts a search with a free-text query.
    #[must_use]
    fn query(query: impl Into<String>) -> SearchConfigurator {
        Self::search_configurator().query(query)
    }
}
