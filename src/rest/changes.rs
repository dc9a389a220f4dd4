//! Change history of resources.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::clients::{CrmClient, CrmError};
use crate::rest::resource::CrmResource;

/// Number of changes returned when no limit is given.
pub const DEFAULT_CHANGES_LIMIT: usize = 10;

/// One entry of a resource's change log.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct Change {
    /// When the change was made.
    #[serde(default)]
    pub changed_at: Option<DateTime<Utc>>,
    /// Login of the API user or contact who made the change.
    #[serde(default)]
    pub changed_by: Option<String>,
    /// Changed attributes, keyed by attribute name.
    #[serde(default)]
    pub details: HashMap<String, ChangeDetail>,
}

/// The values of one attribute before and after a change.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChangeDetail {
    /// The previous value.
    #[serde(default)]
    pub before: Value,
    /// The new value.
    #[serde(default)]
    pub after: Value,
}

#[derive(Deserialize)]
struct ChangesPage {
    #[serde(default)]
    results: Vec<Change>,
}

/// Types that keep a change log.
#[allow(async_fn_in_trait)]
pub trait ChangeLoggable: CrmResource {
    /// Returns the most recent changes, newest first.
    ///
    /// `limit` defaults to [`DEFAULT_CHANGES_LIMIT`].
    ///
    /// # Errors
    ///
    /// Propagates transport errors; returns [`CrmError::InvalidResponse`]
    /// for a malformed change log.
    async fn changes(&self, client: &CrmClient, limit: Option<usize>) -> Result<Vec<Change>, CrmError> {
        let payload = json!({ "limit": limit.unwrap_or(DEFAULT_CHANGES_LIMIT) });
        let path = format!("{}/changes", self.instance_path());
        let body = client.rest_api().get(&path, Some(&payload), None).await?;
        let page: ChangesPage =
            serde_json::from_value(body).map_err(|e| CrmError::InvalidResponse {
                message: format!("change log: {e}"),
            })?;
        Ok(page.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_change_decodes_details() {
        let change: Change = serde_json::from_value(json!({
            "changed_at": "2014-11-26T15:17:39Z",
            "changed_by": "john_smith",
            "details": {
                "email": {"before": "john@example.org", "after": "john@example.com"}
            }
        }))
        .unwrap();

        assert_eq!(change.changed_by.as_deref(), Some("john_smith"));
        assert_eq!(change.changed_at.unwrap().to_rfc3339(), "2014-11-26T15:17:39+00:00");
        assert_eq!(change.details["email"].after, json!("john@example.com"));
    }

    #[test]
    fn test_change_tolerates_missing_fields() {
        let change: Change = serde_json::from_value(json!({})).unwrap();
        assert!(change.details.is_empty());
        assert!(change.changed_at.is_none());
    }
}
