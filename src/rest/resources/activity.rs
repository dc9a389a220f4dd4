//! Activity resource and its comments.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::attachments;
use crate::clients::{CrmClient, CrmError};
use crate::rest::{
    AttributeProvider, AttributeValue, Attributes, ChangeLoggable, Findable, Modifiable, Searchable,
};

crm_resource! {
    /// A task, call, note or ticket, usually attached to contacts and
    /// accounts.
    ///
    /// New comments are added by updating the activity with `comment_notes`
    /// and, optionally, `comment_attachments` holding ids returned by
    /// [`crate::attachments::upload`].
    Activity => Activity { id, title, type_id }
}

impl Findable for Activity {}
impl Modifiable for Activity {}
impl ChangeLoggable for Activity {}
impl Searchable for Activity {}

impl Activity {
    /// Returns the comments, oldest first.
    ///
    /// Entries of the `comments` attribute that are not objects are skipped.
    #[must_use]
    pub fn comments(&self) -> Vec<Comment> {
        self.attribute("comments")
            .and_then(AttributeValue::as_json)
            .and_then(Value::as_array)
            .map(|comments| {
                comments
                    .iter()
                    .filter_map(|comment| comment.as_object().cloned())
                    .map(|comment| Comment {
                        attributes: Attributes::from_map(comment),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

/// A comment on an [`Activity`].
#[derive(Clone, Debug, PartialEq)]
pub struct Comment {
    attributes: Attributes,
}

impl Comment {
    /// Returns the text of the comment.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.attribute("notes").and_then(AttributeValue::as_str)
    }

    /// Returns `true` if the comment is visible to the contacts of the
    /// activity.
    #[must_use]
    pub fn is_published(&self) -> bool {
        self.attribute("published")
            .and_then(AttributeValue::as_bool)
            .unwrap_or(false)
    }

    /// Returns the id of the contact or API user who wrote the comment.
    #[must_use]
    pub fn created_by(&self) -> Option<&str> {
        self.attribute("created_by").and_then(AttributeValue::as_str)
    }

    /// Returns when the comment was written.
    #[must_use]
    pub fn created_at(&self) -> Option<DateTime<Utc>> {
        self.attribute("created_at").and_then(AttributeValue::as_timestamp)
    }

    /// Returns when the comment was last changed.
    #[must_use]
    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.attribute("updated_at").and_then(AttributeValue::as_timestamp)
    }

    /// Returns the files attached to the comment.
    #[must_use]
    pub fn attachments(&self) -> Vec<CommentAttachment> {
        self.attribute("attachments")
            .and_then(AttributeValue::as_json)
            .and_then(Value::as_array)
            .map(|ids| {
                ids.iter()
                    .filter_map(Value::as_str)
                    .map(|id| CommentAttachment { id: id.to_string() })
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl AttributeProvider for Comment {
    fn attributes(&self) -> &Attributes {
        &self.attributes
    }
}

/// A file attached to a [`Comment`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CommentAttachment {
    id: String,
}

impl CommentAttachment {
    /// Returns the attachment id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns a short-lived URL the file can be downloaded from.
    ///
    /// # Errors
    ///
    /// Propagates transport errors.
    pub async fn download_url(&self, client: &CrmClient) -> Result<String, CrmError> {
        attachments::generate_download_url(client, &self.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rest::CrmResource;
    use serde_json::json;

    fn activity() -> Activity {
        Activity::from_json(json!({
            "id": "act-1",
            "title": "Call back",
            "type_id": "support-case",
            "comments": [
                {
                    "notes": "Called, no answer.",
                    "published": false,
                    "created_by": "api-user",
                    "created_at": "2014-11-26T10:45:08Z",
                    "attachments": []
                },
                {
                    "notes": "Sent the invoice.",
                    "published": true,
                    "created_at": "2014-11-27T08:00:00Z",
                    "attachments": ["perm-1/invoice.pdf", "perm-2/terms.pdf"]
                }
            ]
        }))
        .unwrap()
    }

    #[test]
    fn test_comments_are_decoded_in_order() {
        let comments = activity().comments();

        assert_eq!(comments.len(), 2);
        assert_eq!(comments[0].notes(), Some("Called, no answer."));
        assert!(!comments[0].is_published());
        assert_eq!(comments[0].created_by(), Some("api-user"));
        assert!(comments[1].is_published());
    }

    #[test]
    fn test_comment_timestamps_are_decoded() {
        let comments = activity().comments();
        let created_at = comments[0].created_at().unwrap();

        assert_eq!(created_at.to_rfc3339(), "2014-11-26T10:45:08+00:00");
        assert_eq!(comments[0].updated_at(), None);
    }

    #[test]
    fn test_comment_attachments_keep_ids() {
        let comments = activity().comments();
        let ids: Vec<String> = comments[1]
            .attachments()
            .iter()
            .map(|a| a.id().to_string())
            .collect();

        assert!(comments[0].attachments().is_empty());
        assert_eq!(ids, ["perm-1/invoice.pdf", "perm-2/terms.pdf"]);
    }

    #[test]
    fn test_activity_without_comments() {
        let activity = Activity::from_json(json!({"id": "act-2"})).unwrap();
        assert!(activity.comments().is_empty());
    }

    #[test]
    fn test_debug_lists_title_and_type() {
        assert_eq!(
            format!("{:?}", activity()),
            r#"Activity { id: "act-1", title: "Call back", type_id: "support-case" }"#
        );
    }
}
