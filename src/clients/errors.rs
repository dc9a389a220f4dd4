//! Error types raised by WebCRM API operations.
//!
//! Every fallible operation of the SDK returns [`CrmError`]. Failures caused
//! by client-supplied input (HTTP 4xx) are grouped under
//! [`CrmError::Client`] so callers can match on the whole family at once.
//!
//! # Example
//!
//! ```rust,ignore
//! use webcrm::{ClientError, CrmError, Contact, Findable};
//!
//! match Contact::find(&client, "e70a7123f499c5e0e9972ab4dbfb8fe3").await {
//!     Ok(contact) => println!("Found {:?}", contact),
//!     Err(CrmError::Client(ClientError::ResourceNotFound { missing_ids, .. })) => {
//!         println!("Missing: {missing_ids:?}");
//!     }
//!     Err(CrmError::Network { message, .. }) => println!("Network down: {message}"),
//!     Err(e) => println!("Other error: {e}"),
//! }
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::error::ConfigError;

/// A single validation error reported for a create or update request.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationError {
    /// The attribute the error refers to.
    #[serde(default)]
    pub attribute: Option<String>,
    /// Machine readable error code, e.g. `unknown` or `blank`.
    #[serde(default)]
    pub code: String,
    /// English description of the error.
    #[serde(default)]
    pub message: String,
}

/// A precondition that was not satisfied by the item's current state.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnmetPrecondition {
    /// Name of the precondition, e.g. `is_internal_mailing`.
    #[serde(default)]
    pub code: String,
    /// English description of the precondition.
    #[serde(default)]
    pub message: String,
}

/// Errors caused by client-supplied input.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ClientError {
    /// The API user credentials are invalid.
    #[error("{message}")]
    UnauthorizedAccess {
        /// Server message.
        message: String,
    },

    /// The credentials passed to contact authentication are invalid.
    #[error("{message}")]
    AuthenticationFailed {
        /// Server message.
        message: String,
    },

    /// The API user is not permitted to access the resource.
    #[error("{message}")]
    ForbiddenAccess {
        /// Server message.
        message: String,
    },

    /// One or more of the requested IDs could not be found.
    #[error("{message} Missing IDs: {}", to_sentence(.missing_ids))]
    ResourceNotFound {
        /// Server message.
        message: String,
        /// The IDs that could not be found.
        missing_ids: Vec<String>,
    },

    /// The item is in a state that does not allow the requested action.
    #[error("{}", precondition_message(.message, .unmet_preconditions))]
    ItemStatePreconditionFailed {
        /// Server message.
        message: String,
        /// The preconditions that were not met.
        unmet_preconditions: Vec<UnmetPrecondition>,
    },

    /// The item has been changed concurrently.
    #[error("{message}")]
    ResourceConflict {
        /// Server message.
        message: String,
    },

    /// A create or update request contained unknown attributes.
    #[error("{message} {}.", validation_sentence(.validation_errors))]
    InvalidKeys {
        /// Server message.
        message: String,
        /// One entry per unknown attribute.
        validation_errors: Vec<ValidationError>,
    },

    /// A create or update request contained invalid values.
    #[error("{message} {}.", validation_sentence(.validation_errors))]
    InvalidValues {
        /// Server message.
        message: String,
        /// One entry per invalid value.
        validation_errors: Vec<ValidationError>,
    },

    /// Too many requests were issued within a given time frame.
    #[error("{message}")]
    RateLimitExceeded {
        /// Server message.
        message: String,
    },

    /// More than 1000 keys were passed to a create or update request.
    #[error("{message}")]
    TooManyParams {
        /// Server message.
        message: String,
    },

    /// Any other 4xx response.
    #[error("{message}")]
    Other {
        /// Status code and response body.
        message: String,
    },
}

/// The base error type of the SDK.
#[derive(Debug, Error)]
pub enum CrmError {
    /// A transport-level failure, e.g. a refused connection or a timeout.
    #[error("{message}")]
    Network {
        /// Description of the failure.
        message: String,
        /// The underlying transport error.
        #[source]
        source: reqwest::Error,
    },

    /// The server failed, or answered with something that is not JSON.
    #[error("{message}")]
    Server {
        /// Description of the failure.
        message: String,
    },

    /// The request was rejected because of client-supplied input.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// The client configuration is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A path or URL could not be resolved against the endpoint.
    #[error("Invalid path: {path}")]
    InvalidPath {
        /// The path that failed to resolve.
        path: String,
    },

    /// The server answered with JSON of an unexpected shape.
    #[error("Unexpected response: {message}")]
    InvalidResponse {
        /// Description of what was expected.
        message: String,
    },
}

impl CrmError {
    /// Creates a [`ClientError::ResourceNotFound`] error.
    #[must_use]
    pub fn not_found(message: impl Into<String>, missing_ids: Vec<String>) -> Self {
        Self::Client(ClientError::ResourceNotFound {
            message: message.into(),
            missing_ids,
        })
    }

    /// Returns `true` for [`ClientError::ResourceNotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::Client(ClientError::ResourceNotFound { .. }))
    }

    /// Returns the missing IDs of a [`ClientError::ResourceNotFound`] error.
    #[must_use]
    pub fn missing_ids(&self) -> Option<&[String]> {
        match self {
            Self::Client(ClientError::ResourceNotFound { missing_ids, .. }) => Some(missing_ids),
            _ => None,
        }
    }

    /// Translates a non-2xx response into the matching error kind.
    ///
    /// The `id` field of the body selects the kind. Bodies without a known
    /// `id` fall back to the status code.
    #[must_use]
    pub fn from_error_response(code: u16, body: &Value) -> Self {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let client_error = match body.get("id").and_then(Value::as_str) {
            Some("unauthorized") => ClientError::UnauthorizedAccess { message },
            Some("authentication_failed") => ClientError::AuthenticationFailed { message },
            Some("forbidden") => ClientError::ForbiddenAccess { message },
            Some("not_found") => ClientError::ResourceNotFound {
                message,
                missing_ids: list_field(body, "missing_ids"),
            },
            Some("item_state_precondition_failed") => ClientError::ItemStatePreconditionFailed {
                message,
                unmet_preconditions: list_field(body, "unmet_preconditions"),
            },
            Some("conflict") => ClientError::ResourceConflict { message },
            Some("invalid_keys") => ClientError::InvalidKeys {
                message,
                validation_errors: list_field(body, "validation_errors"),
            },
            Some("invalid_values") => ClientError::InvalidValues {
                message,
                validation_errors: list_field(body, "validation_errors"),
            },
            Some("rate_limit") => ClientError::RateLimitExceeded { message },
            Some("internal_server_error") => return Self::Server { message },
            Some("too_many_params") => ClientError::TooManyParams { message },
            _ if code == 404 => ClientError::ResourceNotFound {
                message: "Not Found.".to_string(),
                missing_ids: Vec::new(),
            },
            _ if (400..500).contains(&code) => ClientError::Other {
                message: format!("HTTP Code {code}: {body}"),
            },
            _ => {
                return Self::Server {
                    message: format!("HTTP Code {code}: {body}"),
                }
            }
        };

        Self::Client(client_error)
    }
}

fn list_field<T: serde::de::DeserializeOwned>(body: &Value, key: &str) -> Vec<T> {
    body.get(key)
        .cloned()
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

/// Joins words the way English prose does: `a`, `a and b`, `a, b, and c`.
fn to_sentence<S: AsRef<str>>(words: &[S]) -> String {
    match words {
        [] => String::new(),
        [one] => one.as_ref().to_string(),
        [first, second] => format!("{} and {}", first.as_ref(), second.as_ref()),
        [init @ .., last] => {
            let head: Vec<&str> = init.iter().map(AsRef::as_ref).collect();
            format!("{}, and {}", head.join(", "), last.as_ref())
        }
    }
}

fn validation_sentence(errors: &[ValidationError]) -> String {
    let messages: Vec<&str> = errors.iter().map(|e| e.message.as_str()).collect();
    to_sentence(&messages)
}

fn precondition_message(message: &str, preconditions: &[UnmetPrecondition]) -> String {
    std::iter::once(message)
        .chain(preconditions.iter().map(|p| p.message.as_str()))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_to_sentence() {
        assert_eq!(to_sentence::<&str>(&[]), "");
        assert_eq!(to_sentence(&["a"]), "a");
        assert_eq!(to_sentence(&["a", "b"]), "a and b");
        assert_eq!(to_sentence(&["a", "b", "c"]), "a, b, and c");
    }

    #[test]
    fn test_resource_not_found_message_lists_missing_ids() {
        let error = CrmError::not_found("Items could not be found.", vec!["x".into(), "y".into()]);
        assert_eq!(error.to_string(), "Items could not be found. Missing IDs: x and y");
        assert!(error.is_not_found());
        assert_eq!(error.missing_ids(), Some(&["x".to_string(), "y".to_string()][..]));
    }

    #[test]
    fn test_not_found_id_carries_missing_ids() {
        let body = json!({"id": "not_found", "message": "Not found.", "missing_ids": ["abc"]});
        let error = CrmError::from_error_response(404, &body);
        assert_eq!(error.missing_ids(), Some(&["abc".to_string()][..]));
    }

    #[test]
    fn test_item_state_precondition_message_joins_preconditions() {
        let body = json!({
            "id": "item_state_precondition_failed",
            "message": "Precondition failed.",
            "unmet_preconditions": [
                {"code": "is_internal_mailing", "message": "The mailing is not internal."},
                {"code": "is_released", "message": "The mailing is not released."}
            ]
        });
        let error = CrmError::from_error_response(428, &body);
        assert_eq!(
            error.to_string(),
            "Precondition failed. The mailing is not internal. The mailing is not released."
        );
    }

    #[test]
    fn test_invalid_keys_message() {
        let body = json!({
            "id": "invalid_keys",
            "message": "Unknown keys.",
            "validation_errors": [
                {"attribute": "foo", "code": "unknown", "message": "foo is unknown"},
                {"attribute": "bar", "code": "unknown", "message": "bar is unknown"}
            ]
        });
        let error = CrmError::from_error_response(400, &body);
        assert_eq!(error.to_string(), "Unknown keys. foo is unknown and bar is unknown.");
        match error {
            CrmError::Client(ClientError::InvalidKeys {
                validation_errors, ..
            }) => assert_eq!(validation_errors[0].attribute.as_deref(), Some("foo")),
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_error_ids_map_to_kinds() {
        let cases = [
            ("unauthorized", 401),
            ("authentication_failed", 401),
            ("forbidden", 403),
            ("conflict", 412),
            ("invalid_values", 400),
            ("rate_limit", 429),
            ("too_many_params", 400),
        ];
        for (id, code) in cases {
            let error = CrmError::from_error_response(code, &json!({"id": id, "message": "m"}));
            let matched = match (&error, id) {
                (CrmError::Client(ClientError::UnauthorizedAccess { .. }), "unauthorized")
                | (CrmError::Client(ClientError::AuthenticationFailed { .. }), "authentication_failed")
                | (CrmError::Client(ClientError::ForbiddenAccess { .. }), "forbidden")
                | (CrmError::Client(ClientError::ResourceConflict { .. }), "conflict")
                | (CrmError::Client(ClientError::InvalidValues { .. }), "invalid_values")
                | (CrmError::Client(ClientError::RateLimitExceeded { .. }), "rate_limit")
                | (CrmError::Client(ClientError::TooManyParams { .. }), "too_many_params") => true,
                _ => false,
            };
            assert!(matched, "{id} mapped to {error:?}");
        }
    }

    #[test]
    fn test_internal_server_error_id_is_server_error() {
        let error = CrmError::from_error_response(
            500,
            &json!({"id": "internal_server_error", "message": "boom"}),
        );
        assert!(matches!(error, CrmError::Server { ref message } if message == "boom"));
    }

    #[test]
    fn test_unknown_404_is_not_found() {
        let error = CrmError::from_error_response(404, &json!({}));
        assert_eq!(error.to_string(), "Not Found. Missing IDs: ");
        assert!(error.is_not_found());
    }

    #[test]
    fn test_unknown_4xx_is_generic_client_error() {
        let error = CrmError::from_error_response(418, &json!({"foo": "bar"}));
        match error {
            CrmError::Client(ClientError::Other { message }) => {
                assert!(message.starts_with("HTTP Code 418: "));
                assert!(message.contains("\"foo\""));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_unknown_5xx_is_server_error() {
        let error = CrmError::from_error_response(502, &Value::Null);
        assert!(matches!(error, CrmError::Server { ref message } if message == "HTTP Code 502: null"));
    }
}
