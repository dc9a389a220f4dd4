//! Raw HTTP responses as received from the API.

use serde_json::Value;

use crate::clients::errors::CrmError;

/// A response before its body has been interpreted.
///
/// The body is kept as text so that a malformed payload can be reported
/// verbatim.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// HTTP status code.
    pub code: u16,
    /// The canonical reason phrase of the status, e.g. `OK`.
    pub reason: &'static str,
    /// Value of the `X-Request-Id` header, if sent.
    pub request_id: Option<String>,
    /// The undecoded body.
    pub body: String,
}

impl HttpResponse {
    /// Returns `true` for 2xx status codes.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Decodes the body as JSON. A blank body decodes as `null`.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::Server`] if the body is not valid JSON.
    pub fn json(&self) -> Result<Value, CrmError> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body).map_err(|_| CrmError::Server {
            message: format!("Server returned invalid json: {}", self.body),
        })
    }

    /// Decodes the body and turns non-2xx responses into errors.
    ///
    /// # Errors
    ///
    /// Returns the error kind selected by [`CrmError::from_error_response`]
    /// for non-2xx responses, or [`CrmError::Server`] for invalid JSON.
    pub fn into_result(self) -> Result<Value, CrmError> {
        let body = self.json()?;
        if self.is_ok() {
            Ok(body)
        } else {
            Err(CrmError::from_error_response(self.code, &body))
        }
    }
}
