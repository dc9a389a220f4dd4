//! Transport for the WebCRM REST API.
//!
//! [`RestApi`] sends JSON requests with basic authentication and turns the
//! responses into either decoded JSON or a typed [`CrmError`]. Every other
//! part of the SDK talks to the server through it.
//!
//! # Retry Behavior
//!
//! A request that fails at the network level (refused connection, timeout,
//! reset) is sent once more if its method is idempotent. POST requests are
//! never repeated. HTTP error statuses are never retried.

use std::collections::HashMap;
use std::time::Instant;

use reqwest::header::{ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::Url;
use serde_json::Value;

use crate::clients::errors::CrmError;
use crate::clients::http_method::HttpMethod;
use crate::clients::http_response::HttpResponse;
use crate::config::{ApiKey, CrmConfig, EndpointUri};

/// SDK version from Cargo.toml.
pub const SDK_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Replacement for the values of password fields in debug logs.
const FILTERED: &str = "[FILTERED]";

/// Extra request headers, e.g. `If-Match`.
pub type Headers = HashMap<String, String>;

/// Low-level client for the WebCRM REST API.
///
/// # Thread Safety
///
/// `RestApi` is `Send + Sync`; one instance can serve concurrent tasks.
///
/// # Example
///
/// ```rust,ignore
/// use webcrm::clients::RestApi;
/// use serde_json::json;
///
/// let api = RestApi::new(&config);
/// let contact = api.get("contacts/e70a7123f499c5e0e9972ab4dbfb8fe3", None, None).await?;
/// let created = api.post("contacts", Some(&json!({"last_name": "Smith"})), None).await?;
/// ```
#[derive(Debug)]
pub struct RestApi {
    client: reqwest::Client,
    endpoint: EndpointUri,
    login: String,
    api_key: ApiKey,
    user_agent: String,
}

// Verify RestApi is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<RestApi>();
};

impl RestApi {
    /// Creates a transport for the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the underlying reqwest client cannot be created. This should
    /// only happen in extremely unusual circumstances (e.g., TLS initialization failure).
    #[must_use]
    pub fn new(config: &CrmConfig) -> Self {
        let user_agent = config.user_agent_prefix().map_or_else(
            || format!("webcrm-sdk-{SDK_VERSION}"),
            |prefix| format!("{prefix} | webcrm-sdk-{SDK_VERSION}"),
        );

        let client = reqwest::Client::builder()
            .use_rustls_tls()
            .timeout(config.timeout())
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            endpoint: config.endpoint_uri().clone(),
            login: config.login().to_string(),
            api_key: config.api_key().clone(),
            user_agent,
        }
    }

    /// Returns the endpoint all paths are resolved against.
    #[must_use]
    pub const fn endpoint(&self) -> &EndpointUri {
        &self.endpoint
    }

    /// Returns the User-Agent sent with every request.
    #[must_use]
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// Sends a GET request.
    ///
    /// # Errors
    ///
    /// See [`RestApi::request`].
    pub async fn get(
        &self,
        path: &str,
        payload: Option<&Value>,
        headers: Option<&Headers>,
    ) -> Result<Value, CrmError> {
        self.request(HttpMethod::Get, path, payload, headers).await
    }

    /// Sends a POST request. POST requests are never retried.
    ///
    /// # Errors
    ///
    /// See [`RestApi::request`].
    pub async fn post(
        &self,
        path: &str,
        payload: Option<&Value>,
        headers: Option<&Headers>,
    ) -> Result<Value, CrmError> {
        self.request(HttpMethod::Post, path, payload, headers).await
    }

    /// Sends a PUT request.
    ///
    /// # Errors
    ///
    /// See [`RestApi::request`].
    pub async fn put(
        &self,
        path: &str,
        payload: Option<&Value>,
        headers: Option<&Headers>,
    ) -> Result<Value, CrmError> {
        self.request(HttpMethod::Put, path, payload, headers).await
    }

    /// Sends a DELETE request.
    ///
    /// # Errors
    ///
    /// See [`RestApi::request`].
    pub async fn delete(
        &self,
        path: &str,
        payload: Option<&Value>,
        headers: Option<&Headers>,
    ) -> Result<Value, CrmError> {
        self.request(HttpMethod::Delete, path, payload, headers).await
    }

    /// Sends a request and decodes the JSON response.
    ///
    /// The payload is only sent when it is present and not blank (`null`,
    /// `{}`, `[]` and `""` are blank).
    ///
    /// # Errors
    ///
    /// - [`CrmError::InvalidPath`] if `path` cannot be joined to the endpoint
    /// - [`CrmError::Network`] if the transport failed (after the single
    ///   retry for idempotent methods)
    /// - [`CrmError::Server`] for 5xx responses or bodies that are not JSON
    /// - [`CrmError::Client`] for 4xx responses
    pub async fn request(
        &self,
        method: HttpMethod,
        path: &str,
        payload: Option<&Value>,
        headers: Option<&Headers>,
    ) -> Result<Value, CrmError> {
        let url = self.resolve_uri(path)?;
        let payload = payload.filter(|p| is_present(p));
        let body = payload.map(Value::to_string);

        tracing::info!("{method} {path}");
        if let Some(payload) = payload {
            tracing::debug!("  request body: {}", filter_passwords(payload));
        }

        let started = Instant::now();
        let mut retried = false;
        let response = loop {
            match self.send(method, &url, body.as_deref(), headers).await {
                Ok(response) => break response,
                Err(e) if method.is_idempotent() && !retried => {
                    tracing::warn!("  {method} {path} failed ({e}), retrying once");
                    retried = true;
                }
                Err(e) => {
                    return Err(CrmError::Network {
                        message: e.to_string(),
                        source: e,
                    })
                }
            }
        };

        tracing::info!(
            "  {} {} {} (total: {:.1}ms)",
            response.code,
            response.reason,
            response.body.len(),
            started.elapsed().as_secs_f64() * 1000.0
        );
        if let Some(request_id) = &response.request_id {
            tracing::debug!("  request id: {request_id}");
        }

        let result = response.into_result();
        if let Ok(body) = &result {
            tracing::debug!("  response body: {}", filter_passwords(body));
        }
        result
    }

    /// Resolves a path or URL against the endpoint.
    ///
    /// Relative paths are joined below the endpoint, absolute URLs are
    /// returned unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`CrmError::InvalidPath`] if the URL cannot be parsed.
    pub fn resolve_uri(&self, url: &str) -> Result<Url, CrmError> {
        self.endpoint
            .url()
            .join(url)
            .map_err(|_| CrmError::InvalidPath {
                path: url.to_string(),
            })
    }

    pub(crate) const fn http(&self) -> &reqwest::Client {
        &self.client
    }

    async fn send(
        &self,
        method: HttpMethod,
        url: &Url,
        body: Option<&str>,
        headers: Option<&Headers>,
    ) -> Result<HttpResponse, reqwest::Error> {
        let mut builder = self
            .client
            .request(method.as_reqwest(), url.clone())
            .basic_auth(&self.login, Some(self.api_key.as_ref()))
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(USER_AGENT, &self.user_agent);

        if let Some(headers) = headers {
            for (key, value) in headers {
                builder = builder.header(key.as_str(), value.as_str());
            }
        }

        if let Some(body) = body {
            builder = builder.body(body.to_string());
        }

        let res = builder.send().await?;
        let status = res.status();
        let request_id = res
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body = res.text().await?;

        Ok(HttpResponse {
            code: status.as_u16(),
            reason: status.canonical_reason().unwrap_or_default(),
            request_id,
            body,
        })
    }
}

/// Returns `false` for `null`, empty objects, empty arrays and empty strings.
fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::String(s) => !s.trim().is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Masks every value whose key contains `password`.
fn filter_passwords(value: &Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(key, v)| {
                    let filtered = if key.to_lowercase().contains("password") {
                        Value::String(FILTERED.to_string())
                    } else {
                        filter_passwords(v)
                    };
                    (key.clone(), filtered)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(filter_passwords).collect()),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(endpoint: &str) -> CrmConfig {
        CrmConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .login("login")
            .endpoint(endpoint)
            .build()
            .unwrap()
    }

    #[test]
    fn test_blank_payloads_are_not_present() {
        assert!(!is_present(&Value::Null));
        assert!(!is_present(&json!({})));
        assert!(!is_present(&json!([])));
        assert!(!is_present(&json!("")));
        assert!(is_present(&json!({"a": 1})));
        assert!(is_present(&json!(false)));
    }

    #[test]
    fn test_filter_passwords_masks_nested_keys() {
        let filtered = filter_passwords(&json!({
            "login": "jane",
            "password": "secret",
            "nested": [{"new_password": "other"}]
        }));

        assert_eq!(
            filtered,
            json!({
                "login": "jane",
                "password": "[FILTERED]",
                "nested": [{"new_password": "[FILTERED]"}]
            })
        );
    }

    #[test]
    fn test_resolve_uri_relative_and_absolute() {
        let api = RestApi::new(&config("https://crm.example.com/api2"));

        assert_eq!(
            api.resolve_uri("contacts/abc").unwrap().as_str(),
            "https://crm.example.com/api2/contacts/abc"
        );
        assert_eq!(
            api.resolve_uri("https://uploads.example.com/bucket").unwrap().as_str(),
            "https://uploads.example.com/bucket"
        );
    }

    #[test]
    fn test_user_agent_includes_prefix() {
        let config = CrmConfig::builder()
            .api_key(ApiKey::new("key").unwrap())
            .login("login")
            .tenant("t")
            .user_agent_prefix("MyApp/1.0")
            .build()
            .unwrap();
        let api = RestApi::new(&config);

        assert_eq!(api.user_agent(), format!("MyApp/1.0 | webcrm-sdk-{SDK_VERSION}"));
    }

    #[test]
    fn test_rest_api_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<RestApi>();
    }
}
