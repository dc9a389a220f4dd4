//! File uploads and downloads through the WebCRM attachment store.
//!
//! Files are not sent through the API itself. Instead the API hands out an
//! upload permission for a storage location, the file is posted there as a
//! multipart form, and the resulting id is passed to the API, e.g. as one
//! of the `comment_attachments` of an activity.
//!
//! # Example
//!
//! ```rust,ignore
//! use webcrm::{attachments, Activity, Findable, Modifiable};
//! use serde_json::json;
//!
//! let upload_id = attachments::upload(&client, "invoice.pdf", bytes).await?;
//!
//! let mut activity = Activity::find(&client, "e70a7123f499c5e0e9972ab4dbfb8fe3").await?;
//! activity
//!     .update(&client, &json!({
//!         "comment_notes": "Invoice attached.",
//!         "comment_attachments": [upload_id],
//!     }))
//!     .await?;
//! ```

use std::collections::HashMap;

use reqwest::multipart::{Form, Part};
use reqwest::Url;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::clients::{CrmClient, CrmError};

/// Content type of uploaded files.
const UPLOAD_CONTENT_TYPE: &str = "application/octet-stream";

/// Permission to upload one file to the attachment store.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Permission {
    /// Where the file has to be posted.
    pub url: Url,
    /// Form fields that have to be posted along with the file.
    pub fields: HashMap<String, String>,
    /// Prefix of the id the uploaded file will be known by.
    pub upload_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PermissionResponse {
    url: String,
    #[serde(default)]
    fields: HashMap<String, Value>,
    #[serde(default)]
    upload_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DownloadUrlResponse {
    url: String,
}

/// Requests permission to upload a file.
///
/// # Errors
///
/// Returns [`CrmError::InvalidResponse`] if the response lacks a URL.
pub async fn generate_upload_permission(client: &CrmClient) -> Result<Permission, CrmError> {
    let body = client
        .rest_api()
        .post("attachment_store/generate_upload_permission", Some(&json!({})), None)
        .await?;
    let response: PermissionResponse = decode(body)?;

    let fields = response
        .fields
        .into_iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (key, value)
        })
        .collect();

    Ok(Permission {
        url: client.rest_api().resolve_uri(&response.url)?,
        fields,
        upload_id: response.upload_id,
    })
}

/// Returns a short-lived URL an attachment can be downloaded from.
///
/// # Errors
///
/// Returns [`CrmError::InvalidResponse`] if the response lacks a URL.
pub async fn generate_download_url(client: &CrmClient, attachment_id: &str) -> Result<String, CrmError> {
    let body = client
        .rest_api()
        .post(
            "attachment_store/generate_download_url",
            Some(&json!({ "attachment_id": attachment_id })),
            None,
        )
        .await?;
    let response: DownloadUrlResponse = decode(body)?;
    Ok(client.rest_api().resolve_uri(&response.url)?.to_string())
}

/// Uploads a file and returns the id to reference it by.
///
/// The id is `upload_id/file_name`, or just `file_name` if the permission
/// carries no upload id.
///
/// # Errors
///
/// - [`CrmError::Server`] with `File upload failed with code N` if the
///   storage rejects the upload
/// - [`CrmError::Network`] if the upload could not be sent
pub async fn upload(client: &CrmClient, file_name: &str, content: Vec<u8>) -> Result<String, CrmError> {
    let permission = generate_upload_permission(client).await?;

    let file = Part::bytes(content)
        .file_name(file_name.to_string())
        .mime_str(UPLOAD_CONTENT_TYPE)
        .map_err(network_error)?;
    let form = permission
        .fields
        .iter()
        .fold(Form::new(), |form, (key, value)| form.text(key.clone(), value.clone()))
        .part("file", file);

    tracing::info!("POST {} (upload of {file_name})", permission.url);
    let response = client
        .rest_api()
        .http()
        .post(permission.url.clone())
        .multipart(form)
        .send()
        .await
        .map_err(network_error)?;

    let status = response.status();
    tracing::info!("  {} {}", status.as_u16(), status.canonical_reason().unwrap_or_default());
    if !status.is_success() {
        return Err(CrmError::Server {
            message: format!("File upload failed with code {}", status.as_u16()),
        });
    }

    Ok(match permission.upload_id {
        Some(upload_id) => format!("{upload_id}/{file_name}"),
        None => file_name.to_string(),
    })
}

fn decode<T: for<'de> Deserialize<'de>>(body: Value) -> Result<T, CrmError> {
    serde_json::from_value(body).map_err(|e| CrmError::InvalidResponse {
        message: format!("attachment store: {e}"),
    })
}

fn network_error(e: reqwest::Error) -> CrmError {
    CrmError::Network {
        message: e.to_string(),
        source: e,
    }
}
