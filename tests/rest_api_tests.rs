//! Integration tests for the REST transport.
//!
//! These tests verify request headers, error translation, the single
//! retry of idempotent requests, and optimistic locking with `If-Match`.

use std::time::Duration;

use serde_json::json;
use webcrm::clients::SDK_VERSION;
use webcrm::{
    ApiKey, AttributeProvider, ClientError, Contact, CrmClient, CrmConfig, CrmError, CrmResource,
    Findable, Modifiable,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Base64 of `api-user:api-key`.
const BASIC_AUTH: &str = "Basic YXBpLXVzZXI6YXBpLWtleQ==";

fn create_config(server: &MockServer) -> CrmConfig {
    CrmConfig::builder()
        .api_key(ApiKey::new("api-key").unwrap())
        .login("api-user")
        .endpoint(server.uri())
        .build()
        .unwrap()
}

async fn setup() -> (MockServer, CrmClient) {
    let server = MockServer::start().await;
    let client = CrmClient::new(&create_config(&server));
    (server, client)
}

// ============================================================================
// Request Headers
// ============================================================================

#[tokio::test]
async fn test_requests_carry_basic_auth_and_json_headers() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/types"))
        .and(header("authorization", BASIC_AUTH))
        .and(header("content-type", "application/json"))
        .and(header("accept", "application/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    let body = client.rest_api().get("types", None, None).await.unwrap();
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_user_agent_prefix_is_sent() {
    let server = MockServer::start().await;
    let config = CrmConfig::builder()
        .api_key(ApiKey::new("api-key").unwrap())
        .login("api-user")
        .endpoint(server.uri())
        .user_agent_prefix("MyApp/2.0")
        .build()
        .unwrap();
    let client = CrmClient::new(&config);

    Mock::given(method("GET"))
        .and(path("/types"))
        .and(header(
            "user-agent",
            format!("MyApp/2.0 | webcrm-sdk-{SDK_VERSION}").as_str(),
        ))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    client.rest_api().get("types", None, None).await.unwrap();
}

#[tokio::test]
async fn test_payload_is_sent_as_json_body() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/contacts"))
        .and(body_json(json!({"last_name": "Smith", "language": "en"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "c1", "last_name": "Smith"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let contact = Contact::create(&client, &json!({"last_name": "Smith", "language": "en"}))
        .await
        .unwrap();

    assert_eq!(contact.id(), Some("c1"));
}

// ============================================================================
// Error Translation
// ============================================================================

#[tokio::test]
async fn test_invalid_values_carry_validation_errors() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/contacts"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "id": "invalid_values",
            "message": "Validation failed.",
            "validation_errors": [
                {"attribute": "language", "code": "inclusion", "message": "language is not included in the list"},
                {"attribute": "last_name", "code": "blank", "message": "last_name is blank"}
            ]
        })))
        .mount(&server)
        .await;

    let err = Contact::create(&client, &json!({"language": "xx"}))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Validation failed. language is not included in the list and last_name is blank."
    );
    match err {
        CrmError::Client(ClientError::InvalidValues { validation_errors, .. }) => {
            assert_eq!(validation_errors.len(), 2);
            assert_eq!(validation_errors[1].attribute.as_deref(), Some("last_name"));
        }
        other => panic!("Expected InvalidValues, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_not_found_without_id_falls_back_to_status() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/contacts/unknown"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = Contact::find(&client, "unknown").await.unwrap_err();

    assert!(err.is_not_found());
    assert_eq!(err.missing_ids(), Some(&[][..]));
}

#[tokio::test]
async fn test_not_found_id_carries_missing_ids() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/contacts/gone"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "id": "not_found",
            "message": "Items could not be found.",
            "missing_ids": ["gone"]
        })))
        .mount(&server)
        .await;

    let err = Contact::find(&client, "gone").await.unwrap_err();

    assert_eq!(err.missing_ids(), Some(&["gone".to_string()][..]));
    assert_eq!(err.to_string(), "Items could not be found. Missing IDs: gone");
}

#[tokio::test]
async fn test_internal_server_error_becomes_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/types"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "id": "internal_server_error",
            "message": "Something went wrong."
        })))
        .mount(&server)
        .await;

    let err = client.rest_api().get("types", None, None).await.unwrap_err();

    match err {
        CrmError::Server { message } => assert_eq!(message, "Something went wrong."),
        other => panic!("Expected Server, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_rate_limit_is_translated() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/types"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "id": "rate_limit",
            "message": "Rate limit exceeded."
        })))
        .mount(&server)
        .await;

    let err = client.rest_api().get("types", None, None).await.unwrap_err();

    assert!(matches!(
        err,
        CrmError::Client(ClientError::RateLimitExceeded { .. })
    ));
}

#[tokio::test]
async fn test_unknown_client_error_includes_status_and_body() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/types"))
        .respond_with(ResponseTemplate::new(418).set_body_json(json!({"teapot": true})))
        .mount(&server)
        .await;

    let err = client.rest_api().get("types", None, None).await.unwrap_err();

    match err {
        CrmError::Client(ClientError::Other { message }) => {
            assert_eq!(message, r#"HTTP Code 418: {"teapot":true}"#);
        }
        other => panic!("Expected Other, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_invalid_json_becomes_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/types"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client.rest_api().get("types", None, None).await.unwrap_err();

    match err {
        CrmError::Server { message } => {
            assert_eq!(message, "Server returned invalid json: <html>oops</html>");
        }
        other => panic!("Expected Server, got: {other:?}"),
    }
}

// ============================================================================
// Retry Behavior
// ============================================================================

fn create_impatient_client(server: &MockServer) -> CrmClient {
    let config = CrmConfig::builder()
        .api_key(ApiKey::new("api-key").unwrap())
        .login("api-user")
        .endpoint(server.uri())
        .timeout(Duration::from_millis(200))
        .build()
        .unwrap();
    CrmClient::new(&config)
}

#[tokio::test]
async fn test_get_is_retried_once_on_network_failure() {
    let server = MockServer::start().await;
    let client = create_impatient_client(&server);

    Mock::given(method("GET"))
        .and(path("/types"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([]))
                .set_delay(Duration::from_secs(1)),
        )
        .expect(2)
        .mount(&server)
        .await;

    let err = client.rest_api().get("types", None, None).await.unwrap_err();
    assert!(matches!(err, CrmError::Network { .. }));
}

#[tokio::test]
async fn test_post_is_never_retried() {
    let server = MockServer::start().await;
    let client = create_impatient_client(&server);

    Mock::given(method("POST"))
        .and(path("/contacts"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "c1"}))
                .set_delay(Duration::from_secs(1)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = client
        .rest_api()
        .post("contacts", Some(&json!({"last_name": "Smith"})), None)
        .await
        .unwrap_err();
    assert!(matches!(err, CrmError::Network { .. }));
}

#[tokio::test]
async fn test_http_errors_are_not_retried() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/types"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({})))
        .expect(1)
        .mount(&server)
        .await;

    let err = client.rest_api().get("types", None, None).await.unwrap_err();
    assert!(matches!(err, CrmError::Server { .. }));
}

// ============================================================================
// Optimistic Locking
// ============================================================================

#[tokio::test]
async fn test_update_sends_if_match_and_reloads_attributes() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/contacts/c1"))
        .and(header("if-match", "3"))
        .and(body_json(json!({"first_name": "Jane"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "c1",
            "version": 4,
            "last_name": "Smith",
            "first_name": "Jane"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut contact =
        Contact::from_json(json!({"id": "c1", "version": 3, "last_name": "Smith"})).unwrap();
    contact
        .update(&client, &json!({"first_name": "Jane"}))
        .await
        .unwrap();

    assert_eq!(contact.attribute("version").and_then(|v| v.as_i64()), Some(4));
    assert_eq!(contact.attribute("first_name").and_then(|v| v.as_str()), Some("Jane"));
}

#[tokio::test]
async fn test_conflicting_update_leaves_local_state_unchanged() {
    let (server, client) = setup().await;

    Mock::given(method("PUT"))
        .and(path("/contacts/c1"))
        .and(header("if-match", "3"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({
            "id": "conflict",
            "message": "The item has been changed in the meantime."
        })))
        .expect(1)
        .mount(&server)
        .await;

    let mut contact =
        Contact::from_json(json!({"id": "c1", "version": 3, "last_name": "Smith"})).unwrap();
    let err = contact
        .update(&client, &json!({"last_name": "Doe"}))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CrmError::Client(ClientError::ResourceConflict { .. })
    ));
    assert_eq!(contact.attribute("last_name").and_then(|v| v.as_str()), Some("Smith"));
    assert_eq!(contact.attribute("version").and_then(|v| v.as_i64()), Some(3));
}

#[tokio::test]
async fn test_delete_sends_if_match() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/contacts/c1"))
        .and(header("if-match", "7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "c1", "deleted": true})))
        .expect(1)
        .mount(&server)
        .await;

    let contact = Contact::from_json(json!({"id": "c1", "version": 7})).unwrap();
    contact.delete(&client).await.unwrap();
}
