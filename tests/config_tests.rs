//! Integration tests for configuration.
//!
//! These tests verify required keys, endpoint normalization and the
//! configuration error messages seen by callers.

use std::time::Duration;

use webcrm::{ApiKey, ConfigError, CrmClient, CrmConfig, CrmError};

fn key() -> ApiKey {
    ApiKey::new("api-key").unwrap()
}

// === Required Keys ===

#[test]
fn test_missing_keys_are_reported_by_name() {
    let err = CrmConfig::builder().login("api-user").tenant("acme").build().unwrap_err();
    assert_eq!(err.to_string(), "Missing required configuration key: api_key");

    let err = CrmConfig::builder().api_key(key()).tenant("acme").build().unwrap_err();
    assert_eq!(err.to_string(), "Missing required configuration key: login");

    let err = CrmConfig::builder().api_key(key()).login("api-user").build().unwrap_err();
    assert_eq!(err.to_string(), "Missing required configuration key: tenant");
}

#[test]
fn test_empty_api_key_is_rejected() {
    assert!(matches!(ApiKey::new(""), Err(ConfigError::EmptyApiKey)));
}

#[test]
fn test_config_errors_convert_into_crm_errors() {
    let err: CrmError = CrmConfig::builder().build().unwrap_err().into();
    assert!(matches!(err, CrmError::Config(ConfigError::MissingRequiredField { .. })));
}

// === Endpoints ===

#[test]
fn test_tenant_endpoint() {
    let config = CrmConfig::builder()
        .api_key(key())
        .login("api-user")
        .tenant("acme")
        .build()
        .unwrap();

    assert_eq!(config.endpoint_uri().as_str(), "https://acme.crm.infopark.net/api2/");
}

#[test]
fn test_endpoint_without_scheme_uses_https() {
    let config = CrmConfig::builder()
        .api_key(key())
        .login("api-user")
        .endpoint("crm.example.com/api2")
        .build()
        .unwrap();

    assert_eq!(config.endpoint_uri().as_str(), "https://crm.example.com/api2/");
}

#[test]
fn test_endpoint_keeps_explicit_scheme() {
    let config = CrmConfig::builder()
        .api_key(key())
        .login("api-user")
        .endpoint("http://localhost:8080/api2/")
        .build()
        .unwrap();

    assert_eq!(config.endpoint_uri().as_str(), "http://localhost:8080/api2/");
}

// === Client ===

#[test]
fn test_client_uses_configured_endpoint_and_timeout() {
    let config = CrmConfig::builder()
        .api_key(key())
        .login("api-user")
        .tenant("acme")
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    let client = CrmClient::new(&config);

    assert_eq!(config.timeout(), Duration::from_secs(5));
    assert_eq!(
        client.rest_api().resolve_uri("contacts/abc").unwrap().as_str(),
        "https://acme.crm.infopark.net/api2/contacts/abc"
    );
}

#[test]
fn test_multiple_clients_are_independent() {
    let build = |tenant: &str| {
        CrmConfig::builder()
            .api_key(key())
            .login("api-user")
            .tenant(tenant)
            .build()
            .unwrap()
    };
    let one = CrmClient::new(&build("one"));
    let two = CrmClient::new(&build("two"));

    assert_eq!(one.rest_api().endpoint().as_str(), "https://one.crm.infopark.net/api2/");
    assert_eq!(two.rest_api().endpoint().as_str(), "https://two.crm.infopark.net/api2/");
}
