//! Integration tests for the provisioning orchestrator.

mod common;

use std::sync::Arc;

use common::{payload, FakeProvisioner};
use mise_api_tenants::services::ProvisioningService;
use mise_api_tenants::TenantError;
use mise_clients::ClientError;
use mise_core::Severity;

fn service(provisioner: Arc<FakeProvisioner>) -> ProvisioningService {
    ProvisioningService::new(provisioner)
}

#[tokio::test]
async fn test_submit_success_returns_tenant_id() {
    let provisioner = Arc::new(FakeProvisioner::new());
    let tenant_id = provisioner.push_created("la-piazza");

    let outcome = service(provisioner.clone())
        .submit(&payload("la-piazza"))
        .await
        .unwrap();

    assert_eq!(outcome.tenant_id, tenant_id.into_inner());
    assert_eq!(outcome.slug, "la-piazza");
    assert_eq!(provisioner.calls(), 1);
}

#[tokio::test]
async fn test_conflict_maps_to_slug_taken() {
    let provisioner = Arc::new(FakeProvisioner::new());
    provisioner.push(Err(ClientError::Conflict {
        code: "slug_taken".to_string(),
        message: "tenants_slug_key".to_string(),
    }));

    let err = service(provisioner)
        .submit(&payload("la-piazza"))
        .await
        .unwrap_err();

    match &err {
        TenantError::SlugTaken { slug, .. } => assert_eq!(slug, "la-piazza"),
        other => panic!("Expected SlugTaken, got {other:?}"),
    }
    assert!(err.is_recoverable());
    assert_eq!(err.severity(), Severity::Low);
}

#[tokio::test]
async fn test_non_slug_conflict_keeps_remote_code() {
    let provisioner = Arc::new(FakeProvisioner::new());
    provisioner.push(Err(ClientError::Conflict {
        code: "owner_email_taken".to_string(),
        message: "An account already exists for maria@lapiazza.test".to_string(),
    }));

    let err = service(provisioner.clone())
        .submit(&payload("la-piazza"))
        .await
        .unwrap_err();

    match &err {
        TenantError::Remote { code, message } => {
            assert_eq!(code, "owner_email_taken");
            assert_eq!(message, "An account already exists for maria@lapiazza.test");
        }
        other => panic!("Expected Remote, got {other:?}"),
    }
    assert!(!err.is_recoverable());
    assert_eq!(provisioner.calls(), 1);
}

#[tokio::test]
async fn test_bare_conflict_without_envelope_is_not_a_slug_race() {
    let provisioner = Arc::new(FakeProvisioner::new());
    provisioner.push(Err(ClientError::Conflict {
        code: "http_409".to_string(),
        message: "HTTP 409 Conflict".to_string(),
    }));

    let err = service(provisioner)
        .submit(&payload("la-piazza"))
        .await
        .unwrap_err();

    assert!(
        matches!(&err, TenantError::Remote { code, .. } if code == "http_409"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_unique_violation_code_maps_to_slug_taken() {
    let provisioner = Arc::new(FakeProvisioner::new());
    provisioner.push(Err(ClientError::Remote {
        status: 400,
        code: "unique_violation".to_string(),
        message: "duplicate key value violates unique constraint".to_string(),
    }));

    let err = service(provisioner)
        .submit(&payload("la-piazza"))
        .await
        .unwrap_err();

    assert!(matches!(err, TenantError::SlugTaken { .. }), "got {err:?}");
}

#[tokio::test]
async fn test_structured_error_surfaced_unmodified() {
    let provisioner = Arc::new(FakeProvisioner::new());
    provisioner.push(Err(ClientError::Remote {
        status: 422,
        code: "invalid_timezone".to_string(),
        message: "Unknown timezone 'Europe/Rome'".to_string(),
    }));

    let err = service(provisioner)
        .submit(&payload("la-piazza"))
        .await
        .unwrap_err();

    match err {
        TenantError::Remote { code, message } => {
            assert_eq!(code, "invalid_timezone");
            assert_eq!(message, "Unknown timezone 'Europe/Rome'");
        }
        other => panic!("Expected Remote, got {other:?}"),
    }
}

#[tokio::test]
async fn test_transport_failure_fails_closed() {
    let provisioner = Arc::new(FakeProvisioner::new());
    provisioner.push(Err(ClientError::Timeout(
        "operation timed out".to_string(),
    )));

    let err = service(provisioner.clone())
        .submit(&payload("la-piazza"))
        .await
        .unwrap_err();

    assert!(matches!(err, TenantError::Unavailable(_)), "got {err:?}");
    // No retry.
    assert_eq!(provisioner.calls(), 1);
}

#[tokio::test]
async fn test_invalid_payload_never_reaches_network() {
    let provisioner = Arc::new(FakeProvisioner::new());
    let mut invalid = payload("la-piazza");
    invalid.owner.email = "not-an-email".to_string();

    let err = service(provisioner.clone())
        .submit(&invalid)
        .await
        .unwrap_err();

    match err {
        TenantError::ValidationWithField { field, .. } => assert_eq!(field, "owner.email"),
        other => panic!("Expected ValidationWithField, got {other:?}"),
    }
    assert_eq!(provisioner.calls(), 0);
}
