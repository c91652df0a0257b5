//! Integration tests for slug allocation and availability.

mod common;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::{record, tenant, MemoryStores};
use mise_api_tenants::services::{AvailabilityService, SlugService};
use mise_api_tenants::stores::{InMemoryTenantRegistry, TenantRegistry};
use mise_api_tenants::{TenantError, TenantResult};
use mise_core::TenantId;
use mise_db::models::{ProvisioningStatus, Tenant};

fn slug_service(stores: &MemoryStores) -> SlugService {
    let handles = stores.handles();
    SlugService::new(Arc::new(AvailabilityService::new(
        handles.tenants,
        handles.ledger,
    )))
}

/// Registry that counts `slug_exists` calls.
struct CountingRegistry {
    inner: InMemoryTenantRegistry,
    probes: AtomicUsize,
}

#[async_trait]
impl TenantRegistry for CountingRegistry {
    async fn slug_exists(&self, slug: &str) -> TenantResult<bool> {
        self.probes.fetch_add(1, Ordering::SeqCst);
        self.inner.slug_exists(slug).await
    }

    async fn find_tenant(&self, id: TenantId) -> TenantResult<Option<Tenant>> {
        self.inner.find_tenant(id).await
    }

    async fn find_tenants_by_email(&self, email: &str) -> TenantResult<Vec<Tenant>> {
        self.inner.find_tenants_by_email(email).await
    }

    async fn list_recent_tenants(&self, limit: usize) -> TenantResult<Vec<Tenant>> {
        self.inner.list_recent_tenants(limit).await
    }

    async fn list_tenants(&self) -> TenantResult<Vec<Tenant>> {
        self.inner.list_tenants().await
    }
}

#[tokio::test]
async fn test_allocate_on_empty_store() {
    let stores = MemoryStores::new();
    let service = slug_service(&stores);

    assert_eq!(service.allocate("My Café!!").await.unwrap(), "my-cafe");
}

#[tokio::test]
async fn test_sequential_allocations_suffix() {
    let stores = MemoryStores::new();
    let service = slug_service(&stores);

    let first = service.allocate("La Piazza").await.unwrap();
    assert_eq!(first, "la-piazza");
    stores
        .tenants
        .insert(tenant(&first, "La Piazza", "hello@lapiazza.test", 5))
        .await;

    let second = service.allocate("La Piazza").await.unwrap();
    assert_eq!(second, "la-piazza-2");
    stores
        .tenants
        .insert(tenant(&second, "La Piazza", "other@lapiazza.test", 1))
        .await;

    assert_eq!(service.allocate("la piazza").await.unwrap(), "la-piazza-3");
}

#[tokio::test]
async fn test_ledger_claim_blocks_slug() {
    let stores = MemoryStores::new();
    // A failed attempt still claims its slug.
    stores
        .ledger
        .insert(record(None, "sushi-bar", ProvisioningStatus::Failed, 60))
        .await;
    let service = slug_service(&stores);

    assert_eq!(service.allocate("Sushi Bar").await.unwrap(), "sushi-bar-2");
}

#[tokio::test]
async fn test_allocation_exhausts_after_99_suffixes() {
    let stores = MemoryStores::new();
    stores
        .tenants
        .insert(tenant("taco-shop", "Taco Shop", "a@taco.test", 0))
        .await;
    for counter in 2..=100 {
        stores
            .tenants
            .insert(tenant(
                &format!("taco-shop-{counter}"),
                "Taco Shop",
                "a@taco.test",
                0,
            ))
            .await;
    }

    let counting = Arc::new(CountingRegistry {
        inner: stores.tenants.clone(),
        probes: AtomicUsize::new(0),
    });
    let service = SlugService::new(Arc::new(AvailabilityService::new(
        counting.clone(),
        stores.handles().ledger,
    )));

    let err = service.allocate("Taco Shop").await.unwrap_err();
    match err {
        TenantError::AllocationExhausted { base, attempts } => {
            assert_eq!(base, "taco-shop");
            assert_eq!(attempts, 99);
        }
        other => panic!("Expected AllocationExhausted, got {other:?}"),
    }
    // Base plus 99 suffixed candidates.
    assert_eq!(counting.probes.load(Ordering::SeqCst), 100);
}

#[tokio::test]
async fn test_allocation_fails_closed_when_store_down() {
    let stores = MemoryStores::new();
    stores.ledger.set_unavailable(true);
    let service = slug_service(&stores);

    let err = service.allocate("La Piazza").await.unwrap_err();
    assert!(matches!(err, TenantError::Unavailable(_)), "got {err:?}");
    assert!(err.is_recoverable());
}

#[tokio::test]
async fn test_check_reports_conflict() {
    let stores = MemoryStores::new();
    stores
        .tenants
        .insert(tenant("la-piazza", "La Piazza", "hello@lapiazza.test", 5))
        .await;
    let service = slug_service(&stores);

    match service.check("la-piazza").await.unwrap_err() {
        TenantError::SlugUnavailable { slug, reason } => {
            assert_eq!(slug, "la-piazza");
            assert_eq!(reason, "claimed by an existing tenant");
        }
        other => panic!("Expected SlugUnavailable, got {other:?}"),
    }
    assert!(service.check("la-piazza-2").await.is_ok());
}

#[tokio::test]
async fn test_check_rejects_unnormalized_slug() {
    let stores = MemoryStores::new();
    let service = slug_service(&stores);

    match service.check("La Piazza").await.unwrap_err() {
        TenantError::ValidationWithField { field, .. } => assert_eq!(field, "slug"),
        other => panic!("Expected ValidationWithField, got {other:?}"),
    }
}
