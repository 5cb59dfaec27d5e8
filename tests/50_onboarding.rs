//! Tenant onboarding against the system registry schema.
//!
//! Needs DATABASE_URL pointing at a Postgres server where the test user may
//! create databases: `cargo test -- --ignored`.

use rust_decimal::Decimal;
use sqlx::PgPool;

use opsdesk_api::database::models::{CreatePayment, DeviceStatus, PaymentStatus, RegisterDevice, TenantStatus};
use opsdesk_api::database::repositories::TenantRepo;
use opsdesk_api::services::{TenantError, TenantService};

async fn pending_tenant(pool: &PgPool, name: &str) -> TenantService {
    TenantRepo::insert(pool, name, name, &format!("tenant_{}", name), "template_default")
        .await
        .unwrap();
    TenantService::with_pool(pool.clone())
}

fn invoice(reference: &str, cents: i64) -> CreatePayment {
    CreatePayment {
        amount: Decimal::new(cents, 2),
        currency: "eur".to_string(),
        reference: reference.to_string(),
    }
}

#[sqlx::test(migrations = "migrations/main")]
#[ignore]
async fn first_confirmed_payment_activates_the_tenant(pool: PgPool) {
    let service = pending_tenant(&pool, "acme").await;

    let tenant = service.get_tenant("acme").await.unwrap();
    assert_eq!(tenant.status, TenantStatus::PendingPayment);
    assert!(!tenant.is_active);
    assert!(matches!(service.login_tenant("acme").await, Err(TenantError::InvalidState(_))));

    let first = service.record_payment("acme", &invoice("INV-1", 4990)).await.unwrap();
    assert_eq!(first.currency, "EUR");
    assert_eq!(first.status, PaymentStatus::Pending);

    let confirmed = service.confirm_payment("acme", first.id).await.unwrap();
    assert!(confirmed.activated);
    assert_eq!(confirmed.payment.status, PaymentStatus::Paid);
    assert!(confirmed.payment.paid_at.is_some());
    assert_eq!(confirmed.tenant.status, TenantStatus::Active);
    assert!(confirmed.tenant.is_active);
    service.login_tenant("acme").await.unwrap();

    let again = service.confirm_payment("acme", first.id).await;
    assert!(matches!(again, Err(TenantError::InvalidState(_))));

    let second = service.record_payment("acme", &invoice("INV-2", 4990)).await.unwrap();
    let confirmed = service.confirm_payment("acme", second.id).await.unwrap();
    assert!(!confirmed.activated);
    assert_eq!(confirmed.tenant.status, TenantStatus::Active);
}

#[sqlx::test(migrations = "migrations/main")]
#[ignore]
async fn payments_belong_to_their_tenant(pool: PgPool) {
    let service = pending_tenant(&pool, "acme").await;
    pending_tenant(&pool, "globex").await;

    let payment = service.record_payment("acme", &invoice("INV-1", 1000)).await.unwrap();
    let err = service.confirm_payment("globex", payment.id).await;
    assert!(matches!(err, Err(TenantError::PaymentNotFound(id)) if id == payment.id));
    assert!(!service.get_tenant("globex").await.unwrap().is_active);
}

#[sqlx::test(migrations = "migrations/main")]
#[ignore]
async fn device_handshake_moves_pending_to_provisioned(pool: PgPool) {
    let service = pending_tenant(&pool, "acme").await;
    let input = RegisterDevice {
        serial_number: "BIO-0001".to_string(),
        model: "FaceGate 3".to_string(),
        location: Some("Front desk".to_string()),
    };
    let registered = service.register_device("acme", &input).await.unwrap();
    assert_eq!(registered.device.status, DeviceStatus::Pending);

    let wrong = service.provision_device("BIO-0001", "not-the-secret").await;
    assert!(matches!(wrong, Err(TenantError::DeviceNotFound(_))));

    let device = service
        .provision_device("BIO-0001", &registered.provisioning_secret)
        .await
        .unwrap();
    assert_eq!(device.status, DeviceStatus::Provisioned);
    assert!(device.provisioned_at.is_some());

    // Repeating the handshake is harmless
    let again = service
        .provision_device("BIO-0001", &registered.provisioning_secret)
        .await
        .unwrap();
    assert_eq!(again.status, DeviceStatus::Provisioned);
    assert_eq!(again.provisioned_at, device.provisioned_at);
}

#[sqlx::test(migrations = "migrations/main")]
#[ignore]
async fn revoked_device_cannot_provision(pool: PgPool) {
    let service = pending_tenant(&pool, "acme").await;
    let input = RegisterDevice {
        serial_number: "BIO-0002".to_string(),
        model: "FaceGate 3".to_string(),
        location: None,
    };
    let registered = service.register_device("acme", &input).await.unwrap();

    let revoked = service.revoke_device("acme", registered.device.id).await.unwrap();
    assert_eq!(revoked.status, DeviceStatus::Revoked);

    let err = service
        .provision_device("BIO-0002", &registered.provisioning_secret)
        .await;
    assert!(matches!(err, Err(TenantError::InvalidState(_))));
}
