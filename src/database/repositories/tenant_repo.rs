//! Repositories for the tenant registry in the system database.

use rust_decimal::Decimal;
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::database::models::{Device, DeviceStatus, Payment, PaymentStatus, Tenant, TenantStatus};

const TENANT_COLUMNS: &str = "\
    id, name, display_name, database, template, host, status, is_active, \
    created_at, updated_at, trashed_at";

const DEVICE_COLUMNS: &str = "\
    id, tenant_id, serial_number, model, location, status, provisioning_secret, \
    provisioned_at, revoked_at, created_at";

const PAYMENT_COLUMNS: &str = "id, tenant_id, amount, currency, reference, status, paid_at, created_at";

pub struct TenantRepo;

impl TenantRepo {
    /// Registered inactive, awaiting the first payment.
    pub async fn insert(
        pool: &PgPool,
        name: &str,
        display_name: &str,
        database: &str,
        template: &str,
    ) -> Result<Tenant, sqlx::Error> {
        let query = format!(
            "INSERT INTO tenants (name, display_name, database, template, status, is_active) \
             VALUES ($1, $2, $3, $4, $5, false) \
             RETURNING {TENANT_COLUMNS}"
        );
        sqlx::query_as::<_, Tenant>(&query)
            .bind(name)
            .bind(display_name)
            .bind(database)
            .bind(template)
            .bind(TenantStatus::PendingPayment)
            .fetch_one(pool)
            .await
    }

    /// Tenant by name, trashed or not.
    pub async fn find_by_name<'e>(exec: impl PgExecutor<'e>, name: &str) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!("SELECT {TENANT_COLUMNS} FROM tenants WHERE name = $1");
        sqlx::query_as::<_, Tenant>(&query).bind(name).fetch_optional(exec).await
    }

    /// Tenant that may serve requests: active and not trashed.
    pub async fn find_active_by_database(pool: &PgPool, database: &str) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!(
            "SELECT {TENANT_COLUMNS} FROM tenants \
             WHERE database = $1 AND is_active = true AND trashed_at IS NULL"
        );
        sqlx::query_as::<_, Tenant>(&query).bind(database).fetch_optional(pool).await
    }

    pub async fn list(pool: &PgPool, include_trashed: bool) -> Result<Vec<Tenant>, sqlx::Error> {
        let query = format!(
            "SELECT {TENANT_COLUMNS} FROM tenants \
             WHERE $1 OR trashed_at IS NULL \
             ORDER BY created_at DESC"
        );
        sqlx::query_as::<_, Tenant>(&query).bind(include_trashed).fetch_all(pool).await
    }

    pub async fn update(
        pool: &PgPool,
        name: &str,
        display_name: Option<&str>,
        status: Option<TenantStatus>,
    ) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!(
            "UPDATE tenants SET \
                display_name = COALESCE($2, display_name), \
                status = COALESCE($3, status), \
                is_active = COALESCE($3, status) = 'active', \
                updated_at = now() \
             WHERE name = $1 AND trashed_at IS NULL \
             RETURNING {TENANT_COLUMNS}"
        );
        sqlx::query_as::<_, Tenant>(&query)
            .bind(name)
            .bind(display_name)
            .bind(status)
            .fetch_optional(pool)
            .await
    }

    pub async fn activate<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> Result<Tenant, sqlx::Error> {
        let query = format!(
            "UPDATE tenants SET status = $2, is_active = true, updated_at = now() \
             WHERE id = $1 \
             RETURNING {TENANT_COLUMNS}"
        );
        sqlx::query_as::<_, Tenant>(&query)
            .bind(id)
            .bind(TenantStatus::Active)
            .fetch_one(exec)
            .await
    }

    pub async fn trash(pool: &PgPool, name: &str) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!(
            "UPDATE tenants SET trashed_at = now(), is_active = false, updated_at = now() \
             WHERE name = $1 AND trashed_at IS NULL \
             RETURNING {TENANT_COLUMNS}"
        );
        sqlx::query_as::<_, Tenant>(&query).bind(name).fetch_optional(pool).await
    }

    /// Clears `trashed_at`; the tenant is active again only if it had paid.
    pub async fn restore(pool: &PgPool, name: &str) -> Result<Option<Tenant>, sqlx::Error> {
        let query = format!(
            "UPDATE tenants SET trashed_at = NULL, is_active = (status = 'active'), updated_at = now() \
             WHERE name = $1 AND trashed_at IS NOT NULL \
             RETURNING {TENANT_COLUMNS}"
        );
        sqlx::query_as::<_, Tenant>(&query).bind(name).fetch_optional(pool).await
    }
}

pub struct DeviceRepo;

impl DeviceRepo {
    pub async fn insert(
        pool: &PgPool,
        tenant_id: Uuid,
        serial_number: &str,
        model: &str,
        location: Option<&str>,
        provisioning_secret: &str,
    ) -> Result<Device, sqlx::Error> {
        let query = format!(
            "INSERT INTO tenant_devices (tenant_id, serial_number, model, location, status, provisioning_secret) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {DEVICE_COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(tenant_id)
            .bind(serial_number)
            .bind(model)
            .bind(location)
            .bind(DeviceStatus::Pending)
            .bind(provisioning_secret)
            .fetch_one(pool)
            .await
    }

    pub async fn list(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<Device>, sqlx::Error> {
        let query = format!("SELECT {DEVICE_COLUMNS} FROM tenant_devices WHERE tenant_id = $1 ORDER BY created_at");
        sqlx::query_as::<_, Device>(&query).bind(tenant_id).fetch_all(pool).await
    }

    /// Device holding `secret`, for the terminal's provisioning handshake.
    pub async fn find_by_secret(pool: &PgPool, serial_number: &str, secret: &str) -> Result<Option<Device>, sqlx::Error> {
        let query = format!(
            "SELECT {DEVICE_COLUMNS} FROM tenant_devices \
             WHERE serial_number = $1 AND provisioning_secret = $2"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(serial_number)
            .bind(secret)
            .fetch_optional(pool)
            .await
    }

    pub async fn mark_provisioned(pool: &PgPool, id: Uuid) -> Result<Device, sqlx::Error> {
        let query = format!(
            "UPDATE tenant_devices SET status = $2, provisioned_at = now() \
             WHERE id = $1 \
             RETURNING {DEVICE_COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(id)
            .bind(DeviceStatus::Provisioned)
            .fetch_one(pool)
            .await
    }

    pub async fn revoke(pool: &PgPool, tenant_id: Uuid, id: Uuid) -> Result<Option<Device>, sqlx::Error> {
        let query = format!(
            "UPDATE tenant_devices SET status = $3, revoked_at = COALESCE(revoked_at, now()) \
             WHERE id = $1 AND tenant_id = $2 \
             RETURNING {DEVICE_COLUMNS}"
        );
        sqlx::query_as::<_, Device>(&query)
            .bind(id)
            .bind(tenant_id)
            .bind(DeviceStatus::Revoked)
            .fetch_optional(pool)
            .await
    }
}

pub struct PaymentRepo;

impl PaymentRepo {
    pub async fn insert(
        pool: &PgPool,
        tenant_id: Uuid,
        amount: Decimal,
        currency: &str,
        reference: &str,
    ) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "INSERT INTO tenant_payments (tenant_id, amount, currency, reference, status) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING {PAYMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(tenant_id)
            .bind(amount)
            .bind(currency)
            .bind(reference)
            .bind(PaymentStatus::Pending)
            .fetch_one(pool)
            .await
    }

    pub async fn list(pool: &PgPool, tenant_id: Uuid) -> Result<Vec<Payment>, sqlx::Error> {
        let query =
            format!("SELECT {PAYMENT_COLUMNS} FROM tenant_payments WHERE tenant_id = $1 ORDER BY created_at DESC");
        sqlx::query_as::<_, Payment>(&query).bind(tenant_id).fetch_all(pool).await
    }

    pub async fn find_for_update<'e>(
        exec: impl PgExecutor<'e>,
        tenant_id: Uuid,
        id: Uuid,
    ) -> Result<Option<Payment>, sqlx::Error> {
        let query = format!(
            "SELECT {PAYMENT_COLUMNS} FROM tenant_payments \
             WHERE id = $1 AND tenant_id = $2 \
             FOR UPDATE"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(tenant_id)
            .fetch_optional(exec)
            .await
    }

    pub async fn mark_paid<'e>(exec: impl PgExecutor<'e>, id: Uuid) -> Result<Payment, sqlx::Error> {
        let query = format!(
            "UPDATE tenant_payments SET status = $2, paid_at = now() \
             WHERE id = $1 \
             RETURNING {PAYMENT_COLUMNS}"
        );
        sqlx::query_as::<_, Payment>(&query)
            .bind(id)
            .bind(PaymentStatus::Paid)
            .fetch_one(exec)
            .await
    }
}
