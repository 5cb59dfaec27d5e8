use rust_decimal::Decimal;
use serde::Serialize;
use sha2::{Digest, Sha256};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::{self, AuthError};
use crate::config;
use crate::database::manager::{DatabaseError, DatabaseManager};
use crate::database::models::{
    CreatePayment, CreateTenant, Device, DeviceStatus, Payment, PaymentStatus, RegisterDevice, Tenant, TenantAdmin,
    TenantStatus, UpdateTenant,
};
use crate::database::repositories::{DeviceRepo, PaymentRepo, TenantRepo, UserRepo};
use crate::types::Access;

#[derive(Debug, thiserror::Error)]
pub enum TenantError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database manager error: {0}")]
    DatabaseManager(#[from] DatabaseError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("Tenant already exists: {0}")]
    AlreadyExists(String),
    #[error("Tenant not found: {0}")]
    NotFound(String),
    #[error("Device not found: {0}")]
    DeviceNotFound(String),
    #[error("Payment not found: {0}")]
    PaymentNotFound(Uuid),
    #[error("Template not found: {0}")]
    TemplateNotFound(String),
    #[error("Invalid tenant name: {0}")]
    InvalidName(String),
    #[error("Invalid payment: {0}")]
    InvalidPayment(String),
    #[error("{0}")]
    InvalidState(String),
}

/// Registration response; the only time the provisioning secret is shown.
#[derive(Debug, Serialize)]
pub struct RegisteredDevice {
    #[serde(flatten)]
    pub device: Device,
    pub provisioning_secret: String,
}

#[derive(Debug, Serialize)]
pub struct ConfirmedPayment {
    pub payment: Payment,
    pub tenant: Tenant,
    /// True when this confirmation switched the tenant on.
    pub activated: bool,
}

#[derive(Debug, Serialize)]
pub struct TenantHealth {
    pub name: String,
    pub database: String,
    pub status: TenantStatus,
    pub is_active: bool,
    pub database_reachable: bool,
    pub error: Option<String>,
}

pub struct TenantService {
    main_pool: PgPool,
}

impl TenantService {
    pub async fn new() -> Result<Self, TenantError> {
        let main_pool = DatabaseManager::main_pool().await?;
        Ok(Self::with_pool(main_pool))
    }

    /// Service over an already open system database pool.
    pub fn with_pool(main_pool: PgPool) -> Self {
        Self { main_pool }
    }

    /// Create the tenant template from the tenant migrations if it is missing.
    pub async fn ensure_template(template_db: &str) -> Result<(), TenantError> {
        if !DatabaseManager::database_exists(template_db).await? {
            DatabaseManager::create_database(template_db).await?;
        }
        DatabaseManager::migrate_tenant(template_db).await?;
        DatabaseManager::release(template_db).await;
        Ok(())
    }

    /// Onboard a tenant: clone the template, migrate it, seed the first
    /// administrator and register it as awaiting payment.
    ///
    /// If any step after the clone fails the new database is dropped again.
    pub async fn create_tenant(&self, input: &CreateTenant) -> Result<Tenant, TenantError> {
        validate_tenant_name(&input.name)?;

        let tenant_db = hash_tenant_name(&input.name);
        let template_db = input
            .template
            .as_deref()
            .map(|t| if t.starts_with("template_") { t.to_string() } else { format!("template_{}", t) })
            .unwrap_or_else(|| config::config().database.tenant_template.clone());

        if self.tenant_exists(&input.name).await? {
            return Err(TenantError::AlreadyExists(input.name.clone()));
        }

        if !DatabaseManager::database_exists(&template_db).await? {
            return Err(TenantError::TemplateNotFound(template_db));
        }

        DatabaseManager::clone_database(&template_db, &tenant_db).await?;

        match self.finish_onboarding(input, &tenant_db, &template_db).await {
            Ok(tenant) => {
                tracing::info!(tenant = %tenant.name, database = %tenant.database, "Tenant created");
                Ok(tenant)
            }
            Err(e) => {
                tracing::error!(tenant = %input.name, database = %tenant_db, "Onboarding failed, dropping database: {}", e);
                if let Err(drop_err) = DatabaseManager::drop_database(&tenant_db).await {
                    tracing::error!(database = %tenant_db, "Could not drop database: {}", drop_err);
                }
                Err(e)
            }
        }
    }

    async fn finish_onboarding(
        &self,
        input: &CreateTenant,
        tenant_db: &str,
        template_db: &str,
    ) -> Result<Tenant, TenantError> {
        DatabaseManager::migrate_tenant(tenant_db).await?;
        self.seed_admin(tenant_db, &input.admin).await?;

        let display_name = input.display_name.as_deref().unwrap_or(&input.name);
        let tenant = TenantRepo::insert(&self.main_pool, &input.name, display_name, tenant_db, template_db).await?;
        Ok(tenant)
    }

    async fn seed_admin(&self, tenant_db: &str, admin: &TenantAdmin) -> Result<(), TenantError> {
        let pool = DatabaseManager::tenant_pool(tenant_db).await?;
        let password_hash = auth::hash_password(&admin.password)?;
        UserRepo::create(&pool, &admin.name, &admin.auth, &password_hash, Access::Root, None, None).await?;
        Ok(())
    }

    /// Check if tenant already exists in registry
    async fn tenant_exists(&self, tenant_name: &str) -> Result<bool, TenantError> {
        Ok(TenantRepo::find_by_name(&self.main_pool, tenant_name).await?.is_some())
    }

    pub async fn get_tenant(&self, tenant_name: &str) -> Result<Tenant, TenantError> {
        TenantRepo::find_by_name(&self.main_pool, tenant_name)
            .await?
            .ok_or_else(|| TenantError::NotFound(tenant_name.to_string()))
    }

    pub async fn list_tenants(&self, include_trashed: bool) -> Result<Vec<Tenant>, TenantError> {
        Ok(TenantRepo::list(&self.main_pool, include_trashed).await?)
    }

    pub async fn update_tenant(&self, tenant_name: &str, input: &UpdateTenant) -> Result<Tenant, TenantError> {
        let current = self.get_tenant(tenant_name).await?;
        if input.status == Some(TenantStatus::Active) && current.status == TenantStatus::PendingPayment {
            return Err(TenantError::InvalidState(
                "Tenant becomes active when its first payment is confirmed".to_string(),
            ));
        }

        TenantRepo::update(&self.main_pool, tenant_name, input.display_name.as_deref(), input.status)
            .await?
            .ok_or_else(|| TenantError::InvalidState(format!("Tenant '{}' is trashed", tenant_name)))
    }

    pub async fn trash_tenant(&self, tenant_name: &str) -> Result<Tenant, TenantError> {
        let tenant = TenantRepo::trash(&self.main_pool, tenant_name)
            .await?
            .ok_or_else(|| TenantError::NotFound(tenant_name.to_string()))?;
        DatabaseManager::release(&tenant.database).await;
        tracing::info!(tenant = %tenant.name, "Tenant trashed");
        Ok(tenant)
    }

    pub async fn restore_tenant(&self, tenant_name: &str) -> Result<Tenant, TenantError> {
        let tenant = TenantRepo::restore(&self.main_pool, tenant_name)
            .await?
            .ok_or_else(|| TenantError::InvalidState(format!("Tenant '{}' is not trashed", tenant_name)))?;
        tracing::info!(tenant = %tenant.name, "Tenant restored");
        Ok(tenant)
    }

    pub async fn tenant_health(&self, tenant_name: &str) -> Result<TenantHealth, TenantError> {
        let tenant = self.get_tenant(tenant_name).await?;
        let probe = DatabaseManager::tenant_health_check(&tenant.database).await;
        Ok(TenantHealth {
            name: tenant.name,
            database: tenant.database,
            status: tenant.status,
            is_active: tenant.is_active,
            database_reachable: probe.is_ok(),
            error: probe.err().map(|e| e.to_string()),
        })
    }

    /// Active tenant for a login attempt.
    pub async fn login_tenant(&self, tenant_name: &str) -> Result<Tenant, TenantError> {
        let tenant = self.get_tenant(tenant_name).await?;
        if !tenant.is_active || tenant.trashed_at.is_some() {
            return Err(TenantError::InvalidState(format!("Tenant '{}' is not active", tenant_name)));
        }
        Ok(tenant)
    }

    pub async fn register_device(&self, tenant_name: &str, input: &RegisterDevice) -> Result<RegisteredDevice, TenantError> {
        let tenant = self.get_tenant(tenant_name).await?;
        let secret = Uuid::new_v4().simple().to_string();
        let device = DeviceRepo::insert(
            &self.main_pool,
            tenant.id,
            &input.serial_number,
            &input.model,
            input.location.as_deref(),
            &secret,
        )
        .await?;
        tracing::info!(tenant = %tenant.name, serial = %device.serial_number, "Device registered");
        Ok(RegisteredDevice { device, provisioning_secret: secret })
    }

    pub async fn list_devices(&self, tenant_name: &str) -> Result<Vec<Device>, TenantError> {
        let tenant = self.get_tenant(tenant_name).await?;
        Ok(DeviceRepo::list(&self.main_pool, tenant.id).await?)
    }

    pub async fn revoke_device(&self, tenant_name: &str, device_id: Uuid) -> Result<Device, TenantError> {
        let tenant = self.get_tenant(tenant_name).await?;
        let device = DeviceRepo::revoke(&self.main_pool, tenant.id, device_id)
            .await?
            .ok_or_else(|| TenantError::DeviceNotFound(device_id.to_string()))?;
        tracing::info!(tenant = %tenant.name, serial = %device.serial_number, "Device revoked");
        Ok(device)
    }

    /// Terminal handshake: a pending device presents its serial and secret.
    pub async fn provision_device(&self, serial_number: &str, secret: &str) -> Result<Device, TenantError> {
        let device = DeviceRepo::find_by_secret(&self.main_pool, serial_number, secret)
            .await?
            .ok_or_else(|| TenantError::DeviceNotFound(serial_number.to_string()))?;

        match device.status {
            DeviceStatus::Pending => {
                let device = DeviceRepo::mark_provisioned(&self.main_pool, device.id).await?;
                tracing::info!(serial = %device.serial_number, "Device provisioned");
                Ok(device)
            }
            DeviceStatus::Provisioned => Ok(device),
            DeviceStatus::Revoked => Err(TenantError::InvalidState("Device has been revoked".to_string())),
        }
    }

    pub async fn record_payment(&self, tenant_name: &str, input: &CreatePayment) -> Result<Payment, TenantError> {
        check_payment(input.amount, &input.currency)?;
        let tenant = self.get_tenant(tenant_name).await?;
        let payment = PaymentRepo::insert(
            &self.main_pool,
            tenant.id,
            input.amount,
            &input.currency.to_ascii_uppercase(),
            &input.reference,
        )
        .await?;
        tracing::info!(tenant = %tenant.name, payment_id = %payment.id, amount = %payment.amount, "Payment recorded");
        Ok(payment)
    }

    pub async fn list_payments(&self, tenant_name: &str) -> Result<Vec<Payment>, TenantError> {
        let tenant = self.get_tenant(tenant_name).await?;
        Ok(PaymentRepo::list(&self.main_pool, tenant.id).await?)
    }

    /// Mark a payment paid; the first one activates a tenant awaiting payment.
    pub async fn confirm_payment(&self, tenant_name: &str, payment_id: Uuid) -> Result<ConfirmedPayment, TenantError> {
        let mut tx = self.main_pool.begin().await?;

        let tenant = TenantRepo::find_by_name(&mut *tx, tenant_name)
            .await?
            .ok_or_else(|| TenantError::NotFound(tenant_name.to_string()))?;

        let payment = PaymentRepo::find_for_update(&mut *tx, tenant.id, payment_id)
            .await?
            .ok_or(TenantError::PaymentNotFound(payment_id))?;

        if payment.status == PaymentStatus::Paid {
            return Err(TenantError::InvalidState("Payment is already confirmed".to_string()));
        }

        let payment = PaymentRepo::mark_paid(&mut *tx, payment.id).await?;

        let activated = tenant.status == TenantStatus::PendingPayment && tenant.trashed_at.is_none();
        let tenant = if activated { TenantRepo::activate(&mut *tx, tenant.id).await? } else { tenant };

        tx.commit().await?;

        tracing::info!(tenant = %tenant.name, payment_id = %payment.id, activated, "Payment confirmed");
        Ok(ConfirmedPayment { payment, tenant, activated })
    }
}

/// Hash tenant name to consistent database name
pub fn hash_tenant_name(name: &str) -> String {
    let hash = Sha256::digest(name.as_bytes());
    let hash_str = format!("{:x}", hash);

    // First 16 hex characters keep the name well under Postgres' 63-byte limit
    format!("tenant_{}", &hash_str[..16])
}

/// Validate tenant name follows rules
pub fn validate_tenant_name(name: &str) -> Result<(), TenantError> {
    if name.len() < 2 {
        return Err(TenantError::InvalidName("Tenant name must be at least 2 characters".to_string()));
    }

    if name.len() > 100 {
        return Err(TenantError::InvalidName("Tenant name must be less than 100 characters".to_string()));
    }

    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
        return Err(TenantError::InvalidName(
            "Tenant name can only contain letters, numbers, hyphens, and underscores".to_string(),
        ));
    }

    Ok(())
}

fn check_payment(amount: Decimal, currency: &str) -> Result<(), TenantError> {
    if amount <= Decimal::ZERO {
        return Err(TenantError::InvalidPayment("amount must be positive".to_string()));
    }
    if amount.scale() > 2 {
        return Err(TenantError::InvalidPayment("amount has more than 2 decimal places".to_string()));
    }
    if currency.len() != 3 || !currency.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(TenantError::InvalidPayment("currency must be a 3-letter code".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn tenant_database_names_are_stable_and_valid() {
        let a = hash_tenant_name("acme");
        assert_eq!(a, hash_tenant_name("acme"));
        assert_ne!(a, hash_tenant_name("acme-2"));
        assert_eq!(a.len(), "tenant_".len() + 16);
        assert!(DatabaseManager::is_valid_db_name(&a));
    }

    #[test]
    fn tenant_name_rules() {
        assert!(validate_tenant_name("acme_corp-1").is_ok());
        assert!(validate_tenant_name("a").is_err());
        assert!(validate_tenant_name("acme corp").is_err());
        assert!(validate_tenant_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn payment_rules() {
        assert!(check_payment(Decimal::from_str("49.90").unwrap(), "EUR").is_ok());
        assert!(check_payment(Decimal::ZERO, "EUR").is_err());
        assert!(check_payment(Decimal::from_str("1.999").unwrap(), "EUR").is_err());
        assert!(check_payment(Decimal::from_str("10").unwrap(), "EURO").is_err());
    }
}
