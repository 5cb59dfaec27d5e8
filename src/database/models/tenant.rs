use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::Validate;

crate::text_enum! {
    pub enum TenantStatus {
        PendingPayment => "pending_payment",
        Active => "active",
        Suspended => "suspended",
    }
}

crate::text_enum! {
    pub enum DeviceStatus {
        Pending => "pending",
        Provisioned => "provisioned",
        Revoked => "revoked",
    }
}

crate::text_enum! {
    pub enum PaymentStatus {
        Pending => "pending",
        Paid => "paid",
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Tenant {
    pub id: Uuid,
    pub name: String,
    pub display_name: String,
    pub database: String,
    pub template: String,
    pub host: String,
    pub status: TenantStatus,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub trashed_at: Option<DateTime<Utc>>,
}

/// Biometric terminal registered during onboarding.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Device {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub serial_number: String,
    pub model: String,
    pub location: Option<String>,
    pub status: DeviceStatus,
    /// Only shown in the registration response.
    #[serde(skip_serializing)]
    pub provisioning_secret: String,
    pub provisioned_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Payment {
    pub id: Uuid,
    pub tenant_id: Uuid,
    pub amount: Decimal,
    pub currency: String,
    pub reference: String,
    pub status: PaymentStatus,
    pub paid_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// First administrator seeded into a new tenant database.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct TenantAdmin {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 2, max = 100))]
    pub auth: String,
    #[validate(length(min = 8, message = "must be at least 8 characters"))]
    pub password: String,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateTenant {
    #[validate(length(min = 2, max = 100))]
    pub name: String,
    pub display_name: Option<String>,
    pub template: Option<String>,
    #[validate(nested)]
    pub admin: TenantAdmin,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateTenant {
    #[validate(length(min = 1, max = 200))]
    pub display_name: Option<String>,
    pub status: Option<TenantStatus>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterDevice {
    #[validate(length(min = 3, max = 64))]
    pub serial_number: String,
    #[validate(length(min = 1, max = 100))]
    pub model: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreatePayment {
    pub amount: Decimal,
    #[validate(length(equal = 3, message = "must be a 3-letter ISO code"))]
    pub currency: String,
    #[validate(length(min = 1, max = 100))]
    pub reference: String,
}
