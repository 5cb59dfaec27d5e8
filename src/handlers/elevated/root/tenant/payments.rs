// handlers/elevated/root/tenant/payments.rs - Onboarding payments of a tenant

use axum::{extract::Path, Json};
use uuid::Uuid;
use validator::Validate;

use crate::database::models::{CreatePayment, Payment};
use crate::middleware::{ApiResponse, ApiResult};
use crate::services::tenant_service::{ConfirmedPayment, TenantService};

/// GET /api/root/tenant/:name/payments
pub async fn payments_list(Path(name): Path<String>) -> ApiResult<Vec<Payment>> {
    let payments = TenantService::new().await?.list_payments(&name).await?;
    Ok(ApiResponse::success(payments))
}

/// POST /api/root/tenant/:name/payments - Record a payment as pending
pub async fn payment_record(Path(name): Path<String>, Json(payload): Json<CreatePayment>) -> ApiResult<Payment> {
    payload.validate()?;
    let payment = TenantService::new().await?.record_payment(&name, &payload).await?;
    Ok(ApiResponse::created(payment))
}

/// POST /api/root/tenant/:name/payments/:id/confirm
///
/// Marks the payment paid. When the tenant is still `pending_payment` it is
/// activated in the same transaction.
pub async fn payment_confirm(Path((name, id)): Path<(String, Uuid)>) -> ApiResult<ConfirmedPayment> {
    let confirmed = TenantService::new().await?.confirm_payment(&name, id).await?;
    Ok(ApiResponse::success(confirmed))
}
