use axum::{extract::Request, middleware::Next, response::Response};
use sqlx::PgPool;

use super::auth::AuthUser;
use crate::database::models::Tenant;
use crate::database::repositories::TenantRepo;
use crate::database::DatabaseManager;
use crate::error::ApiError;

/// Extracted tenant database pool, injected by middleware
#[derive(Clone)]
pub struct TenantPool(pub PgPool);

/// Tenant row from the registry, known to be active
#[derive(Clone, Debug)]
pub struct ValidatedTenant(pub Tenant);

/// Middleware that validates the tenant from JWT claims against the registry.
/// Ensures the tenant exists and is active (not trashed, payment settled)
pub async fn validate_tenant_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before tenant validation"))?
        .clone();

    let main_pool = DatabaseManager::main_pool().await?;

    let tenant = TenantRepo::find_active_by_database(&main_pool, &auth_user.database)
        .await?
        .ok_or_else(|| {
            tracing::warn!(database = %auth_user.database, "Tenant validation failed: not found or inactive");
            ApiError::forbidden(format!("Tenant '{}' is not active or does not exist", auth_user.tenant))
        })?;

    // Token minted for one tenant name must not be replayed against another
    if tenant.name != auth_user.tenant {
        tracing::warn!(claimed = %auth_user.tenant, actual = %tenant.name, "Tenant name mismatch");
        return Err(ApiError::forbidden("Tenant mismatch"));
    }

    let tenant_pool = DatabaseManager::tenant_pool(&tenant.database).await.map_err(|e| {
        tracing::error!(database = %tenant.database, "Failed to get tenant pool: {}", e);
        ApiError::from(e)
    })?;

    tracing::debug!(tenant = %tenant.name, database = %tenant.database, "Tenant validated");

    request.extensions_mut().insert(ValidatedTenant(tenant));
    request.extensions_mut().insert(TenantPool(tenant_pool));

    Ok(next.run(request).await)
}
