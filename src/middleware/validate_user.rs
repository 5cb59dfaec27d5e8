use axum::{extract::Request, middleware::Next, response::Response};
use uuid::Uuid;

use super::auth::AuthUser;
use super::validate_tenant::TenantPool;
use crate::database::models::Role;
use crate::database::repositories::{RoleRepo, ScopeRepo, UserRepo};
use crate::error::ApiError;
use crate::scope::ScopeTree;
use crate::types::Access;

/// User loaded from the tenant database for this request
#[derive(Clone, Debug)]
pub struct ValidatedUser {
    pub id: Uuid,
    pub name: String,
    pub auth: String,
    pub access: Access,
    pub role: Option<Role>,
    pub scope_id: Option<Uuid>,
    /// Scopes whose rows this user may see; `None` means unrestricted.
    pub visible_scopes: Option<Vec<Uuid>>,
}

impl ValidatedUser {
    /// Require at least `required` access, and for writes, the role permission.
    ///
    /// `full` and `root` users are not subject to role permissions.
    pub fn authorize(&self, required: Access, permission: Option<&str>) -> Result<(), ApiError> {
        check_access(self.access, self.role.as_ref(), required, permission)
    }

    pub fn scope_filter(&self) -> Option<&[Uuid]> {
        self.visible_scopes.as_deref()
    }

    /// Whether a row in `scope_id` is visible. Unscoped rows are visible to all.
    pub fn can_see(&self, scope_id: Option<Uuid>) -> bool {
        match (&self.visible_scopes, scope_id) {
            (None, _) | (_, None) => true,
            (Some(visible), Some(scope)) => visible.contains(&scope),
        }
    }
}

pub fn check_access(
    access: Access,
    role: Option<&Role>,
    required: Access,
    permission: Option<&str>,
) -> Result<(), ApiError> {
    if !access.allows(required) {
        return Err(ApiError::forbidden(format!("Requires {} access", required)));
    }
    if access.allows(Access::Full) {
        return Ok(());
    }
    match (role, permission) {
        (Some(role), Some(permission)) if !role.grants(permission) => Err(ApiError::forbidden(format!(
            "Role '{}' does not grant '{}'",
            role.name, permission
        ))),
        _ => Ok(()),
    }
}

/// Middleware that validates the user from JWT claims against the tenant's users table
/// Ensures the user exists, is not soft-deleted and still matches the token
pub async fn validate_user_middleware(mut request: Request, next: Next) -> Result<Response, ApiError> {
    let auth_user = request
        .extensions()
        .get::<AuthUser>()
        .ok_or_else(|| ApiError::unauthorized("JWT authentication required before user validation"))?
        .clone();

    let TenantPool(tenant_pool) = request
        .extensions()
        .get::<TenantPool>()
        .ok_or_else(|| ApiError::internal_server_error("Tenant pool required before user validation"))?
        .clone();

    let user = UserRepo::find_by_id(&tenant_pool, auth_user.user_id).await?.ok_or_else(|| {
        tracing::warn!(user = %auth_user.user, user_id = %auth_user.user_id, tenant = %auth_user.tenant,
            "User validation failed: not found or deleted");
        ApiError::forbidden(format!("User '{}' is not active in tenant '{}'", auth_user.user, auth_user.tenant))
    })?;

    if user.auth != auth_user.user {
        tracing::warn!(jwt = %auth_user.user, db = %user.auth, "User authentication mismatch");
        return Err(ApiError::forbidden("User authentication mismatch"));
    }

    // Access changed since the token was issued; force a new login
    if user.access != auth_user.access {
        tracing::warn!(jwt = %auth_user.access, db = %user.access, "User access level mismatch");
        return Err(ApiError::forbidden("User access level mismatch"));
    }

    if user.access == Access::Deny {
        tracing::warn!(user = %user.auth, "User has deny access");
        return Err(ApiError::forbidden("User access denied"));
    }

    let role = match user.role_id {
        Some(role_id) => RoleRepo::find_by_id(&tenant_pool, role_id).await?,
        None => None,
    };

    let visible_scopes = if user.access.allows(Access::Full) {
        None
    } else {
        match user.scope_id {
            Some(scope_id) => {
                let tree = ScopeTree::new(&ScopeRepo::list(&tenant_pool).await?);
                Some(tree.descendants(scope_id))
            }
            None => Some(Vec::new()),
        }
    };

    let validated_user = ValidatedUser {
        id: user.id,
        name: user.name,
        auth: user.auth,
        access: user.access,
        role,
        scope_id: user.scope_id,
        visible_scopes,
    };

    tracing::debug!(user = %validated_user.auth, access = %validated_user.access, tenant = %auth_user.tenant,
        "User validated");

    request.extensions_mut().insert(validated_user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn role(permissions: &[&str]) -> Role {
        Role {
            id: Uuid::new_v4(),
            name: "clerk".into(),
            permissions: permissions.iter().map(|p| p.to_string()).collect(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn access_levels_gate_verbs() {
        assert!(check_access(Access::Read, None, Access::Read, None).is_ok());
        let err = check_access(Access::Read, None, Access::Edit, Some("assets.assign")).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }

    #[test]
    fn roles_restrict_edit_users_but_not_full() {
        let clerk = role(&["assets.return"]);
        assert!(check_access(Access::Edit, Some(&clerk), Access::Edit, Some("assets.return")).is_ok());
        assert!(check_access(Access::Edit, Some(&clerk), Access::Edit, Some("assets.assign")).is_err());
        assert!(check_access(Access::Full, Some(&clerk), Access::Edit, Some("assets.assign")).is_ok());
    }

    #[test]
    fn scope_visibility() {
        let team = Uuid::new_v4();
        let user = ValidatedUser {
            id: Uuid::new_v4(),
            name: "Sam".into(),
            auth: "sam".into(),
            access: Access::Edit,
            role: None,
            scope_id: Some(team),
            visible_scopes: Some(vec![team]),
        };
        assert!(user.can_see(Some(team)));
        assert!(user.can_see(None));
        assert!(!user.can_see(Some(Uuid::new_v4())));
    }
}
