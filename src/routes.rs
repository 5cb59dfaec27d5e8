use axum::{
    http::{HeaderName, HeaderValue, Method},
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::config;
use crate::handlers::{elevated, protected, public};
use crate::middleware::{
    jwt_auth_middleware, require_sudo_middleware, validate_tenant_middleware, validate_user_middleware,
};

/// Full application router with global layers.
pub fn app() -> Router {
    Router::new()
        .merge(public_routes())
        .merge(protected_routes())
        .merge(elevated_routes())
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(cors_layer()))
}

fn public_routes() -> Router {
    Router::new()
        .route("/", get(public::root))
        .route("/health", get(public::health))
        .route("/auth/login/:tenant/:user", post(public::login_post))
        .route("/auth/refresh/:tenant/:user", post(public::refresh_post))
        .route("/devices/provision", post(public::device_provision))
}

fn protected_routes() -> Router {
    use protected::{assets, assignments, auth, maintenance, notifications, options, roles, scopes, skeleton, users};

    Router::new()
        // Session
        .route("/api/auth/whoami", get(auth::whoami_get))
        .route("/api/auth/sudo", post(auth::sudo_post))
        // Assets
        .route("/api/assets", get(assets::assets_get).post(assets::assets_post))
        .route(
            "/api/assets/:id",
            get(assets::asset_get).put(assets::asset_put).delete(assets::asset_delete),
        )
        .route("/api/assets/:id/movements", get(assets::asset_movements_get))
        .route("/api/assets/:id/assignments", get(assets::asset_assignments_get))
        .route("/api/assets/:id/maintenance", get(assets::asset_maintenance_get))
        // Assignments
        .route("/api/assignments", post(assignments::assignments_post))
        .route(
            "/api/assignments/:id",
            get(assignments::assignment_get).delete(assignments::assignment_delete),
        )
        .route("/api/assignments/:id/extend", post(assignments::assignment_extend_post))
        .route("/api/assignments/:id/return", post(assignments::assignment_return_post))
        // Maintenance
        .route("/api/maintenance", post(maintenance::maintenance_post))
        .route("/api/maintenance/:id", put(maintenance::maintenance_put))
        // People and organisation
        .route("/api/users", get(users::users_get).post(users::users_post))
        .route(
            "/api/users/:id",
            get(users::user_get).put(users::user_put).delete(users::user_delete),
        )
        .route("/api/roles", get(roles::roles_get).post(roles::roles_post))
        .route("/api/roles/:id", put(roles::role_put).delete(roles::role_delete))
        .route("/api/scopes", get(scopes::scopes_get).post(scopes::scopes_post))
        .route("/api/scopes/:id", delete(scopes::scope_delete))
        // Lookups, inbox, tokens
        .route("/api/options/:kind", get(options::options_get))
        .route("/api/notifications", get(notifications::notifications_get))
        .route("/api/notifications/:id/read", post(notifications::notification_read_post))
        .route("/api/skeleton", post(skeleton::skeleton_post))
        .route("/api/skeleton/:token", get(skeleton::skeleton_get))
        // Innermost first: user needs the tenant pool, tenant needs the claims
        .route_layer(middleware::from_fn(validate_user_middleware))
        .route_layer(middleware::from_fn(validate_tenant_middleware))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn elevated_routes() -> Router {
    use elevated::tenant;

    Router::new()
        .route("/api/root/tenant", get(tenant::tenant_list).post(tenant::tenant_create))
        .route(
            "/api/root/tenant/:name",
            get(tenant::tenant_show).put(tenant::tenant_update).delete(tenant::tenant_delete),
        )
        .route("/api/root/tenant/:name/restore", post(tenant::tenant_restore))
        .route("/api/root/tenant/:name/health", get(tenant::tenant_health))
        .route(
            "/api/root/tenant/:name/devices",
            get(tenant::devices_list).post(tenant::device_register),
        )
        .route("/api/root/tenant/:name/devices/:id/revoke", post(tenant::device_revoke))
        .route(
            "/api/root/tenant/:name/payments",
            get(tenant::payments_list).post(tenant::payment_record),
        )
        .route("/api/root/tenant/:name/payments/:id/confirm", post(tenant::payment_confirm))
        .route_layer(middleware::from_fn(require_sudo_middleware))
        .route_layer(middleware::from_fn(jwt_auth_middleware))
}

fn cors_layer() -> CorsLayer {
    if crate::is_development!() {
        return CorsLayer::permissive();
    }

    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static("idempotency-key"),
        ])
}
