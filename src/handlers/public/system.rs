// handlers/public/system.rs - GET / and GET /health

use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::manager::DatabaseManager;

/// GET / - Service name, version and endpoint map
pub async fn root() -> Json<Value> {
    Json(json!({
        "success": true,
        "data": {
            "name": "OpsDesk API",
            "version": env!("CARGO_PKG_VERSION"),
            "description": "Multi-tenant HR and operations backend: assets, assignments, maintenance",
            "endpoints": {
                "home": "/ (public)",
                "health": "/health (public)",
                "public_auth": "/auth/login/:tenant/:user, /auth/refresh/:tenant/:user (public)",
                "devices": "/devices/provision (public, terminal handshake)",
                "auth": "/api/auth/whoami, /api/auth/sudo (protected)",
                "assets": "/api/assets[/:id[/movements|/assignments|/maintenance]] (protected)",
                "assignments": "/api/assignments[/:id[/extend|/return]] (protected)",
                "maintenance": "/api/maintenance[/:id] (protected)",
                "users": "/api/users, /api/roles, /api/scopes (protected)",
                "options": "/api/options/:kind (protected)",
                "notifications": "/api/notifications (protected)",
                "skeleton": "/api/skeleton[/:token] (protected)",
                "root": "/api/root/tenant/* (requires sudo)",
            }
        }
    }))
}

/// GET /health - Registry database reachability
pub async fn health() -> impl IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::warn!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "error": "database unavailable",
                    "data": {
                        "status": "degraded",
                        "timestamp": now,
                        "database_error": e.to_string()
                    }
                })),
            )
        }
    }
}
