// handlers/mod.rs - 3-Tier Handler Architecture
//
// Public (no auth) → Protected (JWT auth) → Elevated (sudo JWT auth)
//
// Declare the three security tiers
pub mod public;    // Tier 1: No authentication required (/, /health, /auth/*, /devices/*)
pub mod protected; // Tier 2: JWT authentication required (/api/*)
pub mod elevated;  // Tier 3: Sudo JWT authentication required (/api/root/*)

use crate::config;
use crate::types::Page;

/// Clamp a list request to the configured page size.
pub(crate) fn page_window(page: &Page) -> (i64, i64) {
    page.window(config::config().api.max_page_size)
}

/*
MIDDLEWARE PER TIER (see routes.rs):

public     → none
protected  → jwt_auth → validate_tenant → validate_user
elevated   → jwt_auth → require_sudo

Protected handlers read the request context from extensions:
- AuthUser        claims of the bearer token
- ValidatedTenant registry row of the caller's tenant
- TenantPool      connection pool of the tenant database
- ValidatedUser   user row, role and visible scopes

Elevated handlers only touch the registry database through TenantService.
*/
