// handlers/elevated/root/tenant/mod.rs - Tenant management handlers
//
// Lifecycle of a tenant from onboarding to trash, plus the biometric
// terminals and payments recorded while onboarding.

pub mod create;   // POST /api/root/tenant
pub mod delete;   // DELETE /api/root/tenant/:name
pub mod devices;  // GET/POST /api/root/tenant/:name/devices, POST .../devices/:id/revoke
pub mod health;   // GET /api/root/tenant/:name/health
pub mod list;     // GET /api/root/tenant
pub mod payments; // GET/POST /api/root/tenant/:name/payments, POST .../payments/:id/confirm
pub mod restore;  // POST /api/root/tenant/:name/restore
pub mod show;     // GET /api/root/tenant/:name
pub mod update;   // PUT /api/root/tenant/:name

pub use create::tenant_create;
pub use delete::tenant_delete;
pub use devices::{device_register, device_revoke, devices_list};
pub use health::tenant_health;
pub use list::tenant_list;
pub use payments::{payment_confirm, payment_record, payments_list};
pub use restore::tenant_restore;
pub use show::tenant_show;
pub use update::tenant_update;
