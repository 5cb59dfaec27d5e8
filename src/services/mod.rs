pub mod asset_service;
pub mod tenant_service;

pub use asset_service::{AssetError, AssetService, MaintenanceOutcome, MovementOutcome};
pub use tenant_service::{TenantError, TenantService};
