pub mod asset_repo;
pub mod assignment_repo;
pub mod maintenance_repo;
pub mod movement_repo;
pub mod notification_repo;
pub mod role_repo;
pub mod scope_repo;
pub mod tenant_repo;
pub mod user_repo;

pub use asset_repo::AssetRepo;
pub use assignment_repo::AssignmentRepo;
pub use maintenance_repo::MaintenanceRepo;
pub use movement_repo::MovementRepo;
pub use notification_repo::NotificationRepo;
pub use role_repo::RoleRepo;
pub use scope_repo::ScopeRepo;
pub use tenant_repo::{DeviceRepo, PaymentRepo, TenantRepo};
pub use user_repo::UserRepo;
