pub mod asset;
pub mod assignment;
pub mod maintenance;
pub mod movement;
pub mod notification;
pub mod scope;
pub mod tenant;
pub mod user;

pub use asset::{Asset, AssetFilter, AssetStatus, AssetType, CreateAsset, UpdateAsset};
pub use assignment::{AssignAsset, Assignment, AssignmentStatus, ExtendAssignment, ReturnAsset};
pub use maintenance::{CreateMaintenance, Maintenance, MaintenanceStatus, UpdateMaintenance};
pub use movement::{Movement, MovementType, NewMovement};
pub use notification::{NewNotification, Notification};
pub use scope::{CreateScope, Scope, ScopeKind};
pub use tenant::{
    CreatePayment, CreateTenant, Device, DeviceStatus, Payment, PaymentStatus, RegisterDevice, Tenant,
    TenantAdmin, TenantStatus, UpdateTenant,
};
pub use user::{CreateRole, CreateUser, Role, UpdateRole, UpdateUser, User};
