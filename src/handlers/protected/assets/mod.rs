// handlers/protected/assets/mod.rs - Asset catalogue handlers

pub mod collection; // GET/POST /api/assets
pub mod history;    // GET /api/assets/:id/{movements,assignments,maintenance}
pub mod record;     // GET/PUT/DELETE /api/assets/:id

pub use collection::{assets_get, assets_post};
pub use history::{asset_assignments_get, asset_maintenance_get, asset_movements_get};
pub use record::{asset_delete, asset_get, asset_put};
