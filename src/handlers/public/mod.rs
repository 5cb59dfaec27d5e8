// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Service info, health, token acquisition and the terminal provisioning
// handshake. Every input here comes from an anonymous caller.
//
// Security Level: None
// Route Prefix: no /api prefix (/, /health, /auth/*, /devices/*)

pub mod auth;    // Token acquisition
pub mod device;  // Biometric terminal handshake
pub mod system;  // Service info and health

pub use auth::*;
pub use device::device_provision;
pub use system::{health, root};
