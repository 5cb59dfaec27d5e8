// handlers/elevated/mod.rs - Elevated handlers (sudo JWT required)
//
// Registry-level administration that spans tenants. A root user obtains a
// short-lived token from POST /api/auth/sudo and presents it here.
//
// Security Level: Sudo JWT Authentication Required
// Route Prefix: /api/root/*
// Middleware: jwt_auth → require_sudo

pub mod root; // Root administrative operations

pub use root::*;
