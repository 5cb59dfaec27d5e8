// handlers/elevated/root/mod.rs - Root administrative handlers

pub mod tenant; // Tenant lifecycle, devices and payments

pub use tenant::*;
