pub mod auth;
pub mod cli;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod inventory;
pub mod middleware;
pub mod routes;
pub mod scope;
pub mod services;
pub mod types;
