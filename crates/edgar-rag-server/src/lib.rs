pub mod cache;
pub mod config;
pub mod document;
pub mod handlers;
pub mod models;
pub mod providers;
pub mod router;
pub mod services;
pub mod utils;
