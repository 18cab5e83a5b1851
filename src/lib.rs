// src/lib.rs
pub mod admin;
pub mod app;
pub mod config;
pub mod embed;
pub mod health;
pub mod metrics;
pub mod options;
pub mod sanitize;
pub mod server;

pub use app::App;
