// trattoria_server/src/lib.rs

//! HTTP service for Trattoria: configuration, logging, store startup, and the
//! actix-web routes over the `trattoria` domain services.

pub mod config;
pub mod errors;
pub mod seed;
pub mod startup;
pub mod state;
pub mod telemetry;
pub mod web;

pub use config::AppConfig;
pub use errors::AppError;
pub use state::AppState;
