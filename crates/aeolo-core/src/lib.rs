//! AeoloQoS Core Library
//!
//! This crate provides the foundational types, traits, and error handling
//! for the AeoloQoS plan allocation engine. It includes:
//!
//! - Domain models (plans, provider groups, change events)
//! - Guarded arithmetic for the save-time reconciliation
//! - Common traits for storage and audit collaborators
//! - Unified error handling with stable error codes
//! - Application configuration

pub mod config;
pub mod error;
pub mod math;
pub mod models;
pub mod traits;

pub use config::AppConfig;
pub use error::AppError;

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
