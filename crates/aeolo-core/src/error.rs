//! Unified error handling for AeoloQoS
//!
//! This module provides the error type shared by every crate in the
//! workspace, with stable error codes for message catalogs.

use thiserror::Error;

/// Main application error type
///
/// All errors in the workspace should be converted to this type. The
/// codes returned by [`AppError::error_code`] are the stable keys an
/// external catalog resolves to human-readable text.
#[derive(Error, Debug)]
pub enum AppError {
    // ==================== Storage Errors ====================
    #[error("Storage error: {0}")]
    Storage(String),

    // ==================== Arithmetic Errors ====================
    #[error("Division by zero: {0}")]
    DivisionByZero(String),

    // ==================== Business Logic Errors ====================
    #[error("Plan not found: {0}")]
    PlanNotFound(String),

    #[error("Provider group not found: {0}")]
    ProviderGroupNotFound(String),

    // ==================== Validation Errors ====================
    #[error("Validation failed: {0}")]
    Validation(validator::ValidationErrors),

    // ==================== Internal Errors ====================
    #[error("Configuration error: {0}")]
    Config(String),

    // ==================== External Service Errors ====================
    #[error("Audit sink error: {0}")]
    Audit(String),
}

impl AppError {
    /// Returns the error code for the error type
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::Storage(_) => "storage_error",
            AppError::DivisionByZero(_) => "division_by_zero",
            AppError::PlanNotFound(_) => "plan_not_found",
            AppError::ProviderGroupNotFound(_) => "provider_group_not_found",
            AppError::Validation(_) => "validation_error",
            AppError::Config(_) => "config_error",
            AppError::Audit(_) => "audit_error",
        }
    }
}

// ==================== From implementations ====================

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Config(err.to_string())
    }
}
