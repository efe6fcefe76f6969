//! Application configuration
//!
//! This module provides centralized configuration management using the `config` crate.
//! Configuration can be loaded from environment variables and config files.

use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

use crate::AppResult;

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub allocation: AllocationConfig,
    pub audit: AuditConfig,
}

/// Allocation engine configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AllocationConfig {
    /// Reuse ratio applied when a plan carries no explicit CIR input,
    /// written as "guaranteed:sold" ("1:1" commits the full ceiling)
    #[serde(default = "default_reuse_ratio")]
    pub default_reuse_ratio: String,
}

fn default_reuse_ratio() -> String {
    "1:1".to_string()
}

/// Change-audit configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AuditConfig {
    /// Whether watched-field change events are recorded
    #[serde(default = "default_audit_enabled")]
    pub enabled: bool,
}

fn default_audit_enabled() -> bool {
    true
}

impl AppConfig {
    /// Load configuration from environment and optional config file
    pub fn load() -> AppResult<Self> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = Config::builder()
            // Start with default values
            .set_default("allocation.default_reuse_ratio", "1:1")?
            .set_default("audit.enabled", true)?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{}", run_mode)).required(false))
            // Load from environment variables with AEOLO_ prefix
            .add_source(
                Environment::with_prefix("AEOLO")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Ok(config.try_deserialize()?)
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &str) -> AppResult<Self> {
        let config = Config::builder()
            .add_source(File::with_name(path))
            .add_source(Environment::with_prefix("AEOLO").separator("__"))
            .build()?;

        Ok(config.try_deserialize()?)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            allocation: AllocationConfig::default(),
            audit: AuditConfig::default(),
        }
    }
}

impl Default for AllocationConfig {
    fn default() -> Self {
        Self {
            default_reuse_ratio: "1:1".to_string(),
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}
