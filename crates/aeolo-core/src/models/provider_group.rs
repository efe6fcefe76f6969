//! Provider group model
//!
//! A provider group pools the aggregate capacity that every plan under
//! it draws from. The allocation engine reads groups, never mutates them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Provider group representing a shared capacity pool
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderGroup {
    /// Unique group ID
    pub id: i32,

    /// Human-readable group name
    pub name: String,

    /// Aggregate upload rate of the pool in kbit/s
    pub rate_up: u64,

    /// Aggregate download rate of the pool in kbit/s
    pub rate_down: u64,

    /// Committed upload capacity across the pool in kbit/s
    pub total_cir_up: u64,

    /// Committed download capacity across the pool in kbit/s
    pub total_cir_down: u64,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last update timestamp
    pub updated_at: DateTime<Utc>,
}

impl Default for ProviderGroup {
    fn default() -> Self {
        Self {
            id: 0,
            name: String::new(),
            rate_up: 0,
            rate_down: 0,
            total_cir_up: 0,
            total_cir_down: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }
}
