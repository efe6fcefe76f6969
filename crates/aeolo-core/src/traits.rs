//! Common traits for storage and audit collaborators
//!
//! Defines the seams between the allocation engine and whatever owns
//! persistence. The engine only computes; contract counting, plan
//! storage and the change-audit sink all live behind these traits.
//! Everything here is synchronous: a save is one request-scoped
//! computation with no I/O of its own.

use crate::error::AppError;
use crate::models::{Plan, PlanChangeEvent, ProviderGroup};

/// Plan storage
pub trait PlanRepository: Send + Sync {
    /// Find plan by ID
    fn find_by_id(&self, id: i32) -> Result<Option<Plan>, AppError>;

    /// Find the plan carrying exactly this name
    fn find_by_name(&self, name: &str) -> Result<Option<Plan>, AppError>;

    /// Persist a new plan, returning the stored row with its assigned ID
    fn insert(&self, plan: &Plan) -> Result<Plan, AppError>;

    /// Persist changes to an existing plan
    fn update(&self, plan: &Plan) -> Result<Plan, AppError>;

    /// Delete plan by ID
    fn delete(&self, id: i32) -> Result<bool, AppError>;
}

/// Read-only access to provider groups
pub trait ProviderGroupRepository: Send + Sync {
    /// Find provider group by ID
    fn find_by_id(&self, id: i32) -> Result<Option<ProviderGroup>, AppError>;
}

/// Contract bookkeeping for the plans that own them
pub trait ContractRepository: Send + Sync {
    /// Number of contracts currently bound to the plan
    fn count_for_plan(&self, plan_id: i32) -> Result<u64, AppError>;

    /// Remove every contract bound to the plan, returning how many were removed
    fn delete_for_plan(&self, plan_id: i32) -> Result<u64, AppError>;
}

/// Change-audit sink notified about watched-field mutations
pub trait AuditSink: Send + Sync {
    /// Record one change event
    fn record(&self, event: &PlanChangeEvent) -> Result<(), AppError>;
}
