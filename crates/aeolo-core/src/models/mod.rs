//! Domain models for AeoloQoS
//!
//! This module contains all the core domain models used throughout the engine.

pub mod change;
pub mod plan;
pub mod provider_group;

pub use change::{ChangeAction, FieldChange, PlanChangeEvent, WATCHED_FIELDS};
pub use plan::{parse_ratio, CirMode, Plan};
pub use provider_group::ProviderGroup;
