//! Plan allocation services for AeoloQoS
//!
//! This crate contains the business logic that turns raw plan inputs
//! into consistent, persisted allocation parameters: the validation
//! gate and the save/delete/share pipeline on top of it.
//!
//! # Architecture
//!
//! Services are designed to be composable and testable:
//! - Each service owns its collaborators (repositories, audit sink)
//! - Collaborators are wrapped in Arc for safe sharing
//! - All operations are instrumented with tracing
//! - Comprehensive error handling with AppError
//!
//! # Services
//!
//! - `PlanService` - Plan lifecycle: validate, reconcile CIR bookkeeping,
//!   persist, emit change events, answer per-contract share queries
//! - `validation` - Accumulating validation gate and message rendering

pub mod allocation;
pub mod validation;

pub use allocation::{ContractShare, NewPlan, PlanService};
pub use validation::{render_messages, validate_plan, MessageCatalog, PlainMessages};
