//! Plan allocation service
//!
//! Orchestrates the plan lifecycle as one synchronous pipeline:
//! validate, reconcile the CIR bookkeeping, persist, then notify the
//! audit sink about watched-field changes. Also answers the
//! per-contract share queries the shaping generator consumes.

use std::sync::Arc;

use aeolo_core::models::{parse_ratio, CirMode, Plan, PlanChangeEvent};
use aeolo_core::traits::{AuditSink, ContractRepository, PlanRepository, ProviderGroupRepository};
use aeolo_core::{AppConfig, AppError, AppResult};
use chrono::Utc;
use serde::Deserialize;
use tracing::{debug, info, instrument, warn};

use crate::validation::validate_plan;

/// Raw inputs for saving a plan
///
/// Carries the caller-facing surface: capacity figures plus the CIR
/// mode selector and its per-mode payload. Everything derived is
/// computed by the service, never taken from the caller.
#[derive(Debug, Clone, Deserialize)]
pub struct NewPlan {
    /// Plan name, unique across all plans
    pub name: String,

    /// Provider group whose pool the plan draws from
    pub provider_group_id: Option<i32>,

    /// Upload ceiling rate in kbit/s
    pub ceil_up: u32,

    /// Download ceiling rate in kbit/s
    pub ceil_down: u32,

    /// Upload burst allowance in kbit
    #[serde(default)]
    pub burst_up: u32,

    /// Download burst allowance in kbit
    #[serde(default)]
    pub burst_down: u32,

    /// Long-transfer download threshold in kbyte
    #[serde(default)]
    pub long_download_max: u64,

    /// Long-transfer upload threshold in kbyte
    #[serde(default)]
    pub long_upload_max: u64,

    /// CIR mode selector: "total_cir", "percentage" or "re_used"
    #[serde(default)]
    pub how_use_cir: Option<String>,

    /// Fraction of the ceiling to guarantee, read in percentage mode
    #[serde(default)]
    pub cir_percentage: Option<f64>,

    /// Reuse ratio expression (for example "1:4"), read in re_used mode
    #[serde(default)]
    pub value_cir_re_used: Option<String>,

    /// Committed upload total in kbit/s, authoritative in total_cir mode
    #[serde(default)]
    pub total_cir_up: u64,

    /// Committed download total in kbit/s, authoritative in total_cir mode
    #[serde(default)]
    pub total_cir_down: u64,
}

/// Per-contract share of a plan's provider-group-bounded capacity
#[derive(Debug, Clone)]
pub struct ContractShare {
    /// Committed upload capacity after the group bound, in kbit/s
    pub real_total_cir_up: u64,

    /// Committed download capacity after the group bound, in kbit/s
    pub real_total_cir_down: u64,

    /// Upload capacity each contract receives, in kbit/s
    pub cir_factor_up: u64,

    /// Download capacity each contract receives, in kbit/s
    pub cir_factor_down: u64,
}

/// Plan allocation service
///
/// Owns the storage and audit collaborators and runs the
/// validate / reconcile / persist pipeline on every save.
pub struct PlanService<P, G, C, S>
where
    P: PlanRepository,
    G: ProviderGroupRepository,
    C: ContractRepository,
    S: AuditSink,
{
    plans: Arc<P>,
    groups: Arc<G>,
    contracts: Arc<C>,
    audit: Arc<S>,
    config: AppConfig,
}

impl<P, G, C, S> PlanService<P, G, C, S>
where
    P: PlanRepository,
    G: ProviderGroupRepository,
    C: ContractRepository,
    S: AuditSink,
{
    /// Create a new plan service
    pub fn new(
        plans: Arc<P>,
        groups: Arc<G>,
        contracts: Arc<C>,
        audit: Arc<S>,
        config: AppConfig,
    ) -> Self {
        Self {
            plans,
            groups,
            contracts,
            audit,
            config,
        }
    }

    /// Create a plan from raw inputs.
    ///
    /// # Arguments
    /// * `input` - Caller-supplied plan fields and CIR mode selection
    ///
    /// # Returns
    /// The stored plan with its assigned ID and reconciled CIR bookkeeping
    ///
    /// # Errors
    /// `AppError::Validation` carrying every violation when the gate
    /// refuses the input; storage errors pass through unchanged
    #[instrument(skip(self, input))]
    pub fn create(&self, input: NewPlan) -> AppResult<Plan> {
        debug!(name = %input.name, "Creating plan");

        let mut plan = self.plan_from_input(input);
        validate_plan(&plan, &*self.plans, &*self.groups)?;

        let contract_count = self.contracts.count_for_plan(plan.id)?;
        plan.reconcile_cir(contract_count);

        let created = self.plans.insert(&plan)?;

        info!(id = created.id, name = %created.name, "Plan created");

        self.emit(PlanChangeEvent::created(&created));

        Ok(created)
    }

    /// Update an existing plan.
    ///
    /// Reconciles the CIR bookkeeping against the current contract
    /// count before persisting, then emits one change event when any
    /// watched field moved.
    #[instrument(skip(self, plan))]
    pub fn update(&self, mut plan: Plan) -> AppResult<Plan> {
        debug!(id = plan.id, "Updating plan");

        let before = self
            .plans
            .find_by_id(plan.id)?
            .ok_or_else(|| AppError::PlanNotFound(plan.id.to_string()))?;

        validate_plan(&plan, &*self.plans, &*self.groups)?;

        let contract_count = self.contracts.count_for_plan(plan.id)?;
        plan.reconcile_cir(contract_count);
        plan.updated_at = Utc::now();

        let updated = self.plans.update(&plan)?;

        info!(id = updated.id, name = %updated.name, "Plan updated");

        if let Some(event) = PlanChangeEvent::updated(&before, &updated) {
            self.emit(event);
        }

        Ok(updated)
    }

    /// Delete a plan together with the contracts bound to it
    #[instrument(skip(self))]
    pub fn delete(&self, plan_id: i32) -> AppResult<()> {
        let plan = self
            .plans
            .find_by_id(plan_id)?
            .ok_or_else(|| AppError::PlanNotFound(plan_id.to_string()))?;

        let removed = self.contracts.delete_for_plan(plan_id)?;
        self.plans.delete(plan_id)?;

        info!(id = plan_id, contracts = removed, "Plan deleted");

        self.emit(PlanChangeEvent::deleted(&plan));

        Ok(())
    }

    /// Per-contract share of the plan's provider-group-bounded capacity.
    ///
    /// # Errors
    /// `AppError::DivisionByZero` when the plan has no contracts or the
    /// group pool is empty; unlike the save-time reconciliation these
    /// queries never substitute sentinel values
    #[instrument(skip(self))]
    pub fn contract_share(&self, plan_id: i32) -> AppResult<ContractShare> {
        let plan = self
            .plans
            .find_by_id(plan_id)?
            .ok_or_else(|| AppError::PlanNotFound(plan_id.to_string()))?;

        let group_id = plan.provider_group_id.ok_or_else(|| {
            AppError::ProviderGroupNotFound(format!("plan {} has no provider group", plan_id))
        })?;
        let group = self
            .groups
            .find_by_id(group_id)?
            .ok_or_else(|| AppError::ProviderGroupNotFound(group_id.to_string()))?;

        let contract_count = self.contracts.count_for_plan(plan_id)?;

        Ok(ContractShare {
            real_total_cir_up: plan.real_total_cir_up(&group)?,
            real_total_cir_down: plan.real_total_cir_down(&group)?,
            cir_factor_up: plan.cir_factor_up(&group, contract_count)?,
            cir_factor_down: plan.cir_factor_down(&group, contract_count)?,
        })
    }

    /// Resolve the reuse multiplier, falling back to the configured default
    fn resolve_reuse_ratio(&self, raw: Option<&str>) -> f64 {
        raw.and_then(parse_ratio)
            .or_else(|| parse_ratio(&self.config.allocation.default_reuse_ratio))
            .unwrap_or(1.0)
    }

    /// Build the unsaved plan record from raw inputs
    fn plan_from_input(&self, input: NewPlan) -> Plan {
        let reuse = self.resolve_reuse_ratio(input.value_cir_re_used.as_deref());
        let cir_mode = CirMode::from_selector(
            input.how_use_cir.as_deref().unwrap_or_default(),
            input.cir_percentage.unwrap_or(0.0),
            reuse,
        );
        let now = Utc::now();

        Plan {
            id: 0,
            name: input.name,
            provider_group_id: input.provider_group_id,
            ceil_up: input.ceil_up,
            ceil_down: input.ceil_down,
            burst_up: input.burst_up,
            burst_down: input.burst_down,
            long_download_max: input.long_download_max,
            long_upload_max: input.long_upload_max,
            cir_mode,
            cir_up: 0.0,
            cir_down: 0.0,
            total_cir_up: input.total_cir_up,
            total_cir_down: input.total_cir_down,
            created_at: now,
            updated_at: now,
        }
    }

    /// Record the event unless auditing is disabled.
    ///
    /// Sink failures are logged and swallowed; a save never fails
    /// because the audit trail is unavailable.
    fn emit(&self, event: PlanChangeEvent) {
        if !self.config.audit.enabled {
            return;
        }
        if let Err(e) = self.audit.record(&event) {
            warn!(
                plan_id = event.plan_id,
                action = %event.action,
                "Failed to record change event: {}",
                e
            );
        }
    }
}
