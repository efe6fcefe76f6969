//! In-memory collaborators for exercising the allocation pipeline end to end

use std::collections::HashMap;
use std::sync::Arc;

use aeolo_core::models::{Plan, PlanChangeEvent, ProviderGroup};
use aeolo_core::traits::{AuditSink, ContractRepository, PlanRepository, ProviderGroupRepository};
use aeolo_core::{AppConfig, AppError};
use aeolo_engine::{NewPlan, PlanService};
use chrono::Utc;
use parking_lot::Mutex;

/// Plan storage backed by a Vec
#[derive(Default)]
pub struct InMemoryPlans {
    rows: Mutex<Vec<Plan>>,
    next_id: Mutex<i32>,
}

impl InMemoryPlans {
    pub fn len(&self) -> usize {
        self.rows.lock().len()
    }
}

impl PlanRepository for InMemoryPlans {
    fn find_by_id(&self, id: i32) -> Result<Option<Plan>, AppError> {
        Ok(self.rows.lock().iter().find(|p| p.id == id).cloned())
    }

    fn find_by_name(&self, name: &str) -> Result<Option<Plan>, AppError> {
        Ok(self.rows.lock().iter().find(|p| p.name == name).cloned())
    }

    fn insert(&self, plan: &Plan) -> Result<Plan, AppError> {
        let mut next_id = self.next_id.lock();
        *next_id += 1;

        let mut stored = plan.clone();
        stored.id = *next_id;
        self.rows.lock().push(stored.clone());
        Ok(stored)
    }

    fn update(&self, plan: &Plan) -> Result<Plan, AppError> {
        let mut rows = self.rows.lock();
        match rows.iter_mut().find(|p| p.id == plan.id) {
            Some(row) => {
                *row = plan.clone();
                Ok(plan.clone())
            }
            None => Err(AppError::Storage(format!("no plan row with id {}", plan.id))),
        }
    }

    fn delete(&self, id: i32) -> Result<bool, AppError> {
        let mut rows = self.rows.lock();
        let before = rows.len();
        rows.retain(|p| p.id != id);
        Ok(rows.len() < before)
    }
}

/// Fixed set of provider groups
pub struct InMemoryGroups {
    rows: Vec<ProviderGroup>,
}

impl InMemoryGroups {
    pub fn with(rows: Vec<ProviderGroup>) -> Self {
        Self { rows }
    }
}

impl ProviderGroupRepository for InMemoryGroups {
    fn find_by_id(&self, id: i32) -> Result<Option<ProviderGroup>, AppError> {
        Ok(self.rows.iter().find(|g| g.id == id).cloned())
    }
}

/// Contract counts keyed by plan ID
#[derive(Default)]
pub struct InMemoryContracts {
    counts: Mutex<HashMap<i32, u64>>,
}

impl InMemoryContracts {
    /// Pretend `count` contracts are bound to the plan
    pub fn bind(&self, plan_id: i32, count: u64) {
        self.counts.lock().insert(plan_id, count);
    }

    pub fn count(&self, plan_id: i32) -> u64 {
        self.counts.lock().get(&plan_id).copied().unwrap_or(0)
    }
}

impl ContractRepository for InMemoryContracts {
    fn count_for_plan(&self, plan_id: i32) -> Result<u64, AppError> {
        Ok(self.count(plan_id))
    }

    fn delete_for_plan(&self, plan_id: i32) -> Result<u64, AppError> {
        Ok(self.counts.lock().remove(&plan_id).unwrap_or(0))
    }
}

/// Audit sink that keeps every event it is handed
#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<PlanChangeEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<PlanChangeEvent> {
        self.events.lock().clone()
    }
}

impl AuditSink for RecordingSink {
    fn record(&self, event: &PlanChangeEvent) -> Result<(), AppError> {
        self.events.lock().push(event.clone());
        Ok(())
    }
}

/// Audit sink that always fails
pub struct FailingSink;

impl AuditSink for FailingSink {
    fn record(&self, _event: &PlanChangeEvent) -> Result<(), AppError> {
        Err(AppError::Audit("sink offline".to_string()))
    }
}

pub fn provider_group(
    id: i32,
    rate_up: u64,
    rate_down: u64,
    total_cir_up: u64,
    total_cir_down: u64,
) -> ProviderGroup {
    ProviderGroup {
        id,
        name: format!("pool-{}", id),
        rate_up,
        rate_down,
        total_cir_up,
        total_cir_down,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Baseline plan input bound to group 1; tests tweak what they need
pub fn new_plan(name: &str) -> NewPlan {
    NewPlan {
        name: name.to_string(),
        provider_group_id: Some(1),
        ceil_up: 1000,
        ceil_down: 1000,
        burst_up: 16,
        burst_down: 16,
        long_download_max: 5,
        long_upload_max: 5,
        how_use_cir: None,
        cir_percentage: None,
        value_cir_re_used: None,
        total_cir_up: 0,
        total_cir_down: 0,
    }
}

pub struct Harness {
    pub plans: Arc<InMemoryPlans>,
    pub contracts: Arc<InMemoryContracts>,
    pub sink: Arc<RecordingSink>,
    pub service: PlanService<InMemoryPlans, InMemoryGroups, InMemoryContracts, RecordingSink>,
}

/// Service wired to in-memory stores and one provider group (ID 1)
pub fn harness() -> Harness {
    harness_with_config(AppConfig::default())
}

pub fn harness_with_config(config: AppConfig) -> Harness {
    let plans = Arc::new(InMemoryPlans::default());
    let groups = Arc::new(InMemoryGroups::with(vec![provider_group(
        1, 8000, 4000, 5000, 8000,
    )]));
    let contracts = Arc::new(InMemoryContracts::default());
    let sink = Arc::new(RecordingSink::default());
    let service = PlanService::new(
        plans.clone(),
        groups,
        contracts.clone(),
        sink.clone(),
        config,
    );

    Harness {
        plans,
        contracts,
        sink,
        service,
    }
}
