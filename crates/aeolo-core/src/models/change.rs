//! Plan change events
//!
//! Watched-field diffs emitted to the audit sink whenever a plan is
//! created, updated or deleted. Only capacity-relevant fields are
//! watched; renames and derived CIR bookkeeping never produce events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use uuid::Uuid;

use super::plan::Plan;

/// Fields tracked by the change-audit sink
pub const WATCHED_FIELDS: [&str; 7] = [
    "provider_group_id",
    "ceil_down",
    "ceil_up",
    "burst_down",
    "burst_up",
    "long_download_max",
    "long_upload_max",
];

/// What happened to the plan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Deleted,
}

impl std::fmt::Display for ChangeAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChangeAction::Created => write!(f, "created"),
            ChangeAction::Updated => write!(f, "updated"),
            ChangeAction::Deleted => write!(f, "deleted"),
        }
    }
}

/// One watched field's before/after pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldChange {
    /// Watched field name
    pub field: String,

    /// Value before the save (null on creation)
    pub before: JsonValue,

    /// Value after the save (null on deletion)
    pub after: JsonValue,
}

/// Change event describing one plan mutation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlanChangeEvent {
    /// Unique event ID
    pub event_id: Uuid,

    /// What happened
    pub action: ChangeAction,

    /// Affected plan ID
    pub plan_id: i32,

    /// Display name of the affected plan
    pub plan: String,

    /// Before/after pairs for the watched fields that moved
    pub changes: Vec<FieldChange>,

    /// When the event was emitted
    pub occurred_at: DateTime<Utc>,
}

fn watched_value(plan: &Plan, field: &str) -> JsonValue {
    match field {
        "provider_group_id" => json!(plan.provider_group_id),
        "ceil_down" => json!(plan.ceil_down),
        "ceil_up" => json!(plan.ceil_up),
        "burst_down" => json!(plan.burst_down),
        "burst_up" => json!(plan.burst_up),
        "long_download_max" => json!(plan.long_download_max),
        "long_upload_max" => json!(plan.long_upload_max),
        _ => JsonValue::Null,
    }
}

fn watched_values(plan: &Plan) -> Vec<(&'static str, JsonValue)> {
    WATCHED_FIELDS
        .iter()
        .map(|field| (*field, watched_value(plan, field)))
        .collect()
}

impl PlanChangeEvent {
    /// Event for a freshly created plan, snapshotting every watched field
    pub fn created(plan: &Plan) -> Self {
        let changes = watched_values(plan)
            .into_iter()
            .map(|(field, after)| FieldChange {
                field: field.to_string(),
                before: JsonValue::Null,
                after,
            })
            .collect();

        Self {
            event_id: Uuid::new_v4(),
            action: ChangeAction::Created,
            plan_id: plan.id,
            plan: plan.auditable_name(),
            changes,
            occurred_at: Utc::now(),
        }
    }

    /// Event for an updated plan, or `None` when no watched field moved
    pub fn updated(before: &Plan, after: &Plan) -> Option<Self> {
        let changes: Vec<FieldChange> = watched_values(before)
            .into_iter()
            .zip(watched_values(after))
            .filter(|((_, before), (_, after))| before != after)
            .map(|((field, before), (_, after))| FieldChange {
                field: field.to_string(),
                before,
                after,
            })
            .collect();

        if changes.is_empty() {
            return None;
        }

        Some(Self {
            event_id: Uuid::new_v4(),
            action: ChangeAction::Updated,
            plan_id: after.id,
            plan: after.auditable_name(),
            changes,
            occurred_at: Utc::now(),
        })
    }

    /// Event for a deleted plan, keeping the last watched values
    pub fn deleted(plan: &Plan) -> Self {
        let changes = watched_values(plan)
            .into_iter()
            .map(|(field, before)| FieldChange {
                field: field.to_string(),
                before,
                after: JsonValue::Null,
            })
            .collect();

        Self {
            event_id: Uuid::new_v4(),
            action: ChangeAction::Deleted,
            plan_id: plan.id,
            plan: plan.auditable_name(),
            changes,
            occurred_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_plan() -> Plan {
        Plan {
            id: 7,
            name: "office-50".to_string(),
            provider_group_id: Some(1),
            ceil_up: 1000,
            ceil_down: 1000,
            burst_up: 16,
            burst_down: 16,
            long_download_max: 5,
            long_upload_max: 5,
            ..Default::default()
        }
    }

    #[test]
    fn test_created_event_snapshots_every_watched_field() {
        let event = PlanChangeEvent::created(&base_plan());

        assert_eq!(event.action, ChangeAction::Created);
        assert_eq!(event.plan_id, 7);
        assert_eq!(event.plan, "Plan: office-50");
        assert_eq!(event.changes.len(), WATCHED_FIELDS.len());
        assert!(event.changes.iter().all(|c| c.before.is_null()));
    }

    #[test]
    fn test_updated_event_diffs_only_watched_fields() {
        let before = base_plan();
        let mut after = base_plan();
        after.name = "renamed".to_string(); // not watched
        after.ceil_up = 2000;

        let event = PlanChangeEvent::updated(&before, &after).expect("ceil_up changed");

        assert_eq!(event.action, ChangeAction::Updated);
        assert_eq!(event.changes.len(), 1);
        assert_eq!(event.changes[0].field, "ceil_up");
        assert_eq!(event.changes[0].before, json!(1000));
        assert_eq!(event.changes[0].after, json!(2000));
    }

    #[test]
    fn test_updated_event_skips_unwatched_changes() {
        let before = base_plan();
        let mut after = base_plan();
        after.name = "renamed".to_string();
        after.cir_up = 0.9;
        after.total_cir_up = 4000;

        assert!(PlanChangeEvent::updated(&before, &after).is_none());
    }

    #[test]
    fn test_deleted_event_keeps_the_last_values() {
        let event = PlanChangeEvent::deleted(&base_plan());

        assert_eq!(event.action, ChangeAction::Deleted);
        assert!(event.changes.iter().all(|c| c.after.is_null()));
        assert_eq!(event.changes[0].field, "provider_group_id");
        assert_eq!(event.changes[0].before, json!(1));
    }

    #[test]
    fn test_change_action_display() {
        assert_eq!(ChangeAction::Created.to_string(), "created");
        assert_eq!(ChangeAction::Updated.to_string(), "updated");
        assert_eq!(ChangeAction::Deleted.to_string(), "deleted");
    }
}
