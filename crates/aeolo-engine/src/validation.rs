//! Plan validation gate
//!
//! Accumulates every violation before refusing a save, so callers can
//! surface all problems at once instead of fixing them one at a time.
//! Field-level rules live on the model as `validator` attributes; the
//! rules that need storage access (name uniqueness, provider group
//! existence) are layered on top here.

use std::collections::BTreeMap;

use aeolo_core::models::Plan;
use aeolo_core::traits::{PlanRepository, ProviderGroupRepository};
use aeolo_core::AppResult;
use tracing::debug;
use validator::{Validate, ValidationError, ValidationErrors};

/// Run every validation rule against the plan.
///
/// Returns `AppError::Validation` carrying the full set of violations.
/// The row identified by `plan.id` is excluded from the uniqueness
/// check, so a plan may keep its own name across updates.
pub fn validate_plan<P: PlanRepository, G: ProviderGroupRepository>(
    plan: &Plan,
    plans: &P,
    groups: &G,
) -> AppResult<()> {
    let mut errors = match plan.validate() {
        Ok(()) => ValidationErrors::new(),
        Err(errors) => errors,
    };

    if let Some(existing) = plans.find_by_name(&plan.name)? {
        if existing.id != plan.id {
            errors.add("name", ValidationError::new("unique"));
        }
    }

    if let Some(group_id) = plan.provider_group_id {
        if groups.find_by_id(group_id)?.is_none() {
            errors.add("provider_group_id", ValidationError::new("exists"));
        }
    }

    if errors.is_empty() {
        return Ok(());
    }

    debug!(plan = %plan.name, "Plan failed validation");
    Err(errors.into())
}

/// Source of human-readable texts for validation error codes
///
/// The engine only deals in stable codes; rendering them is left to a
/// catalog so deployments can localize without touching the rules.
pub trait MessageCatalog {
    /// Text for one violation of `field`, identified by its `code`
    fn message_for(&self, field: &str, code: &str) -> String;
}

/// Built-in English catalog
pub struct PlainMessages;

impl MessageCatalog for PlainMessages {
    fn message_for(&self, field: &str, code: &str) -> String {
        match code {
            "length" => format!("{} must be between 3 and 128 characters", field),
            "required" => format!("{} can't be blank", field),
            "exists" => format!("{} must reference an existing record", field),
            "unique" => format!("{} is already taken", field),
            "different_to_zero" => format!("{} must be different to zero", field),
            "range" => format!("{} is out of range", field),
            _ => format!("{} is invalid", field),
        }
    }
}

/// Render accumulated violations into per-field message lists.
///
/// Messages attached to the violation itself win over the catalog.
/// The result is ordered by field name so output is stable.
pub fn render_messages(
    errors: &ValidationErrors,
    catalog: &dyn MessageCatalog,
) -> BTreeMap<String, Vec<String>> {
    let mut rendered = BTreeMap::new();
    for (field, field_errors) in errors.field_errors() {
        let messages = field_errors
            .iter()
            .map(|error| match &error.message {
                Some(message) => message.to_string(),
                None => catalog.message_for(field, &error.code),
            })
            .collect();
        rendered.insert(field.to_string(), messages);
    }
    rendered
}
