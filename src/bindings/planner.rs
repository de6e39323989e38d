use indexmap::IndexMap;
use std::collections::HashSet;

use crate::bindings::binding::{Binding, Side};
use crate::bindings::plan::{BindingPlan, ValidationIssue, ValidationReport};
use crate::bindings::profile::ControlProfile;

/// Occupancy key: one physical control position on one device side.
type SlotKey = (String, Side, String);

fn slot_key(binding: &Binding) -> SlotKey {
    (
        binding.slot.device_uid.clone(),
        binding.slot.side,
        binding.slot.slot_id.clone(),
    )
}

fn action_list(bindings: &[&Binding]) -> String {
    let mut names: Vec<&str> = bindings.iter().map(|b| b.action.name.as_ref()).collect();
    names.sort_unstable();
    names.dedup();
    names.join(", ")
}

/// Dependencies required by the binding planner.
#[derive(Debug, Default)]
pub struct BindingPlannerContext {
    /// Baseline profile whose bindings count as slot occupants during
    /// validation (typically the default-merged current state).
    pub default_profile: Option<ControlProfile>,
}

/// Computes and validates `BindingPlan`s against slot-occupancy rules.
pub struct BindingPlanner {
    context: BindingPlannerContext,
}

impl BindingPlanner {
    pub fn new(context: BindingPlannerContext) -> Self {
        BindingPlanner { context }
    }

    /// Seed a plan from a freshly loaded or freshly merged profile: every
    /// binding becomes an addition.
    pub fn plan_from_profile(&self, profile: &ControlProfile) -> BindingPlan {
        let mut plan = BindingPlan::new();
        for binding in profile.iter_bindings() {
            plan.record_add(binding.clone());
        }
        plan
    }

    /// Set difference by `Binding::key`. Removals carry the original binding
    /// instances so downstream consumers keep full attribute detail; keys
    /// present on both sides produce no entry at all.
    pub fn plan_diff<'b>(
        &self,
        current: &ControlProfile,
        desired: impl IntoIterator<Item = &'b Binding>,
    ) -> BindingPlan {
        let current_keys: IndexMap<String, &Binding> =
            current.iter_bindings().map(|b| (b.key(), b)).collect();
        let desired_keys: IndexMap<String, &Binding> =
            desired.into_iter().map(|b| (b.key(), b)).collect();

        let mut plan = BindingPlan::new();
        for (key, binding) in &current_keys {
            if !desired_keys.contains_key(key) {
                plan.record_remove((*binding).clone());
            }
        }
        for (key, binding) in &desired_keys {
            if !current_keys.contains_key(key) {
                plan.record_add((*binding).clone());
            }
        }
        plan
    }

    /// Diff then validate in one step, returning the plan with its report
    /// filled in.
    pub fn diff_and_validate<'b>(
        &self,
        current: &ControlProfile,
        desired: impl IntoIterator<Item = &'b Binding>,
    ) -> BindingPlan {
        let mut plan = self.plan_diff(current, desired);
        plan.validation = self.validate_plan(&plan);
        plan
    }

    /// Validate a plan before execution. Starts from the plan's accumulated
    /// issues and appends everything found; it never stops at the first.
    ///
    /// Removals release their occupancy before any addition is checked, so a
    /// same-plan rebind of a slot does not conflict with itself.
    pub fn validate_plan(&self, plan: &BindingPlan) -> ValidationReport {
        let mut report = plan.validation.clone();

        if plan.to_add.is_empty() && plan.to_remove.is_empty() {
            report.add(ValidationIssue::info("No binding changes detected."));
            return report;
        }

        let mut occupancy: IndexMap<SlotKey, Vec<&Binding>> = IndexMap::new();
        if let Some(baseline) = &self.context.default_profile {
            for binding in baseline.iter_bindings() {
                occupancy.entry(slot_key(binding)).or_default().push(binding);
            }
        }

        for binding in &plan.to_remove {
            let key = slot_key(binding);
            if let Some(occupants) = occupancy.get_mut(&key) {
                occupants.retain(|existing| existing.key() != binding.key());
                if occupants.is_empty() {
                    occupancy.shift_remove(&key);
                }
            }
        }

        let mut additions: IndexMap<SlotKey, Vec<&Binding>> = IndexMap::new();
        for binding in &plan.to_add {
            additions.entry(slot_key(binding)).or_default().push(binding);
        }

        for (key, bindings) in &additions {
            let slot_desc = format!("{}:{}", key.0, key.2);
            let actions = action_list(bindings);

            if bindings.len() > 1 {
                let modifiers: HashSet<bool> = bindings.iter().map(|b| b.modifier).collect();
                if modifiers.len() > 1 {
                    report.add(
                        ValidationIssue::error(format!(
                            "Modifier conflict: slot {slot_desc} receives both modifier and \
                             non-modifier bindings ({actions})."
                        ))
                        .with_slot(bindings[0].slot.clone()),
                    );
                } else {
                    report.add(
                        ValidationIssue::error(format!(
                            "Duplicate slot assignment: slot {slot_desc} receives multiple \
                             bindings ({actions})."
                        ))
                        .with_slot(bindings[0].slot.clone()),
                    );
                }
            }

            if let Some(occupants) = occupancy.get(key) {
                let existing_actions = action_list(occupants);
                let existing_modifiers: HashSet<bool> =
                    occupants.iter().map(|b| b.modifier).collect();
                let addition_modifiers: HashSet<bool> =
                    bindings.iter().map(|b| b.modifier).collect();

                let reason = if existing_modifiers != addition_modifiers {
                    "Modifier conflict"
                } else {
                    "Slot already mapped"
                };
                report.add(
                    ValidationIssue::error(format!(
                        "{reason}: slot {slot_desc} currently mapped to {existing_actions}; \
                         cannot add {actions}."
                    ))
                    .with_slot(bindings[0].slot.clone()),
                );
            }
        }

        report
    }
}
