use crate::bindings::binding::Binding;
use crate::bindings::constants::{DEVICE_TAG, MULTITAP_COUNT};
use crate::bindings::control_map::{ControlMapDoc, DocAction, DocRebind};
use crate::bindings::input_codec::InputCodec;
use crate::bindings::plan::{BindingPlan, ValidationIssue, ValidationReport};

/// Applies an approved `BindingPlan` onto a control-map document, scoped to a
/// set of owned device instances. Rebinds belonging to other instances and
/// non-joystick action maps are left untouched.
///
/// The mutation always runs on a clone of the template, so a failed or
/// aborted apply never disturbs the working document.
pub struct ControlMapMutator<'a> {
    codec: &'a InputCodec<'a>,
    owned_instances: Vec<u32>,
}

impl<'a> ControlMapMutator<'a> {
    pub fn new(codec: &'a InputCodec<'a>, owned_instances: &[u32]) -> Self {
        ControlMapMutator {
            codec,
            owned_instances: owned_instances.to_vec(),
        }
    }

    pub fn apply(&self, template: &ControlMapDoc, plan: &BindingPlan) -> (ControlMapDoc, ValidationReport) {
        let mut doc = template.clone();
        let mut report = ValidationReport::default();

        self.clear_owned_rebinds(&mut doc);
        for binding in &plan.to_remove {
            self.remove_binding(&mut doc, binding);
        }
        for binding in &plan.to_add {
            self.add_binding(&mut doc, binding, &mut report);
        }

        (doc, report)
    }

    /// Drop every rebind owned by the managed instances. Actions left with no
    /// rebinds disappear with them; the game rejects empty action entries.
    fn clear_owned_rebinds(&self, doc: &mut ControlMapDoc) {
        let prefixes: Vec<String> = self
            .owned_instances
            .iter()
            .map(|n| format!("{DEVICE_TAG}{n}_"))
            .collect();

        for map in doc.action_maps.values_mut() {
            for action in map.actions.values_mut() {
                action
                    .rebinds
                    .retain(|r| !prefixes.iter().any(|p| r.input.starts_with(p)));
            }
            map.actions.retain(|_, action| !action.rebinds.is_empty());
        }
    }

    fn remove_binding(&self, doc: &mut ControlMapDoc, binding: &Binding) {
        let Some(instance) = binding.slot.instance() else {
            return;
        };
        let input = self.codec.build(binding, instance);

        for map in doc.action_maps.values_mut() {
            let Some(action) = map.actions.get_mut(binding.action.name.as_ref()) else {
                continue;
            };
            action.rebinds.retain(|r| r.input != input);
            if action.rebinds.is_empty() {
                map.actions.shift_remove(binding.action.name.as_ref());
            }
        }
    }

    fn add_binding(&self, doc: &mut ControlMapDoc, binding: &Binding, report: &mut ValidationReport) {
        let section = binding.action.sub_category.as_ref();
        let Some(map) = doc.action_maps.get_mut(section) else {
            report.add(
                ValidationIssue::error(format!(
                    "Missing action-map section '{section}' for {}; addition skipped.",
                    binding.action.name
                ))
                .with_action(binding.action.clone()),
            );
            return;
        };

        let Some(instance) = binding.slot.instance() else {
            report.add(
                ValidationIssue::error(format!(
                    "Device uid '{}' carries no instance number for {}; addition skipped.",
                    binding.slot.device_uid, binding.action.name
                ))
                .with_slot(binding.slot.clone()),
            );
            return;
        };

        let rebind = DocRebind {
            input: self.codec.build(binding, instance),
            multitap: binding.multitap.then_some(MULTITAP_COUNT),
        };
        let prefix = format!("{DEVICE_TAG}{instance}_");

        match map.actions.get_mut(binding.action.name.as_ref()) {
            Some(action) => {
                // One rebind per device per action: re-binding the same
                // device's control overwrites rather than duplicates.
                action.rebinds.retain(|r| !r.input.starts_with(&prefix));
                action.rebinds.push(rebind);
            }
            None => {
                map.actions.insert(
                    binding.action.name.to_string(),
                    DocAction {
                        name: binding.action.name.to_string(),
                        rebinds: vec![rebind],
                    },
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::action::ActionIdentifier;
    use crate::bindings::binding::{InputSlot, Side};
    use crate::bindings::control_map::tests::SAMPLE_EXPORT;
    use crate::bindings::input_codec::InstanceSideTable;
    use crate::bindings::layout::VKB_GLADIATOR_EVO;

    fn table() -> InstanceSideTable {
        InstanceSideTable::from([(1, Side::Left), (2, Side::Right)])
    }

    fn binding(name: &str, section: &str, device: &str, side: Side, slot_id: &str) -> Binding {
        Binding::new(
            ActionIdentifier::new(name, "mc", section),
            InputSlot::new(device, side, slot_id),
            false,
            false,
            false,
        )
    }

    #[test]
    fn clearing_is_scoped_to_owned_instances() {
        let template = ControlMapDoc::parse(SAMPLE_EXPORT).unwrap();
        let table = table();
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        let mutator = ControlMapMutator::new(&codec, &[1]);

        let (doc, report) = mutator.apply(&template, &BindingPlan::new());
        assert!(!report.has_errors());

        // Owned instance 1 rebinds are gone, including the modifier chord.
        assert!(doc.rebind_inputs().all(|i| !i.starts_with("js1_")));
        // Instance 2 and keyboard rebinds are byte-identical survivors.
        let movement = &doc.action_maps["spaceship_movement"];
        assert_eq!(movement.actions["v_afterburner"].rebinds[0].input, "js2_button3");
        assert_eq!(
            movement.actions["v_atc_loading_area_request"].rebinds[0],
            DocRebind {
                input: "js2_button4".to_string(),
                multitap: Some(2),
            }
        );
        assert_eq!(
            doc.action_maps["seat_general"].actions["v_eject"].rebinds[0].input,
            "kb1_lalt+y"
        );
    }

    #[test]
    fn additions_replace_same_device_rebind_or_append() {
        let template = ControlMapDoc::parse(SAMPLE_EXPORT).unwrap();
        let table = table();
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        let mutator = ControlMapMutator::new(&codec, &[2]);

        let mut plan = BindingPlan::new();
        // Recreates v_afterburner after the owned-prefix clear...
        plan.record_add(binding(
            "v_afterburner",
            "spaceship_movement",
            "js2",
            Side::Right,
            "button5",
        ));
        // ...and a later addition for the same action on the same device
        // overwrites rather than duplicates.
        plan.record_add(binding(
            "v_afterburner",
            "spaceship_movement",
            "js2",
            Side::Right,
            "button7",
        ));
        // New action entry in an existing section.
        plan.record_add(binding(
            "v_strafe_up",
            "spaceship_movement",
            "js2",
            Side::Right,
            "button6",
        ));

        let (doc, report) = mutator.apply(&template, &plan);
        assert!(!report.has_errors());

        let movement = &doc.action_maps["spaceship_movement"];
        assert_eq!(
            movement.actions["v_afterburner"].rebinds,
            vec![DocRebind {
                input: "js2_button7".to_string(),
                multitap: None,
            }]
        );
        assert_eq!(
            movement.actions["v_strafe_up"].rebinds[0].input,
            "js2_button6"
        );
        // The keyboard rebind in seat_general is untouched by instance-2 work.
        assert_eq!(
            doc.action_maps["seat_general"].actions["v_eject"].rebinds[0].input,
            "kb1_lalt+y"
        );
    }

    #[test]
    fn multitap_binding_writes_count_attribute() {
        let template = ControlMapDoc::parse(SAMPLE_EXPORT).unwrap();
        let table = table();
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        let mutator = ControlMapMutator::new(&codec, &[1]);

        let mut plan = BindingPlan::new();
        let mut b = binding("v_weapon_cycle", "spaceship_movement", "js1", Side::Left, "button8");
        b.multitap = true;
        plan.record_add(b);

        let (doc, _) = mutator.apply(&template, &plan);
        assert_eq!(
            doc.action_maps["spaceship_movement"].actions["v_weapon_cycle"].rebinds[0].multitap,
            Some(2)
        );
    }

    #[test]
    fn removal_drops_exact_match_and_empty_actions() {
        let template = ControlMapDoc::parse(SAMPLE_EXPORT).unwrap();
        let table = table();
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        // Not scoped to instance 2, so the removal path does the work.
        let mutator = ControlMapMutator::new(&codec, &[]);

        let mut plan = BindingPlan::new();
        plan.record_remove(binding(
            "v_afterburner",
            "spaceship_movement",
            "js2",
            Side::Right,
            "button3",
        ));

        let (doc, _) = mutator.apply(&template, &plan);
        assert!(
            !doc.action_maps["spaceship_movement"]
                .actions
                .contains_key("v_afterburner")
        );
        // Unrelated entries survive.
        assert!(
            doc.action_maps["spaceship_movement"]
                .actions
                .contains_key("v_atc_loading_area_request")
        );
    }

    #[test]
    fn missing_section_is_reported_and_skipped() {
        let template = ControlMapDoc::parse(SAMPLE_EXPORT).unwrap();
        let table = table();
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        let mutator = ControlMapMutator::new(&codec, &[1]);

        let mut plan = BindingPlan::new();
        plan.record_add(binding(
            "v_mining_toggle",
            "mining_controls",
            "js1",
            Side::Left,
            "button9",
        ));
        plan.record_add(binding(
            "v_roll_left",
            "spaceship_movement",
            "js1",
            Side::Left,
            "button11",
        ));

        let (doc, report) = mutator.apply(&template, &plan);

        assert!(report.has_errors());
        assert!(
            report
                .issues
                .iter()
                .any(|i| i.message.contains("mining_controls"))
        );
        // The rest of the plan still applied.
        assert!(
            doc.action_maps["spaceship_movement"]
                .actions
                .contains_key("v_roll_left")
        );
    }

    #[test]
    fn template_is_never_mutated() {
        let template = ControlMapDoc::parse(SAMPLE_EXPORT).unwrap();
        let before = template.clone();
        let table = table();
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        let mutator = ControlMapMutator::new(&codec, &[1, 2]);

        let mut plan = BindingPlan::new();
        plan.record_add(binding(
            "v_afterburner",
            "spaceship_movement",
            "js1",
            Side::Left,
            "button1",
        ));
        let _ = mutator.apply(&template, &plan);

        assert_eq!(template, before);
    }
}
