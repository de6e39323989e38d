use std::collections::HashSet;

use crate::bindings::action::ActionCatalog;
use crate::bindings::binding::{Binding, InputSlot, Side};
use crate::bindings::constants::{DEVICE_TAG, SLIDER_TOKEN};
use crate::bindings::input_codec::{InputCodec, UnsupportedAction};
use crate::bindings::profile::ControlProfile;

/// Device instance the game treats as the primary stick; default bindings
/// land on whichever side it resolves to.
const FIRST_INSTANCE: u32 = 1;

/// Fills a freshly loaded profile with the game's default joystick bindings
/// for every action the user has not explicitly remapped.
pub struct DefaultBindingMerger<'a> {
    catalog: &'a ActionCatalog,
    codec: &'a InputCodec<'a>,
}

impl<'a> DefaultBindingMerger<'a> {
    pub fn new(catalog: &'a ActionCatalog, codec: &'a InputCodec<'a>) -> Self {
        DefaultBindingMerger { catalog, codec }
    }

    /// Produce a new profile with default bindings merged in.
    ///
    /// The configured-name set is computed before any addition, so running
    /// the pass twice on the same input yields the same result.
    pub fn merge(&self, profile: &ControlProfile) -> (ControlProfile, Vec<UnsupportedAction>) {
        let configured: HashSet<&str> = profile
            .iter_bindings()
            .map(|b| b.action.name.as_ref())
            .collect();

        let side = self
            .codec
            .side_of_instance(FIRST_INSTANCE)
            .unwrap_or(Side::Left);
        let device_uid = format!("{DEVICE_TAG}{FIRST_INSTANCE}");

        let mut merged = profile.clone();
        let mut unsupported = Vec::new();

        for def in self.catalog.iter() {
            if configured.contains(def.identifier.name.as_ref()) {
                continue;
            }
            let Some(raw) = def.default_input.as_deref() else {
                continue;
            };
            let raw = raw.trim();
            if raw.is_empty() {
                continue;
            }

            // Defaults may carry a modifier chord ("rctrl+button10"); keep the
            // layer flag but bind the bare slot.
            let (slot_id, modifier) = match raw.rsplit_once('+') {
                Some((_, token)) => (token.trim(), true),
                None => (raw, false),
            };

            if slot_id.to_ascii_lowercase().contains(SLIDER_TOKEN)
                || !self.codec.layout().contains(slot_id)
            {
                unsupported.push(UnsupportedAction {
                    action_name: def.identifier.name.to_string(),
                    token: slot_id.to_string(),
                    modifier,
                    side: Some(side),
                });
                continue;
            }

            merged.side_mut(side).add(Binding::new(
                def.identifier.clone(),
                InputSlot::new(device_uid.clone(), side, slot_id),
                modifier,
                def.activation.is_hold(),
                // Defaults never encode multitap.
                false,
            ));
        }

        (merged, unsupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::action::{ActionDefinition, ActionIdentifier, ActivationHint};
    use crate::bindings::input_codec::InstanceSideTable;
    use crate::bindings::layout::VKB_GLADIATOR_EVO;

    fn catalog() -> ActionCatalog {
        let mut catalog = ActionCatalog::new();
        let defs = [
            ("v_afterburner", Some("button3"), ActivationHint::Press),
            ("v_toggle_landing_system", Some("button7"), ActivationHint::DelayedPress),
            ("v_target_pin", Some("rctrl+button10"), ActivationHint::Press),
            ("v_throttle_preset", Some("slider1"), ActivationHint::Press),
            ("v_weird_control", Some("button99"), ActivationHint::Press),
            ("v_unbound", None, ActivationHint::Press),
        ];
        for (name, input, activation) in defs {
            catalog.insert(ActionDefinition {
                identifier: ActionIdentifier::new(name, "mc", "spaceship_movement"),
                default_input: input.map(String::from),
                activation,
            });
        }
        catalog
    }

    fn configured_profile() -> ControlProfile {
        let mut profile = ControlProfile::new("test");
        profile.left.add(Binding::new(
            ActionIdentifier::new("v_afterburner", "mc", "spaceship_movement"),
            InputSlot::new("js1", Side::Left, "button22"),
            false,
            false,
            false,
        ));
        profile
    }

    #[test]
    fn fills_gaps_on_first_instance_side() {
        let table = InstanceSideTable::from([(1, Side::Right), (2, Side::Left)]);
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        let catalog = catalog();
        let merger = DefaultBindingMerger::new(&catalog, &codec);

        let (merged, unsupported) = merger.merge(&ControlProfile::new("test"));

        // Instance 1 resolved to the right side; all defaults land there.
        assert!(merged.left.is_empty());
        let landing = &merged.right.bindings["v_toggle_landing_system|button7|hold"];
        assert!(landing.hold);
        assert_eq!(landing.slot.device_uid, "js1");

        let pinned = &merged.right.bindings["v_target_pin|button10|modifier"];
        assert!(pinned.modifier);
        assert_eq!(pinned.slot.slot_id, "button10");

        // Slider and off-layout defaults are reported, never silently lost.
        let reported: Vec<_> = unsupported.iter().map(|u| u.token.as_str()).collect();
        assert_eq!(reported, vec!["slider1", "button99"]);
    }

    #[test]
    fn skips_already_configured_actions_by_name() {
        let table = InstanceSideTable::from([(1, Side::Left)]);
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        let catalog = catalog();
        let merger = DefaultBindingMerger::new(&catalog, &codec);

        let (merged, _) = merger.merge(&configured_profile());

        // The user moved v_afterburner to button22; the default on button3
        // must not come back, regardless of slot.
        assert!(merged.left.bindings.contains_key("v_afterburner|button22"));
        assert!(!merged.left.bindings.contains_key("v_afterburner|button3"));
    }

    #[test]
    fn merge_is_idempotent() {
        let table = InstanceSideTable::from([(1, Side::Left)]);
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        let catalog = catalog();
        let merger = DefaultBindingMerger::new(&catalog, &codec);

        let (once, _) = merger.merge(&configured_profile());
        let (twice, _) = merger.merge(&once);
        assert_eq!(once, twice);
    }
}
