use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

use crate::bindings::binding::{Binding, InputSlot, Side};
use crate::bindings::constants::{DEVICE_TAG, SLIDER_TOKEN};
use crate::bindings::control_map::DeviceEntry;
use crate::bindings::layout::DeviceLayout;

/// Which physical side each device instance number represents. Derived from
/// the exported document's device options by the host (see
/// [`instance_sides_from_options`]) or supplied directly.
pub type InstanceSideTable = HashMap<u32, Side>;

/// Failure modes of the input-string grammar. All of these are recovered
/// locally by callers; none aborts a profile load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputParseError {
    /// Keyboard/mouse/gamepad input; callers filter these silently.
    NotApplicable,
    /// Device tag did not parse as "js" + integer.
    MalformedDeviceTag { token: String },
    /// The game encodes "unbound" as an empty slot; skipped silently.
    EmptySlot,
    /// Instance number missing from the instance-side table.
    UnknownDeviceInstance { instance: u32 },
    /// Slot is a slider or not present in the device layout.
    UnsupportedSlot { slot_id: String },
}

impl fmt::Display for InputParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputParseError::NotApplicable => write!(f, "not a joystick input"),
            InputParseError::MalformedDeviceTag { token } => {
                write!(f, "malformed device tag '{token}'")
            }
            InputParseError::EmptySlot => write!(f, "empty slot (unbound)"),
            InputParseError::UnknownDeviceInstance { instance } => {
                write!(f, "unknown device instance {instance}")
            }
            InputParseError::UnsupportedSlot { slot_id } => {
                write!(f, "unsupported slot '{slot_id}'")
            }
        }
    }
}

impl std::error::Error for InputParseError {}

/// Raw string split into its grammar parts, before any table resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedInput {
    pub instance: u32,
    pub slot_id: String,
    pub modifier: bool,
}

/// A rebind the engine cannot represent on the layout. Surfaced to the user,
/// never fatal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnsupportedAction {
    pub action_name: String,
    pub token: String,
    pub modifier: bool,
    /// None when the owning side could not be resolved.
    pub side: Option<Side>,
}

/// Bidirectional translation between the game's raw input-string grammar
/// ("js<N>_<slot>", "js<N>_<modifier>+<slot>") and the binding model.
pub struct InputCodec<'a> {
    instance_sides: &'a InstanceSideTable,
    layout: &'a DeviceLayout,
    modifier_key: &'a str,
}

impl<'a> InputCodec<'a> {
    pub fn new(
        instance_sides: &'a InstanceSideTable,
        layout: &'a DeviceLayout,
        modifier_key: &'a str,
    ) -> Self {
        InputCodec {
            instance_sides,
            layout,
            modifier_key,
        }
    }

    pub fn layout(&self) -> &DeviceLayout {
        self.layout
    }

    pub fn modifier_key(&self) -> &str {
        self.modifier_key
    }

    /// Split a raw input string into its grammar parts. No table lookups.
    ///
    /// A '+' marks a modifier chord: the device tag sits before the first '_'
    /// of the left half, everything after the '+' is the slot. Otherwise the
    /// first '_' separates tag from slot (which may itself contain '_').
    pub fn split(raw: &str) -> Result<ParsedInput, InputParseError> {
        let raw = raw.trim();
        if !raw.starts_with(DEVICE_TAG) {
            return Err(InputParseError::NotApplicable);
        }

        let (tag, slot_id, modifier) = if let Some((prefix, slot)) = raw.split_once('+') {
            let tag = prefix.split('_').next().unwrap_or(prefix);
            (tag, slot, true)
        } else {
            match raw.split_once('_') {
                Some((tag, slot)) => (tag, slot, false),
                None => (raw, "", false),
            }
        };

        let instance = tag[DEVICE_TAG.len()..]
            .parse::<u32>()
            .map_err(|_| InputParseError::MalformedDeviceTag {
                token: tag.to_string(),
            })?;

        let slot_id = slot_id.trim();
        if slot_id.is_empty() {
            return Err(InputParseError::EmptySlot);
        }

        Ok(ParsedInput {
            instance,
            slot_id: slot_id.to_string(),
            modifier,
        })
    }

    /// Resolve a parsed input against the instance table and device layout.
    pub fn resolve(&self, parsed: &ParsedInput) -> Result<InputSlot, InputParseError> {
        let side = self
            .side_of_instance(parsed.instance)
            .ok_or(InputParseError::UnknownDeviceInstance {
                instance: parsed.instance,
            })?;

        if parsed.slot_id.to_ascii_lowercase().contains(SLIDER_TOKEN)
            || !self.layout.contains(&parsed.slot_id)
        {
            return Err(InputParseError::UnsupportedSlot {
                slot_id: parsed.slot_id.clone(),
            });
        }

        Ok(InputSlot::new(
            format!("{DEVICE_TAG}{}", parsed.instance),
            side,
            parsed.slot_id.clone(),
        ))
    }

    /// Full parse: split plus resolution to a slot and modifier flag.
    pub fn parse(&self, raw: &str) -> Result<(InputSlot, bool), InputParseError> {
        let parsed = Self::split(raw)?;
        let slot = self.resolve(&parsed)?;
        Ok((slot, parsed.modifier))
    }

    /// Inverse of [`parse`](Self::parse): rebuild the raw input string for a
    /// binding on the given device instance. Multitap is not part of the
    /// string; it lives as a document-layer attribute.
    pub fn build(&self, binding: &Binding, instance: u32) -> String {
        if binding.modifier {
            format!(
                "{DEVICE_TAG}{instance}_{}+{}",
                self.modifier_key, binding.slot.slot_id
            )
        } else {
            format!("{DEVICE_TAG}{instance}_{}", binding.slot.slot_id)
        }
    }

    pub fn side_of_instance(&self, instance: u32) -> Option<Side> {
        self.instance_sides.get(&instance).copied()
    }

    /// Lowest instance number mapped to the given side, if any.
    pub fn instance_for_side(&self, side: Side) -> Option<u32> {
        self.instance_sides
            .iter()
            .filter(|(_, s)| **s == side)
            .map(|(i, _)| *i)
            .min()
    }
}

/// Derive the instance-side table from the document's device entries: every
/// joystick whose product matches `product_filter` is classified by whether
/// the product name (before the GUID brace) contains `left_identifier`.
pub fn instance_sides_from_options(
    options: &[DeviceEntry],
    product_filter: &str,
    left_identifier: &str,
) -> InstanceSideTable {
    let mut table = InstanceSideTable::new();
    for entry in options {
        let Some(product) = entry.product.as_deref() else {
            continue;
        };
        if !product.contains(product_filter) {
            continue;
        }
        let product_name = product.split('{').next().unwrap_or(product);
        let side = if product_name.contains(left_identifier) {
            Side::Left
        } else {
            Side::Right
        };
        table.insert(entry.instance, side);
    }
    table
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bindings::action::ActionIdentifier;
    use crate::bindings::layout::VKB_GLADIATOR_EVO;

    fn table() -> InstanceSideTable {
        InstanceSideTable::from([(1, Side::Left), (2, Side::Right)])
    }

    fn binding(slot_id: &str, side: Side, modifier: bool) -> Binding {
        Binding::new(
            ActionIdentifier::new("v_afterburner", "mc", "spaceship_movement"),
            InputSlot::new(if side == Side::Left { "js1" } else { "js2" }, side, slot_id),
            modifier,
            false,
            false,
        )
    }

    #[test]
    fn parses_plain_button() {
        let table = table();
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        let (slot, modifier) = codec.parse("js1_button3").unwrap();
        assert_eq!(slot.device_uid, "js1");
        assert_eq!(slot.side, Side::Left);
        assert_eq!(slot.slot_id, "button3");
        assert!(!modifier);
    }

    #[test]
    fn parses_modifier_chord() {
        let table = table();
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        let (slot, modifier) = codec.parse("js2_rctrl+button10").unwrap();
        assert_eq!(slot.device_uid, "js2");
        assert_eq!(slot.side, Side::Right);
        assert_eq!(slot.slot_id, "button10");
        assert!(modifier);
    }

    #[test]
    fn slot_may_contain_underscores() {
        let parsed = InputCodec::split("js1_hat1_up_left").unwrap();
        assert_eq!(parsed.instance, 1);
        assert_eq!(parsed.slot_id, "hat1_up_left");
        assert!(!parsed.modifier);
    }

    #[test]
    fn non_joystick_inputs_are_not_applicable() {
        assert_eq!(
            InputCodec::split("kb1_lctrl+f"),
            Err(InputParseError::NotApplicable)
        );
        assert_eq!(InputCodec::split("mo1_mouse1"), Err(InputParseError::NotApplicable));
    }

    #[test]
    fn malformed_tag_and_empty_slot() {
        assert!(matches!(
            InputCodec::split("jsx_button1"),
            Err(InputParseError::MalformedDeviceTag { .. })
        ));
        assert_eq!(InputCodec::split("js1_ "), Err(InputParseError::EmptySlot));
        assert_eq!(InputCodec::split("js1"), Err(InputParseError::EmptySlot));
    }

    #[test]
    fn sliders_and_unknown_slots_are_unsupported() {
        let table = table();
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        assert!(matches!(
            codec.parse("js1_slider1"),
            Err(InputParseError::UnsupportedSlot { .. })
        ));
        assert!(matches!(
            codec.parse("js1_button99"),
            Err(InputParseError::UnsupportedSlot { .. })
        ));
    }

    #[test]
    fn unknown_instance_is_reported() {
        let table = table();
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        assert_eq!(
            codec.parse("js3_button1"),
            Err(InputParseError::UnknownDeviceInstance { instance: 3 })
        );
    }

    #[test]
    fn build_then_parse_round_trips() {
        let table = table();
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");

        let plain = binding("button7", Side::Left, false);
        let raw = codec.build(&plain, 1);
        assert_eq!(raw, "js1_button7");
        let parsed = InputCodec::split(&raw).unwrap();
        assert_eq!(parsed.instance, 1);
        assert_eq!(parsed.slot_id, "button7");
        assert!(!parsed.modifier);

        let layered = binding("hat1_down", Side::Right, true);
        let raw = codec.build(&layered, 2);
        assert_eq!(raw, "js2_rctrl+hat1_down");
        let parsed = InputCodec::split(&raw).unwrap();
        assert_eq!(parsed.instance, 2);
        assert_eq!(parsed.slot_id, "hat1_down");
        assert!(parsed.modifier);
    }

    #[test]
    fn instance_side_table_from_device_entries() {
        let options = vec![
            DeviceEntry {
                device_type: "keyboard".into(),
                instance: 1,
                product: Some("Keyboard  {6F1D2B61-...}".into()),
            },
            DeviceEntry {
                device_type: "joystick".into(),
                instance: 1,
                product: Some(" VKBsim Gladiator EVO  L   {0200231D-...}".into()),
            },
            DeviceEntry {
                device_type: "joystick".into(),
                instance: 2,
                product: Some(" VKBsim Gladiator EVO R    {0200231D-...}".into()),
            },
        ];

        let table = instance_sides_from_options(&options, "VKBsim Gladiator EVO", "L");
        assert_eq!(table.len(), 2);
        assert_eq!(table.get(&1), Some(&Side::Left));
        assert_eq!(table.get(&2), Some(&Side::Right));
    }

    #[test]
    fn instance_for_side_picks_lowest() {
        let table = InstanceSideTable::from([(3, Side::Left), (1, Side::Left), (2, Side::Right)]);
        let codec = InputCodec::new(&table, &VKB_GLADIATOR_EVO, "rctrl");
        assert_eq!(codec.instance_for_side(Side::Left), Some(1));
        assert_eq!(codec.instance_for_side(Side::Right), Some(2));
    }
}
