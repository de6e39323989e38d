use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::bindings::action::ActionIdentifier;
use crate::bindings::constants::DEVICE_TAG;

/// Which physical joystick half a binding lives on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn name(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single physical control on one device side. `device_uid` is the game's
/// instance token ("js1", "js2"); `slot_id` is the control name independent
/// of side. Modifier layering is a flag on `Binding`, never part of the slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InputSlot {
    pub device_uid: String,
    pub side: Side,
    pub slot_id: String,
}

impl InputSlot {
    pub fn new(device_uid: impl Into<String>, side: Side, slot_id: impl Into<String>) -> Self {
        InputSlot {
            device_uid: device_uid.into(),
            side,
            slot_id: slot_id.into(),
        }
    }

    /// Device instance number carried by the uid token, if well-formed.
    pub fn instance(&self) -> Option<u32> {
        self.device_uid.strip_prefix(DEVICE_TAG)?.parse().ok()
    }
}

/// Mapping between an action and a specific input slot.
///
/// Caller invariant: `multitap` and `hold` are mutually exclusive activation
/// styles for the same action/slot; the type does not enforce it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Binding {
    pub action: ActionIdentifier,
    pub slot: InputSlot,
    pub modifier: bool,
    pub hold: bool,
    pub multitap: bool,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub tags: BTreeSet<String>,
}

impl Binding {
    pub fn new(
        action: ActionIdentifier,
        slot: InputSlot,
        modifier: bool,
        hold: bool,
        multitap: bool,
    ) -> Self {
        Binding {
            action,
            slot,
            modifier,
            hold,
            multitap,
            tags: BTreeSet::new(),
        }
    }

    /// Uniqueness key within a `BindingSet`: at most one binding may exist for
    /// a given (action, slot, modifier, hold, multitap) tuple.
    pub fn key(&self) -> String {
        let mut parts = vec![self.action.name.as_ref(), self.slot.slot_id.as_str()];
        if self.modifier {
            parts.push("modifier");
        }
        if self.hold {
            parts.push("hold");
        }
        if self.multitap {
            parts.push("multitap");
        }
        parts.join("|")
    }
}

/// Collection of bindings for a single physical device side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindingSet {
    pub side: Side,
    pub bindings: IndexMap<String, Binding>,
}

impl BindingSet {
    pub fn new(side: Side) -> Self {
        BindingSet {
            side,
            bindings: IndexMap::new(),
        }
    }

    /// Last write wins on key collision.
    pub fn add(&mut self, binding: Binding) {
        self.bindings.insert(binding.key(), binding);
    }

    pub fn remove(&mut self, key: &str) -> Option<Binding> {
        self.bindings.shift_remove(key)
    }

    /// Linear scan; binding sets stay small (tens to low hundreds).
    pub fn find_by_action(&self, action_name: &str) -> Vec<&Binding> {
        self.bindings
            .values()
            .filter(|b| b.action.name.as_ref() == action_name)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
