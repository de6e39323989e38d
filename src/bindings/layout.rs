use once_cell::sync::Lazy;
use std::collections::HashSet;

/// Slot-id existence catalog for one physical device model. The core only
/// needs to know whether a control exists; geometry and display data stay in
/// the UI layer.
#[derive(Debug, Clone)]
pub struct DeviceLayout {
    pub display_name: String,
    slots: HashSet<String>,
}

impl DeviceLayout {
    pub fn new<I, S>(display_name: impl Into<String>, slots: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        DeviceLayout {
            display_name: display_name.into(),
            slots: slots.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, slot_id: &str) -> bool {
        self.slots.contains(slot_id)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

/// VKBsim Gladiator EVO: 8-way hat, buttons 1-29, stick and base axes.
pub static VKB_GLADIATOR_EVO: Lazy<DeviceLayout> = Lazy::new(|| {
    let mut slots: Vec<String> = [
        "hat1_up",
        "hat1_up_right",
        "hat1_up_left",
        "hat1_left",
        "hat1_right",
        "hat1_down_left",
        "hat1_down",
        "hat1_down_right",
    ]
    .into_iter()
    .map(String::from)
    .collect();

    for n in 1..=29u8 {
        slots.push(format!("button{n}"));
    }
    for axis in ["x", "y", "z", "rotx", "roty", "rotz"] {
        slots.push(axis.to_string());
    }

    DeviceLayout::new("VKBsim Gladiator EVO", slots)
});
