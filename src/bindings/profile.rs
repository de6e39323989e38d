use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::bindings::binding::{Binding, BindingSet, Side};

/// One fully-resolved state: what is bound where right now.
///
/// Profiles are immutable snapshots; every meaningful state transition
/// (profile load, edit batch, default-merge pass) builds a new instance or a
/// `BindingPlan` reconciling two of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlProfile {
    pub profile_name: String,
    pub left: BindingSet,
    pub right: BindingSet,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl ControlProfile {
    pub fn new(profile_name: impl Into<String>) -> Self {
        ControlProfile {
            profile_name: profile_name.into(),
            left: BindingSet::new(Side::Left),
            right: BindingSet::new(Side::Right),
            metadata: HashMap::new(),
        }
    }

    pub fn side(&self, side: Side) -> &BindingSet {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn side_mut(&mut self, side: Side) -> &mut BindingSet {
        match side {
            Side::Left => &mut self.left,
            Side::Right => &mut self.right,
        }
    }

    pub fn iter_bindings(&self) -> impl Iterator<Item = &Binding> {
        self.left.bindings.values().chain(self.right.bindings.values())
    }

    pub fn binding_count(&self) -> usize {
        self.left.len() + self.right.len()
    }
}
