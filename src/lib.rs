//! Binding translation & reconciliation engine for Star Citizen exported
//! control maps on a two-joystick (left/right) layout.
//!
//! This crate is UI-agnostic. It exposes:
//! - `bindings`: the canonical binding model, the input-string codec, the
//!   default-binding merger, the plan/diff/validate machinery, and the
//!   control-map mutator + XML writer.
//! - `sc`: install discovery and profile load/save helpers.
//! - `core_log::CoreLog`: thin logging trait the host (GUI/CLI) can implement.
//!
//! Import the `prelude` if you want the most common types in scope.

pub mod config;
pub mod core_log;

pub mod bindings {
    pub mod action;
    pub mod binding;
    pub mod constants;
    pub mod control_map;
    pub mod default_merge;
    pub mod input_codec;
    pub mod layout;
    pub mod mutator;
    pub mod plan;
    pub mod planner;
    pub mod profile;
    pub(crate) mod str_intern;
    mod write_xml;
}

pub mod sc {
    pub mod install;
    pub mod profiles;
}

pub use core_log::CoreLog;

pub mod prelude {
    pub use crate::core_log::{CoreLog, NoopLog, StderrLog};

    // Binding model
    pub use crate::bindings::action::{
        ActionCatalog, ActionDefinition, ActionIdentifier, ActivationHint,
    };
    pub use crate::bindings::binding::{Binding, BindingSet, InputSlot, Side};
    pub use crate::bindings::plan::{BindingPlan, IssueLevel, ValidationIssue, ValidationReport};
    pub use crate::bindings::profile::ControlProfile;

    // Codec + planning + mutation
    pub use crate::bindings::control_map::{
        ControlMapDoc, DeviceEntry, DocAction, DocActionMap, DocRebind,
    };
    pub use crate::bindings::default_merge::DefaultBindingMerger;
    pub use crate::bindings::input_codec::{
        InputCodec, InputParseError, InstanceSideTable, ParsedInput, UnsupportedAction,
        instance_sides_from_options,
    };
    pub use crate::bindings::layout::{DeviceLayout, VKB_GLADIATOR_EVO};
    pub use crate::bindings::mutator::ControlMapMutator;
    pub use crate::bindings::planner::{BindingPlanner, BindingPlannerContext};

    // Config + install discovery + profile I/O
    pub use crate::config::Config;
    pub use crate::sc::install::{
        GameInstallType, Installation, exported_control_maps, find_installation,
    };
    pub use crate::sc::profiles::{LoadedProfile, load_control_profile, save_control_map};
}
