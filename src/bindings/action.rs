use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::bindings::constants::HOLD_ACTIVATION_MODE;
use crate::bindings::str_intern::intern;

/// How the game triggers an action once its input fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ActivationHint {
    #[default]
    Press,
    /// "delayed_press" in the game profile: the control must be held.
    DelayedPress,
}

impl ActivationHint {
    pub fn from_mode(mode: Option<&str>) -> Self {
        match mode {
            Some(HOLD_ACTIVATION_MODE) => ActivationHint::DelayedPress,
            _ => ActivationHint::Press,
        }
    }

    #[inline]
    pub fn is_hold(self) -> bool {
        matches!(self, ActivationHint::DelayedPress)
    }
}

/// Stable identity of a game action. `name` is the internal key, never the
/// localized label; the categories say where the game groups the action.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionIdentifier {
    pub name: Arc<str>,
    pub main_category: Arc<str>,
    pub sub_category: Arc<str>,
}

impl ActionIdentifier {
    pub fn new(name: &str, main_category: &str, sub_category: &str) -> Self {
        ActionIdentifier {
            name: intern(name),
            main_category: intern(main_category),
            sub_category: intern(sub_category),
        }
    }
}

/// One entry of the game's default action catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActionDefinition {
    pub identifier: ActionIdentifier,
    /// Default joystick input token, e.g. "button3" or "rctrl+button10".
    /// None or blank means the action ships unbound on joystick.
    pub default_input: Option<String>,
    pub activation: ActivationHint,
}

/// Raw default-input value as exported by the game: either a bare token or a
/// record carrying its own activation mode. Resolved once at catalog load,
/// never re-inspected later.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum RawJoystickInput {
    Token(String),
    Record {
        #[serde(default)]
        input: Option<String>,
        #[serde(rename = "activationmode", default)]
        activation_mode: Option<String>,
    },
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogAction {
    name: String,
    #[serde(default)]
    activation_mode: Option<String>,
    #[serde(default)]
    joystick: Option<RawJoystickInput>,
}

#[derive(Debug, Clone, Deserialize)]
struct CatalogSection {
    name: String,
    #[serde(default)]
    action: Vec<CatalogAction>,
}

/// The game's full action catalog, keyed by action name. Loaded once by an
/// external collaborator and passed through as immutable reference data.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: IndexMap<Arc<str>, ActionDefinition>,
}

impl ActionCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// First definition wins on duplicate names, matching the game profile
    /// where later duplicates are aliases of the same action.
    pub fn insert(&mut self, def: ActionDefinition) {
        self.actions.entry(def.identifier.name.clone()).or_insert(def);
    }

    pub fn get(&self, name: &str) -> Option<&ActionDefinition> {
        self.actions.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActionDefinition> {
        self.actions.values()
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Parse the actionmap JSON export: a map of main category -> section,
    /// where the section name is the action-map (sub category) the game
    /// groups those actions under.
    pub fn from_json(content: &str) -> Result<Self, serde_json::Error> {
        let file: IndexMap<String, CatalogSection> = serde_json::from_str(content)?;
        let mut catalog = ActionCatalog::new();
        for (main_category, section) in &file {
            for action in &section.action {
                let (default_input, activation_mode) = match &action.joystick {
                    Some(RawJoystickInput::Token(token)) => {
                        (Some(token.clone()), action.activation_mode.clone())
                    }
                    Some(RawJoystickInput::Record {
                        input,
                        activation_mode,
                    }) => (
                        input.clone(),
                        activation_mode
                            .clone()
                            .or_else(|| action.activation_mode.clone()),
                    ),
                    None => (None, action.activation_mode.clone()),
                };
                catalog.insert(ActionDefinition {
                    identifier: ActionIdentifier::new(&action.name, main_category, &section.name),
                    default_input: default_input.filter(|s| !s.trim().is_empty()),
                    activation: ActivationHint::from_mode(activation_mode.as_deref()),
                });
            }
        }
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn activation_hint_from_mode() {
        assert_eq!(
            ActivationHint::from_mode(Some("delayed_press")),
            ActivationHint::DelayedPress
        );
        assert_eq!(ActivationHint::from_mode(Some("press")), ActivationHint::Press);
        assert_eq!(ActivationHint::from_mode(None), ActivationHint::Press);
        assert!(ActivationHint::DelayedPress.is_hold());
    }

    #[test]
    fn catalog_from_json_handles_token_and_record_inputs() {
        let json = r#"{
            "@ui_CCSpaceFlight": {
                "name": "spaceship_movement",
                "action": [
                    { "name": "v_afterburner", "joystick": "button3" },
                    {
                        "name": "v_toggle_landing_system",
                        "activation_mode": "delayed_press",
                        "joystick": { "input": "button7", "activationmode": "delayed_press" }
                    },
                    { "name": "v_unbound_action", "joystick": " " },
                    { "name": "v_no_joystick" }
                ]
            }
        }"#;

        let catalog = ActionCatalog::from_json(json).unwrap();
        assert_eq!(catalog.len(), 4);

        let afterburner = catalog.get("v_afterburner").unwrap();
        assert_eq!(afterburner.default_input.as_deref(), Some("button3"));
        assert_eq!(afterburner.activation, ActivationHint::Press);
        assert_eq!(afterburner.identifier.sub_category.as_ref(), "spaceship_movement");
        assert_eq!(afterburner.identifier.main_category.as_ref(), "@ui_CCSpaceFlight");

        let landing = catalog.get("v_toggle_landing_system").unwrap();
        assert_eq!(landing.default_input.as_deref(), Some("button7"));
        assert!(landing.activation.is_hold());

        assert!(catalog.get("v_unbound_action").unwrap().default_input.is_none());
        assert!(catalog.get("v_no_joystick").unwrap().default_input.is_none());
    }

    #[test]
    fn catalog_keeps_first_definition_on_duplicates() {
        let mut catalog = ActionCatalog::new();
        catalog.insert(ActionDefinition {
            identifier: ActionIdentifier::new("v_eject", "cat", "seat_general"),
            default_input: Some("button9".into()),
            activation: ActivationHint::Press,
        });
        catalog.insert(ActionDefinition {
            identifier: ActionIdentifier::new("v_eject", "cat", "other_map"),
            default_input: None,
            activation: ActivationHint::DelayedPress,
        });

        let def = catalog.get("v_eject").unwrap();
        assert_eq!(def.identifier.sub_category.as_ref(), "seat_general");
        assert_eq!(def.default_input.as_deref(), Some("button9"));
    }
}
