use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::bindings::constants::DEFAULT_MODIFIER_KEY;
use crate::sc::install::GameInstallType;

/// Application configuration, stored as `config.json` next to the
/// executable-owned data. Missing file means defaults; first save creates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub installation_path: PathBuf,
    pub install_type: GameInstallType,
    /// Product-name substring all managed joysticks share.
    pub joystick_product_filter: String,
    /// Letter that marks the left-hand stick inside the product name.
    pub joystick_side_identifier_left: String,
    pub joystick_instance_left: u32,
    pub joystick_instance_right: u32,
    /// Keyboard token written into modifier chords ("js1_<key>+<slot>").
    pub modifier_key: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            installation_path: PathBuf::from(
                "C:/Program Files/Roberts Space Industries/StarCitizen",
            ),
            install_type: GameInstallType::Live,
            joystick_product_filter: "VKBsim Gladiator EVO".to_string(),
            joystick_side_identifier_left: "L".to_string(),
            joystick_instance_left: 1,
            joystick_instance_right: 2,
            modifier_key: DEFAULT_MODIFIER_KEY.to_string(),
        }
    }
}

impl Config {
    /// Load from `path`, writing (and returning) the defaults when the file
    /// does not exist yet.
    pub fn load(path: &Path) -> Result<Self, String> {
        if !path.exists() {
            let config = Config::default();
            config.save(path)?;
            return Ok(config);
        }
        let content =
            fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
        serde_json::from_str(&content).map_err(|e| format!("parse {}: {e}", path.display()))
    }

    pub fn save(&self, path: &Path) -> Result<(), String> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| format!("serialize config: {e}"))?;
        fs::write(path, json).map_err(|e| format!("write {}: {e}", path.display()))
    }

    /// The two device instances this tool manages.
    pub fn owned_instances(&self) -> [u32; 2] {
        [self.joystick_instance_left, self.joystick_instance_right]
    }
}
