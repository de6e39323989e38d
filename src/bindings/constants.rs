/// Device tag the game uses for joystick rebind inputs ("js1_", "js2_", ...).
pub const DEVICE_TAG: &str = "js";

/// The game writes multitap rebinds as `multiTap="2"`; no other count exists.
pub const MULTITAP_COUNT: u32 = 2;

/// Slider-type inputs have no button representation and are never mappable.
pub const SLIDER_TOKEN: &str = "slider";

/// Modifier key token used when none is configured.
pub const DEFAULT_MODIFIER_KEY: &str = "rctrl";

/// Activation mode name that marks an action as hold-triggered.
pub const HOLD_ACTIVATION_MODE: &str = "delayed_press";
