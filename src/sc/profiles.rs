use chrono::Local;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::CoreLog;
use crate::bindings::action::ActionCatalog;
use crate::bindings::binding::Binding;
use crate::bindings::control_map::ControlMapDoc;
use crate::bindings::default_merge::DefaultBindingMerger;
use crate::bindings::input_codec::{
    InputCodec, InputParseError, InstanceSideTable, UnsupportedAction, instance_sides_from_options,
};
use crate::bindings::layout::DeviceLayout;
use crate::bindings::mutator::ControlMapMutator;
use crate::bindings::plan::{BindingPlan, ValidationIssue, ValidationReport};
use crate::bindings::profile::ControlProfile;
use crate::config::Config;
use crate::sc::install::GameInstallType;

/// Everything `load_control_profile` produces: the resolved profile, the
/// parsed document (kept as the template for later applies), the instance
/// table derived from the document, and the load diagnostics.
#[derive(Debug)]
pub struct LoadedProfile {
    pub profile: ControlProfile,
    pub document: ControlMapDoc,
    pub instance_sides: InstanceSideTable,
    pub unsupported: Vec<UnsupportedAction>,
    pub report: ValidationReport,
}

/// Read, parse, translate and default-merge one exported control map.
/// Unsupported rebinds become report entries; only an unreadable or
/// unparsable document is fatal.
pub fn load_control_profile(
    path: &Path,
    config: &Config,
    catalog: &ActionCatalog,
    layout: &DeviceLayout,
    logger: &Arc<dyn CoreLog>,
) -> Result<LoadedProfile, String> {
    let content =
        fs::read_to_string(path).map_err(|e| format!("read {}: {e}", path.display()))?;
    load_profile_from_str(&content, &path.display().to_string(), config, catalog, layout, logger)
}

pub fn load_profile_from_str(
    content: &str,
    source: &str,
    config: &Config,
    catalog: &ActionCatalog,
    layout: &DeviceLayout,
    logger: &Arc<dyn CoreLog>,
) -> Result<LoadedProfile, String> {
    let document = ControlMapDoc::parse(content).map_err(|e| format!("parse {source}: {e}"))?;

    let instance_sides = instance_sides_from_options(
        &document.options,
        &config.joystick_product_filter,
        &config.joystick_side_identifier_left,
    );
    let codec = InputCodec::new(&instance_sides, layout, &config.modifier_key);

    let mut profile = ControlProfile::new(document.profile_name.clone());
    profile.metadata.insert("source".to_string(), source.to_string());
    let mut unsupported: Vec<UnsupportedAction> = Vec::new();

    for map in document.action_maps.values() {
        for action in map.actions.values() {
            for rebind in &action.rebinds {
                let parsed = match InputCodec::split(&rebind.input) {
                    Ok(parsed) => parsed,
                    // Non-joystick rebinds and explicit unbinds are fine.
                    Err(InputParseError::NotApplicable) | Err(InputParseError::EmptySlot) => {
                        continue;
                    }
                    Err(err) => {
                        logger.warn(&format!(
                            "[load_control_profile] {source}: {}.{}: {err}",
                            map.name, action.name
                        ));
                        unsupported.push(UnsupportedAction {
                            action_name: action.name.clone(),
                            token: rebind.input.clone(),
                            modifier: rebind.input.contains('+'),
                            side: None,
                        });
                        continue;
                    }
                };

                let side = codec.side_of_instance(parsed.instance);
                let slot = match codec.resolve(&parsed) {
                    Ok(slot) => slot,
                    Err(err) => {
                        logger.warn(&format!(
                            "[load_control_profile] {source}: {}.{}: {err}",
                            map.name, action.name
                        ));
                        unsupported.push(UnsupportedAction {
                            action_name: action.name.clone(),
                            token: parsed.slot_id.clone(),
                            modifier: parsed.modifier,
                            side,
                        });
                        continue;
                    }
                };

                let Some(def) = catalog.get(&action.name) else {
                    logger.warn(&format!(
                        "[load_control_profile] action {} not found in the game catalog",
                        action.name
                    ));
                    unsupported.push(UnsupportedAction {
                        action_name: action.name.clone(),
                        token: parsed.slot_id.clone(),
                        modifier: parsed.modifier,
                        side,
                    });
                    continue;
                };

                let target = profile.side_mut(slot.side);
                let mut binding = Binding::new(
                    def.identifier.clone(),
                    slot,
                    parsed.modifier,
                    def.activation.is_hold(),
                    rebind.multitap.is_some(),
                );
                binding.tags.insert("user".to_string());
                target.add(binding);
            }
        }
    }

    let merger = DefaultBindingMerger::new(catalog, &codec);
    let (profile, merge_unsupported) = merger.merge(&profile);
    unsupported.extend(merge_unsupported);

    let mut report = ValidationReport::default();
    for record in &unsupported {
        let side = record.side.map(|s| s.name()).unwrap_or("unknown");
        report.add(ValidationIssue::warning(format!(
            "Unsupported rebind: action {} on '{}' (modifier: {}, side: {side}).",
            record.action_name, record.token, record.modifier
        )));
    }

    logger.info(&format!(
        "[load_control_profile] {source}: {} left / {} right bindings, {} unsupported",
        profile.left.len(),
        profile.right.len(),
        unsupported.len()
    ));

    Ok(LoadedProfile {
        profile,
        document,
        instance_sides,
        unsupported,
        report,
    })
}

/// Apply a plan to the template document and write the result. Returns the
/// mutator's report; a missing template or failed write is fatal and leaves
/// no partial file behind the previous one.
pub fn save_control_map(
    template: &ControlMapDoc,
    plan: &BindingPlan,
    instance_sides: &InstanceSideTable,
    layout: &DeviceLayout,
    config: &Config,
    profile_name: Option<&str>,
    out_path: &Path,
    logger: &Arc<dyn CoreLog>,
) -> Result<ValidationReport, String> {
    let codec = InputCodec::new(instance_sides, layout, &config.modifier_key);
    let mutator = ControlMapMutator::new(&codec, &config.owned_instances());

    let (mut doc, report) = mutator.apply(template, plan);
    doc.profile_name = profile_name.map(str::to_string).unwrap_or_else(|| {
        format!(
            "scjoy-{}-{}",
            config.install_type,
            Local::now().format("%Y%m%d-%H%M")
        )
    });

    doc.write_xml(out_path)?;
    logger.info(&format!("wrote control map {}", out_path.display()));
    Ok(report)
}

/// Compute the per-user data folder for this tool.
pub fn appdata_dir(app_id: &str) -> Result<PathBuf, String> {
    let base = directories::BaseDirs::new().ok_or("Could not find user data directory")?;
    let dir = base.data_dir().join(app_id);
    fs::create_dir_all(&dir).map_err(|e| e.to_string())?;
    Ok(dir)
}

/// `<AppData>/<app_id>/profile_<CHANNEL>.json` (does not create it).
pub fn profile_cache_path(app_id: &str, ty: GameInstallType) -> Result<PathBuf, String> {
    Ok(appdata_dir(app_id)?.join(format!("profile_{}.json", ty.name())))
}

/// Snapshot the last loaded profile so the UI can restore it without
/// re-reading the game export.
pub fn cache_profile(
    profile: &ControlProfile,
    app_id: &str,
    ty: GameInstallType,
    logger: &Arc<dyn CoreLog>,
) -> Result<PathBuf, String> {
    let path = profile_cache_path(app_id, ty)?;
    let json = serde_json::to_string_pretty(profile)
        .map_err(|e| format!("serialize profile: {e}"))?;
    fs::write(&path, json).map_err(|e| format!("write {}: {e}", path.display()))?;
    logger.debug(&format!("cached profile at {}", path.display()));
    Ok(path)
}

pub fn load_cached_profile(
    app_id: &str,
    ty: GameInstallType,
    logger: &Arc<dyn CoreLog>,
) -> Result<ControlProfile, String> {
    let path = profile_cache_path(app_id, ty)?;
    if !path.try_exists().unwrap_or(false) {
        return Err(format!("no cached profile at {}", path.display()));
    }
    let content =
        fs::read_to_string(&path).map_err(|e| format!("read {}: {e}", path.display()))?;
    let profile: ControlProfile =
        serde_json::from_str(&content).map_err(|e| format!("parse {}: {e}", path.display()))?;
    logger.info(&format!(
        "loaded cached profile '{}' ({} bindings)",
        profile.profile_name,
        profile.binding_count()
    ));
    Ok(profile)
}
