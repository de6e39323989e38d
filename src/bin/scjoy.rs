//! src/bin/scjoy.rs
//! Load a Star Citizen exported control map, merge the game's default
//! joystick bindings, validate the resulting plan, and optionally write the
//! reconciled document back in the game's format.
//!
//! Examples:
//!   scjoy --list-maps
//!   scjoy --map layout_exported.xml --catalog actionmap.json
//!   scjoy --map layout_exported.xml --apply --out mappings-reconciled.xml

use clap::Parser;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use sc_joystick_mapper::prelude::*;

#[derive(Parser, Debug)]
#[command(
    name = "scjoy",
    version,
    about = "Reconcile Star Citizen control maps for a two-joystick layout"
)]
struct Args {
    /// Exported control-map XML to load
    #[arg(short, long)]
    map: Option<PathBuf>,

    /// Game action catalog JSON (actionmap.json export)
    #[arg(long, default_value = "actionmap.json")]
    catalog: PathBuf,

    /// Config file path (created with defaults when missing)
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Output path for the reconciled XML (defaults next to --map)
    #[arg(short, long)]
    out: Option<PathBuf>,

    /// Apply the plan and write the output document
    #[arg(short, long)]
    apply: bool,

    /// Apply even when validation reports errors
    #[arg(long)]
    force: bool,

    /// Profile label for the written document
    #[arg(long)]
    profile_name: Option<String>,

    /// List exported control maps for the configured install and exit
    #[arg(long)]
    list_maps: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<(), String> {
    let args = Args::parse();
    let logger: Arc<dyn CoreLog> = Arc::new(StderrLog {
        verbose: args.verbose,
    });

    let config = Config::load(&args.config)?;

    if args.list_maps {
        match find_installation(&config.installation_path, config.install_type) {
            Some(install) => {
                for map in &install.exported_control_maps {
                    println!("{}", map.display());
                }
            }
            None => {
                logger.warn(&format!(
                    "no {} install under {}",
                    config.install_type,
                    config.installation_path.display()
                ));
            }
        }
        return Ok(());
    }

    let Some(map_path) = args.map.as_ref() else {
        return Err("--map is required unless --list-maps is given".into());
    };
    if !map_path.is_file() {
        return Err(format!(
            "--map not found or not a file: {}",
            map_path.display()
        ));
    }

    let catalog_text = std::fs::read_to_string(&args.catalog)
        .map_err(|e| format!("read {}: {e}", args.catalog.display()))?;
    let catalog = ActionCatalog::from_json(&catalog_text)
        .map_err(|e| format!("parse {}: {e}", args.catalog.display()))?;
    logger.debug(&format!("catalog: {} actions", catalog.len()));

    let loaded = load_control_profile(map_path, &config, &catalog, &VKB_GLADIATOR_EVO, &logger)?;
    logger.info(&format!(
        "profile '{}': {} left / {} right bindings, {} unsupported",
        loaded.profile.profile_name,
        loaded.profile.left.len(),
        loaded.profile.right.len(),
        loaded.unsupported.len()
    ));
    for record in &loaded.unsupported {
        logger.warn(&format!(
            "unsupported: {} on '{}' (modifier: {})",
            record.action_name, record.token, record.modifier
        ));
    }

    let planner = BindingPlanner::new(BindingPlannerContext::default());
    let plan = planner.plan_from_profile(&loaded.profile);
    let report = planner.validate_plan(&plan);
    print_report(&report, &logger);

    if !args.apply {
        return Ok(());
    }
    if report.has_errors() && !args.force {
        return Err("plan has validation errors; fix them or pass --force".into());
    }

    let out_path = args
        .out
        .clone()
        .unwrap_or_else(|| derive_output_path(map_path));
    let apply_report = save_control_map(
        &loaded.document,
        &plan,
        &loaded.instance_sides,
        &VKB_GLADIATOR_EVO,
        &config,
        args.profile_name.as_deref(),
        &out_path,
        &logger,
    )?;
    print_report(&apply_report, &logger);

    Ok(())
}

fn print_report(report: &ValidationReport, logger: &Arc<dyn CoreLog>) {
    for issue in &report.issues {
        match issue.level {
            IssueLevel::Info => logger.info(&issue.message),
            IssueLevel::Warning => logger.warn(&issue.message),
            IssueLevel::Error => logger.error(&issue.message),
        }
    }
}

fn derive_output_path(anchor: &Path) -> PathBuf {
    let stem = anchor
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "mappings".to_string());
    anchor
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(format!("{stem}-reconciled.xml"))
}
