//! CLI commands for appearance-patch: modify, fixup, info.

use std::path::Path;

use crate::backup;
use crate::config::Config;
use crate::error;
use crate::extract;
use crate::fixup::{self, AttachFix};
use crate::journal::ModificationLog;
use crate::rewrite;

/// Title of the modifier's log file.
const MODIFY_LOG_TITLE: &str = "Leaflet.Control.Appearance Modification Log";

/// Title of the fixup pass's log file.
const FIXUP_LOG_TITLE: &str = "Leaflet.Control.Appearance Fixup Log";

/// Directory holding the target, its backups, logs, and config.
fn document_dir(target: &Path) -> &Path {
    return target
        .parent()
        .filter(|p| return !p.as_os_str().is_empty())
        .unwrap_or_else(|| return Path::new("."));
}

/// Fail before any side effect if the target is missing.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if `target` is not a file.
fn ensure_exists(target: &Path) -> Result<(), error::Error> {
    if target.is_file() {
        return Ok(());
    }
    return Err(error::Error::FileNotFound { path: target.to_path_buf() });
}

/// Correct the document `modify` produced: name tile layers, leave a single
/// base layer attached, and attach the appearance control to the real map.
///
/// The map-id step is the only one that checks its own result; the naming and
/// commenting steps change the document again on every run.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the target is missing (before any file is
/// written), or errors from config loading, backup, pattern compilation, or I/O.
pub fn fixup(target: &Path) -> Result<(), error::Error> {
    ensure_exists(target)?;
    let dir = document_dir(target);
    let config = Config::load(dir)?;
    let mut log = ModificationLog::new(FIXUP_LOG_TITLE);

    let backup_path = backup::create(target, &backup::timestamp())?;
    log.record(format!("Created backup: {}", backup_path.display()));

    log.record(format!("Loading {}...", target.display()));
    let mut content = std::fs::read_to_string(target)?;

    let Some(map_id) = fixup::map_id(&content)? else {
        log.record("ERROR: Could not find map variable!");
        let log_path = log.write(dir, "fixup_log", &backup::timestamp())?;
        println!("\nLog saved to: {}", log_path.display());
        return Ok(());
    };
    log.record(format!("Found actual map ID: {map_id}"));

    let tile_layers = extract::declared_ids(&content, extract::TILE_DECLARATION)?;
    log.record(format!("Found {} tile layers: {}", tile_layers.len(), tile_layers.join(", ")));

    let named = fixup::name_tile_layers(&mut content, &config.tile_layer_names)?;
    for (layer_id, label) in &named {
        log.record(format!("Added name '{label}' to {layer_id}"));
    }
    for layer_id in tile_layers.iter().skip(named.len()) {
        log.record(format!("No name available for {layer_id}; left unnamed"));
    }

    let disabled = fixup::disable_extra_tile_attachments(&mut content)?;
    if disabled > 0 {
        log.record(format!("Commented out {disabled} tile layer .addTo() calls"));
    }

    match fixup::retarget_appearance_control(&mut content, &map_id)? {
        AttachFix::AlreadyCorrect => log.record("Map ID is already correct"),
        AttachFix::Missing => log.record("WARNING: Could not find appearance control definition!"),
        AttachFix::Retargeted { from } => log.record(format!("Fixing map ID: {from} -> {map_id}")),
    }

    log.record("Saving fixed content...");
    std::fs::write(target, &content)?;
    let log_path = log.write(dir, "fixup_log", &backup::timestamp())?;

    println!("\nLog saved to: {}", log_path.display());
    println!("Fix complete!");
    println!("\nChanges made:");
    println!("1. Added 'name' property to {} tile layers", named.len());
    println!("2. Fixed map ID to: {map_id}");
    println!("3. Commented out {disabled} redundant .addTo() calls for base layers");
    return Ok(());
}

/// Print the plugin contract and the settings a run in `target`'s directory
/// would use.
///
/// # Errors
///
/// Returns errors from config loading or JSON serialization.
pub fn info(target: &Path, json: bool) -> Result<(), error::Error> {
    let config = Config::load(document_dir(target))?;
    return crate::info::run(&config, json);
}

/// Back up the target, swap its layer control for the appearance control,
/// save, and write the modification log.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if the target is missing (before any file is
/// written), or errors from config loading, backup, pattern compilation, or I/O.
pub fn modify(target: &Path) -> Result<(), error::Error> {
    ensure_exists(target)?;
    let dir = document_dir(target);
    let config = Config::load(dir)?;
    let mut log = ModificationLog::new(MODIFY_LOG_TITLE);

    println!("Starting Leaflet.Control.Appearance integration...\n");

    let backup_path = backup::create(target, &backup::timestamp())?;
    log.record(format!("Created backup: {}", backup_path.display()));

    let mut content = std::fs::read_to_string(target)?;
    log.record(format!("Loaded {} ({} characters)", target.display(), content.chars().count()));

    let inventory = extract::layer_inventory(&content)?;
    log.record(format!(
        "Found {} tile layers and {} GeoJSON layers",
        inventory.tile_layers.len(),
        inventory.geojson_layers.len()
    ));

    let inserted = rewrite::add_plugin_references(&mut content, &config)?;
    match (inserted.script, inserted.stylesheet) {
        (true, true) => log.record("Added Leaflet.Control.Appearance plugin references"),
        (true, false) => log.record("Added Leaflet.Control.Appearance script (no Leaflet stylesheet tag found)"),
        (false, true) => log.record("Added Leaflet.Control.Appearance stylesheet (no Leaflet script tag found)"),
        (false, false) => log.record("No Leaflet script or stylesheet tag found; plugin references not added"),
    }

    let layers = extract::describe_vector_layers(&content, &inventory)?;
    rewrite::annotate_vector_layers(&mut content, &layers)?;
    log.record(format!("Modified {} GeoJSON layers with appearance options", layers.len()));

    if rewrite::replace_layer_control(&mut content, &inventory, &config)? > 0 {
        log.record("Replaced L.control.layers() with L.control.appearance()");
    } else {
        log.record("WARNING: No L.control.layers() block found; layer control left unchanged");
    }

    std::fs::write(target, &content)?;
    log.record(format!("Saved modified content to {}", target.display()));

    let log_path = log.write(dir, "modification_log", &backup::timestamp())?;
    println!("\nLog saved to: {}", log_path.display());

    let rule = "=".repeat(50);
    println!("\n{rule}");
    println!("Modification complete!");
    println!("Original file backed up to: {}", backup_path.display());
    println!("Modified file: {}", target.display());
    println!("{rule}");
    return Ok(());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_file_name_lives_in_current_dir() {
        assert_eq!(document_dir(Path::new("index.html")), Path::new("."));
        assert_eq!(document_dir(Path::new("out/index.html")), Path::new("out"));
    }

    #[test]
    fn missing_target_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("index.html");

        assert!(matches!(modify(&target), Err(error::Error::FileNotFound { .. })));
        assert!(matches!(fixup(&target), Err(error::Error::FileNotFound { .. })));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn fixup_without_map_keeps_document() {
        let dir = tempfile::tempdir().unwrap();
        let target = dir.path().join("index.html");
        std::fs::write(&target, "<html>no map</html>").unwrap();

        fixup(&target).unwrap();

        assert_eq!(std::fs::read_to_string(&target).unwrap(), "<html>no map</html>");
        let logs: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with("fixup_log_"))
            .collect();
        assert_eq!(logs.len(), 1);
        let text = std::fs::read_to_string(logs.first().unwrap().path()).unwrap();
        assert!(text.contains("ERROR: Could not find map variable!"));
    }
}
