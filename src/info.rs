use serde::Serialize;

use crate::config::{CONFIG_FILE, Config};
use crate::error::Error;
use crate::rewrite;

/// Everything a caller needs to know about what a run will generate.
#[derive(Serialize)]
struct Contract<'a> {
    /// Argument order of `L.control.appearance`.
    constructor_arguments: [&'static str; 4],
    /// Effective settings.
    settings: &'a Config,
    /// Crate version.
    version: &'static str,
}

/// Output the plugin contract and effective settings.
///
/// # Errors
///
/// Returns `Error::Json` if JSON output cannot be serialized.
pub fn run(config: &Config, json: bool) -> Result<(), Error> {
    let contract = Contract {
        constructor_arguments: ["baseLayers", "uneditableOverlays", "overlays", "options"],
        settings: config,
        version: env!("CARGO_PKG_VERSION"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&contract)?);
    } else {
        print_markdown(&contract);
    }
    return Ok(());
}

// ── Markdown output ───────────────────────────────────────────────────

fn print_markdown(contract: &Contract<'_>) {
    let settings = contract.settings;
    print!(
        "\
# appearance-patch {}

Swaps a folium map's `L.control.layers` widget for Leaflet.Control.Appearance.

## Workflow

    appearance-patch modify [FILE]    Back up, inject plugin, replace the layer control
    appearance-patch fixup [FILE]     Name tile layers, keep one base layer, fix the map id

## Plugin assets

    script      {}
    stylesheet  {}

## Generated control

",
        contract.version, settings.plugin_script_url, settings.plugin_css_url,
    );

    let call = rewrite::render_appearance_control(&settings.control, &settings.placeholder_map_id);
    for line in call.lines() {
        println!("    {line}");
    }

    println!("\n## Tile layer names (by position)\n");
    for (position, label) in settings.tile_layer_names.iter().enumerate() {
        println!("{}. {label}", position.saturating_add(1));
    }

    println!("\nSettings are read from `{CONFIG_FILE}` next to the target file when present.");
}
