//! Rewrites applied by `modify`: plugin references, GeoJSON appearance
//! options, and the swap from `L.control.layers` to `L.control.appearance`.

use std::collections::HashMap;
use std::fmt::Write as _;

use regex::{Captures, NoExpand, Regex};

use crate::config::{Config, ControlOptions};
use crate::error::Error;
use crate::types::{LayerDescriptor, LayerInventory, format_opacity};

/// First Leaflet script include in `<head>`.
const LEAFLET_SCRIPT: &str = r#"(<script src="https://cdn\.jsdelivr\.net/npm/leaflet@.*?</script>)"#;

/// First Leaflet stylesheet include in `<head>`.
const LEAFLET_STYLESHEET: &str = r#"(<link rel="stylesheet" href="https://cdn\.jsdelivr\.net/npm/leaflet@.*?/>)"#;

/// Opening of a GeoJSON layer's options object.
const GEOJSON_OPTIONS_OPEN: &str = r"var (geo_json_[a-f0-9]+) = L\.geoJson\(null, \{";

/// From the legacy control's layer object through its `.addTo(map)` call.
const LEGACY_CONTROL_BLOCK: &str = concat!(
    r"(?s)var layer_control_[a-f0-9]+_layers = \{.*?\};",
    r".*?let layer_control_[a-f0-9]+ = L\.control\.layers\(.*?\)\.addTo\(map_[a-f0-9]+\);",
);

/// Which plugin references were inserted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PluginInsertion {
    /// A `<script>` followed the Leaflet script.
    pub script: bool,
    /// A `<link>` followed the Leaflet stylesheet.
    pub stylesheet: bool,
}

/// Insert the plugin script after the first Leaflet script tag and the plugin
/// stylesheet after the first Leaflet stylesheet tag. A missing anchor leaves
/// that half of the document untouched.
///
/// # Errors
///
/// Returns `Error::Pattern` if an anchor pattern fails to compile.
pub fn add_plugin_references(content: &mut String, config: &Config) -> Result<PluginInsertion, Error> {
    let script_tag = format!(r#"    <script src="{}"></script>"#, config.plugin_script_url);
    let css_tag = format!(r#"    <link rel="stylesheet" href="{}"/>"#, config.plugin_css_url);

    let script = insert_after_first(content, &Regex::new(LEAFLET_SCRIPT)?, &script_tag);
    let stylesheet = insert_after_first(content, &Regex::new(LEAFLET_STYLESHEET)?, &css_tag);

    return Ok(PluginInsertion { script, stylesheet });
}

/// Put `name`, `color`, and `opacity` at the front of each described GeoJSON
/// layer's options object. Existing fields are not checked, so a second pass
/// adds a second set. Returns the number of constructors rewritten.
///
/// # Errors
///
/// Returns `Error::Pattern` if the constructor pattern fails to compile.
pub fn annotate_vector_layers(content: &mut String, layers: &[LayerDescriptor]) -> Result<usize, Error> {
    let by_id: HashMap<&str, &LayerDescriptor> = layers.iter().map(|l| return (l.id.as_str(), l)).collect();
    let pattern = Regex::new(GEOJSON_OPTIONS_OPEN)?;
    let mut rewritten = 0_usize;

    let updated = pattern.replace_all(content, |caps: &Captures<'_>| {
        let whole = caps.get(0).map_or("", |m| return m.as_str());
        let Some(layer) = caps.get(1).and_then(|id| return by_id.get(id.as_str())) else {
            return whole.to_string();
        };
        rewritten = rewritten.saturating_add(1);
        return format!(
            "{whole}\n                name: \"{}\",\n                color: \"{}\",\n                opacity: {},",
            layer.name,
            layer.style.fill_color,
            format_opacity(layer.style.fill_opacity),
        );
    });

    *content = updated.into_owned();
    return Ok(rewritten);
}

/// Declarations of the three arrays the plugin constructor takes.
/// `uneditableOverlays` is always empty.
pub fn build_layer_arrays(inventory: &LayerInventory) -> String {
    let mut out = String::from("        var baseLayers = [\n");
    for tile_id in &inventory.tile_layers {
        let _ = writeln!(out, "            {tile_id},");
    }
    out.push_str("        ];\n\n");

    out.push_str("        var uneditableOverlays = [];\n\n");

    out.push_str("        var overlays = [\n");
    for geo_id in &inventory.geojson_layers {
        let _ = writeln!(out, "            {geo_id},");
    }
    out.push_str("        ];\n\n");
    return out;
}

/// Insert `\n<insertion>` after the first match. Returns whether it matched.
fn insert_after_first(content: &mut String, anchor: &Regex, insertion: &str) -> bool {
    let Some(end) = anchor.find(content).map(|m| return m.end()) else {
        return false;
    };
    content.insert_str(end, &format!("\n{insertion}"));
    return true;
}

/// The `L.control.appearance(...)` call attached to `map_id`.
pub fn render_appearance_control(options: &ControlOptions, map_id: &str) -> String {
    return format!(
        "\
var appearanceControl = L.control.appearance(
            baseLayers,
            uneditableOverlays,
            overlays,
            {{
                position: '{}',
                radioCheckbox: {},
                layerName: {},
                opacity: {},
                color: {},
                remove: {}
            }}
        ).addTo({map_id});",
        options.position,
        options.radio_checkbox,
        options.layer_name,
        options.opacity,
        options.color,
        options.remove,
    );
}

/// Replace every legacy layer-control block with the generated arrays and an
/// appearance control attached to the configured placeholder map. Returns the
/// number of blocks replaced; zero leaves the document as it was.
///
/// # Errors
///
/// Returns `Error::Pattern` if the block pattern fails to compile.
pub fn replace_layer_control(
    content: &mut String,
    inventory: &LayerInventory,
    config: &Config,
) -> Result<usize, Error> {
    let pattern = Regex::new(LEGACY_CONTROL_BLOCK)?;
    let replaced = pattern.find_iter(content).count();
    if replaced == 0 {
        return Ok(0);
    }

    let replacement = format!(
        "{}{}",
        build_layer_arrays(inventory),
        render_appearance_control(&config.control, &config.placeholder_map_id),
    );
    *content = pattern.replace_all(content, NoExpand(&replacement)).into_owned();
    return Ok(replaced);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract;
    use crate::types::LayerStyle;

    const MAP: &str = include_str!("../tests/fixtures/map/index.html");

    fn descriptor(id: &str, name: &str, opacity: f64) -> LayerDescriptor {
        return LayerDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            style: LayerStyle { fill_color: "#123456".to_string(), fill_opacity: opacity },
        };
    }

    #[test]
    fn plugin_tags_follow_their_anchors() {
        let mut content = MAP.to_string();
        let inserted = add_plugin_references(&mut content, &Config::built_in()).unwrap();

        assert_eq!(inserted, PluginInsertion { script: true, stylesheet: true });
        assert_eq!(content.matches("L.Control.Appearance.js").count(), 1);
        assert_eq!(content.matches("L.Control.Appearance.css").count(), 1);
        assert!(content.contains(
            "leaflet.js\"></script>\n    <script src=\"https://cdn.jsdelivr.net/gh/Kanahiro/Leaflet.Control.Appearance@master/dist/L.Control.Appearance.js\"></script>"
        ));
        assert!(content.contains(
            "leaflet.css\"/>\n    <link rel=\"stylesheet\" href=\"https://cdn.jsdelivr.net/gh/Kanahiro/Leaflet.Control.Appearance@master/dist/L.Control.Appearance.css\"/>"
        ));
    }

    #[test]
    fn plugin_tags_skipped_without_anchor() {
        let original = "<head>\n<script src=\"https://unpkg.com/leaflet/dist/leaflet.js\"></script>\n</head>";
        let mut content = original.to_string();
        let inserted = add_plugin_references(&mut content, &Config::built_in()).unwrap();

        assert_eq!(inserted, PluginInsertion { script: false, stylesheet: false });
        assert_eq!(content, original);
    }

    #[test]
    fn vector_options_lead_with_name_color_opacity() {
        let mut content = MAP.to_string();
        let inventory = extract::layer_inventory(&content).unwrap();
        let layers = extract::describe_vector_layers(&content, &inventory).unwrap();

        let rewritten = annotate_vector_layers(&mut content, &layers).unwrap();

        assert_eq!(rewritten, 1);
        assert!(content.contains(
            "var geo_json_7c8d9e0f1a2b3c4d5e6f708192a3b4c5 = L.geoJson(null, {\n                name: \"Overlay\",\n                color: \"#e31a1c\",\n                opacity: 0.45,\n                onEachFeature:"
        ));
    }

    #[test]
    fn annotating_twice_duplicates_fields() {
        let mut content = "var geo_json_ab = L.geoJson(null, {\n});".to_string();
        let layers = [descriptor("geo_json_ab", "Parks", 0.6)];

        annotate_vector_layers(&mut content, &layers).unwrap();
        annotate_vector_layers(&mut content, &layers).unwrap();

        assert_eq!(content.matches("name: \"Parks\"").count(), 2);
        assert_eq!(content.matches("opacity: 0.6,").count(), 2);
    }

    #[test]
    fn undescribed_layers_are_left_alone() {
        let original = "var geo_json_cd = L.geoJson(null, {\n});";
        let mut content = original.to_string();

        let rewritten = annotate_vector_layers(&mut content, &[descriptor("geo_json_ab", "Parks", 1.0)]).unwrap();

        assert_eq!(rewritten, 0);
        assert_eq!(content, original);
    }

    #[test]
    fn arrays_list_ids_in_order() {
        let inventory = LayerInventory {
            geojson_layers: vec!["geo_json_1".to_string(), "geo_json_2".to_string()],
            layer_names: HashMap::new(),
            tile_layers: vec!["tile_layer_a".to_string()],
        };

        let arrays = build_layer_arrays(&inventory);
        assert_eq!(
            arrays,
            "        var baseLayers = [\n            tile_layer_a,\n        ];\n\n\
             \x20       var uneditableOverlays = [];\n\n\
             \x20       var overlays = [\n            geo_json_1,\n            geo_json_2,\n        ];\n\n"
        );
    }

    #[test]
    fn control_options_render_every_key() {
        let rendered = render_appearance_control(&ControlOptions::default(), "map_ff");
        for key in ["position: 'topright'", "radioCheckbox: true", "layerName: true", "opacity: true", "color: true", "remove: true"] {
            assert!(rendered.contains(key), "missing {key}");
        }
        assert!(rendered.ends_with(").addTo(map_ff);"));
    }

    #[test]
    fn legacy_control_becomes_appearance_control() {
        let mut content = MAP.to_string();
        let inventory = extract::layer_inventory(&content).unwrap();
        let config = Config::built_in();

        let replaced = replace_layer_control(&mut content, &inventory, &config).unwrap();

        assert_eq!(replaced, 1);
        assert!(!content.contains("L.control.layers("));
        assert!(!content.contains("layer_control_"));
        assert!(content.contains("var baseLayers = [\n            tile_layer_0a1b2c3d4e5f60718293a4b5c6d7e8f9,\n        ];"));
        assert!(content.contains("var overlays = [\n            geo_json_7c8d9e0f1a2b3c4d5e6f708192a3b4c5,\n        ];"));
        assert!(content.contains(&format!(").addTo({});", config.placeholder_map_id)));
    }

    #[test]
    fn layer_without_styler_gets_default_color_and_opacity() {
        let mut content = String::from("var geo_json_ab12 = L.geoJson(null, {\n});\n");

        let inventory = extract::layer_inventory(&content).unwrap();
        let layers = extract::describe_vector_layers(&content, &inventory).unwrap();
        let annotated = annotate_vector_layers(&mut content, &layers).unwrap();

        assert_eq!(annotated, 1);
        assert!(content.contains(
            "L.geoJson(null, {\n                name: \"geo_json_ab12\",\n                color: \"#000000\",\n                opacity: 0.6,"
        ));
    }

    #[test]
    fn missing_control_block_is_a_no_op() {
        let original = "var map_ab = L.map(\"map_ab\", {});";
        let mut content = original.to_string();

        let replaced = replace_layer_control(&mut content, &LayerInventory::default(), &Config::built_in()).unwrap();

        assert_eq!(replaced, 0);
        assert_eq!(content, original);
    }
}
