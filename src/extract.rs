//! Pattern-based discovery of layers, display names, and fill styles.
//!
//! The document is treated as flat text. Each pattern targets one fixed shape
//! of the folium export; anything that doesn't match is simply not found.

use std::collections::HashMap;

use regex::Regex;
use tracing::{debug, warn};

use crate::error::Error;
use crate::types::{LayerDescriptor, LayerInventory, LayerStyle};

/// `var geo_json_<hex> = L.geoJson` declarations.
const GEOJSON_DECLARATION: &str = r"var (geo_json_[a-f0-9]+) = L\.geoJson";

/// `var tile_layer_<hex> = L.tileLayer` declarations.
pub const TILE_DECLARATION: &str = r"var (tile_layer_[a-f0-9]+) = L\.tileLayer";

/// Body of the legacy `var layer_control_<hex>_layers = {...};` object.
const CONTROL_LAYERS_OBJECT: &str = r"(?s)var layer_control_.*?_layers = \{(.*?)\};";

/// Escaped `>` as folium writes it inside overlay names.
const ESCAPED_GREATER_THAN: &str = r"\u003e";

/// Collect `name -> variable` pairs from one section of the control object,
/// storing them as `variable -> name`.
///
/// # Errors
///
/// Returns `Error::Pattern` if either pattern fails to compile.
fn collect_section_names(
    control_body: &str,
    section: &str,
    variable_prefix: &str,
    names: &mut HashMap<String, String>,
) -> Result<(), Error> {
    let section_pattern = Regex::new(&format!(r"(?s){section}\s*:\s*\{{(.*?)\}}"))?;
    let Some(body) = section_pattern.captures(control_body).and_then(|c| return c.get(1)) else {
        debug!(section, "control section not present");
        return Ok(());
    };

    let entry_pattern = Regex::new(&format!(r#""([^"]+)"\s*:\s*({variable_prefix}_[a-f0-9]+)"#))?;
    for cap in entry_pattern.captures_iter(body.as_str()) {
        let (Some(name), Some(variable)) = (cap.get(1), cap.get(2)) else {
            continue;
        };
        let name = if section == "overlays" {
            name.as_str().replace(ESCAPED_GREATER_THAN, ">")
        } else {
            name.as_str().to_string()
        };
        names.insert(variable.as_str().to_string(), name);
    }
    return Ok(());
}

/// Every first capture of `pattern`, in document order.
///
/// # Errors
///
/// Returns `Error::Pattern` if the pattern fails to compile.
pub fn declared_ids(content: &str, pattern: &str) -> Result<Vec<String>, Error> {
    let regex = Regex::new(pattern)?;
    return Ok(regex
        .captures_iter(content)
        .filter_map(|c| return c.get(1))
        .map(|m| return m.as_str().to_string())
        .collect());
}

/// Build descriptors for every GeoJSON layer, in declaration order.
///
/// # Errors
///
/// Returns `Error::Pattern` if a per-layer styler pattern fails to compile.
pub fn describe_vector_layers(
    content: &str,
    inventory: &LayerInventory,
) -> Result<Vec<LayerDescriptor>, Error> {
    let mut layers = Vec::with_capacity(inventory.geojson_layers.len());
    for layer_id in &inventory.geojson_layers {
        let style = layer_style(content, layer_id)?;
        layers.push(LayerDescriptor {
            id: layer_id.clone(),
            name: inventory.display_name(layer_id).to_string(),
            style,
        });
    }
    return Ok(layers);
}

/// Scan the document for GeoJSON layers, tile layers, and the display names
/// the legacy layer control assigns them.
///
/// # Errors
///
/// Returns `Error::Pattern` if a pattern fails to compile.
pub fn layer_inventory(content: &str) -> Result<LayerInventory, Error> {
    let geojson_layers = declared_ids(content, GEOJSON_DECLARATION)?;
    let tile_layers = declared_ids(content, TILE_DECLARATION)?;
    let mut layer_names = HashMap::new();

    let control = Regex::new(CONTROL_LAYERS_OBJECT)?;
    if let Some(body) = control.captures(content).and_then(|c| return c.get(1)) {
        collect_section_names(body.as_str(), "base_layers", "tile_layer", &mut layer_names)?;
        collect_section_names(body.as_str(), "overlays", "geo_json", &mut layer_names)?;
    } else {
        warn!("no legacy layer control object; layers keep their variable names");
    }

    return Ok(LayerInventory {
        geojson_layers,
        layer_names,
        tile_layers,
    });
}

/// Read `fillColor` and `fillOpacity` from the object returned by
/// `function <layer_id>_styler(feature)`. Missing pieces take the defaults.
///
/// # Errors
///
/// Returns `Error::Pattern` if the styler pattern fails to compile.
pub fn layer_style(content: &str, layer_id: &str) -> Result<LayerStyle, Error> {
    let styler = Regex::new(&format!(
        r"(?s)function {}_styler\(feature\) \{{.*?return \{{([^}}]+)\}};",
        regex::escape(layer_id)
    ))?;
    let Some(body) = styler.captures(content).and_then(|c| return c.get(1)) else {
        return Ok(LayerStyle::default());
    };

    let defaults = LayerStyle::default();
    let color = Regex::new(r#""fillColor"\s*:\s*"([^"]+)""#)?;
    let opacity = Regex::new(r#""fillOpacity"\s*:\s*([\d.]+)"#)?;

    let fill_color = color
        .captures(body.as_str())
        .and_then(|c| return c.get(1))
        .map_or(defaults.fill_color, |m| return m.as_str().to_string());

    let fill_opacity = match opacity.captures(body.as_str()).and_then(|c| return c.get(1)) {
        None => defaults.fill_opacity,
        Some(m) => m.as_str().parse::<f64>().unwrap_or_else(|_err| {
            warn!(layer_id, raw = m.as_str(), "unreadable fillOpacity, using default");
            return defaults.fill_opacity;
        }),
    };

    return Ok(LayerStyle {
        fill_color,
        fill_opacity,
    });
}
