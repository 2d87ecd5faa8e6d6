/// Core domain types for layer discovery and rewriting.
use std::collections::HashMap;

/// Fill color used when a layer has no styler or the styler omits `fillColor`.
pub const DEFAULT_FILL_COLOR: &str = "#000000";

/// Fill opacity used when a layer has no styler or the styler omits `fillOpacity`.
pub const DEFAULT_FILL_OPACITY: f64 = 0.6;

/// Everything the modifier learns about a document's layers before rewriting.
/// Ids are kept in the order they are declared in the script.
#[derive(Debug, Clone, Default)]
pub struct LayerInventory {
    /// `geo_json_<hex>` variables, in declaration order.
    pub geojson_layers: Vec<String>,
    /// Display names from the legacy layer control, keyed by variable.
    pub layer_names: HashMap<String, String>,
    /// `tile_layer_<hex>` variables, in declaration order.
    pub tile_layers: Vec<String>,
}

impl LayerInventory {
    /// Display name for a layer, falling back to the variable itself.
    pub fn display_name<'a>(&'a self, layer_id: &'a str) -> &'a str {
        return self.layer_names.get(layer_id).map_or(layer_id, String::as_str);
    }
}

/// A vector layer ready to be annotated with appearance options.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerDescriptor {
    /// The layer variable, e.g. `geo_json_1f2e`.
    pub id: String,
    /// Human-readable name shown by the control.
    pub name: String,
    /// Fill color and opacity read from the layer's styler.
    pub style: LayerStyle,
}

/// Fill styling pulled out of a `<layer>_styler` function.
/// Values are copied verbatim; nothing checks they are valid CSS or in `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerStyle {
    /// The `fillColor` string.
    pub fill_color: String,
    /// The `fillOpacity` number.
    pub fill_opacity: f64,
}

impl Default for LayerStyle {
    fn default() -> Self {
        return Self {
            fill_color: DEFAULT_FILL_COLOR.to_string(),
            fill_opacity: DEFAULT_FILL_OPACITY,
        };
    }
}

/// Render an opacity as a JavaScript number literal.
/// Whole numbers keep one decimal place so `1` is written as `1.0`.
pub fn format_opacity(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        return format!("{value:.1}");
    }
    return format!("{value}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_variable() {
        let mut inventory = LayerInventory::default();
        inventory.layer_names.insert("geo_json_1".to_string(), "Parks".to_string());

        assert_eq!(inventory.display_name("geo_json_1"), "Parks");
        assert_eq!(inventory.display_name("geo_json_2"), "geo_json_2");
    }

    #[test]
    fn opacity_literals() {
        assert_eq!(format_opacity(0.6), "0.6");
        assert_eq!(format_opacity(0.45), "0.45");
        assert_eq!(format_opacity(1.0), "1.0");
        assert_eq!(format_opacity(0.0), "0.0");
    }
}
