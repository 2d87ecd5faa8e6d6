use std::path::Path;

use serde::Serialize;

use crate::error::Error;

/// Name of the optional settings file read from the target's directory.
pub const CONFIG_FILE: &str = ".appearance.toml";

/// Attach target written by `modify`; `fixup` later points it at the real map.
const DEFAULT_PLACEHOLDER_MAP_ID: &str = "map_d2a376f3bebc49e2468588d70e0e50c9";

/// Stylesheet shipped with Leaflet.Control.Appearance.
const DEFAULT_PLUGIN_CSS_URL: &str =
    "https://cdn.jsdelivr.net/gh/Kanahiro/Leaflet.Control.Appearance@master/dist/L.Control.Appearance.css";

/// Script shipped with Leaflet.Control.Appearance.
const DEFAULT_PLUGIN_SCRIPT_URL: &str =
    "https://cdn.jsdelivr.net/gh/Kanahiro/Leaflet.Control.Appearance@master/dist/L.Control.Appearance.js";

/// Positional labels for tile layers, in declaration order.
const DEFAULT_TILE_LAYER_NAMES: [&str; 4] =
    ["OpenStreetMap", "Topographic Map", "Light Map", "Satellite Imagery"];

/// Effective settings for a run, loaded from `.appearance.toml`.
/// Every key is optional; missing keys fall back to the built-in values.
#[derive(Debug, Clone, Serialize)]
pub struct Config {
    /// Options object passed to `L.control.appearance`.
    pub control: ControlOptions,
    /// Map variable the generated control is attached to before `fixup`.
    pub placeholder_map_id: String,
    /// Plugin stylesheet URL.
    pub plugin_css_url: String,
    /// Plugin script URL.
    pub plugin_script_url: String,
    /// Labels assigned to tile layers by position.
    pub tile_layer_names: Vec<String>,
}

/// The plugin's recognised configuration keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ControlOptions {
    /// Show the per-layer color picker.
    pub color: bool,
    /// Show the layer name next to each entry.
    pub layer_name: bool,
    /// Show the per-layer opacity slider.
    pub opacity: bool,
    /// Leaflet control corner, e.g. `topright`.
    pub position: String,
    /// Render base layers as radio buttons.
    pub radio_checkbox: bool,
    /// Show the remove button.
    pub remove: bool,
}

/// Raw TOML structure for `.appearance.toml`.
#[derive(serde::Deserialize)]
struct AppearanceTomlConfig {
    #[serde(default)]
    control: Option<ControlOptions>,
    #[serde(default)]
    placeholder_map_id: Option<String>,
    #[serde(default)]
    plugin_css_url: Option<String>,
    #[serde(default)]
    plugin_script_url: Option<String>,
    #[serde(default)]
    tile_layer_names: Option<Vec<String>>,
}

impl Config {
    /// Built-in settings matching the published plugin and the stock folium export.
    pub fn built_in() -> Self {
        return Self {
            control: ControlOptions::default(),
            placeholder_map_id: DEFAULT_PLACEHOLDER_MAP_ID.to_string(),
            plugin_css_url: DEFAULT_PLUGIN_CSS_URL.to_string(),
            plugin_script_url: DEFAULT_PLUGIN_SCRIPT_URL.to_string(),
            tile_layer_names: DEFAULT_TILE_LAYER_NAMES.iter().map(|n| return (*n).to_string()).collect(),
        };
    }

    /// Load config from `.appearance.toml` in the given directory.
    /// Returns the built-in settings if the file doesn't exist, but never
    /// falls back to them when the file exists and is malformed.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(dir: &Path) -> Result<Self, Error> {
        let path = dir.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::built_in()),
            Err(e) => return Err(Error::Io(e)),
            Ok(c) => c,
        };

        let raw: AppearanceTomlConfig = toml::from_str(&content)?;
        let defaults = Self::built_in();
        return Ok(Self {
            control: raw.control.unwrap_or(defaults.control),
            placeholder_map_id: raw.placeholder_map_id.unwrap_or(defaults.placeholder_map_id),
            plugin_css_url: raw.plugin_css_url.unwrap_or(defaults.plugin_css_url),
            plugin_script_url: raw.plugin_script_url.unwrap_or(defaults.plugin_script_url),
            tile_layer_names: raw.tile_layer_names.unwrap_or(defaults.tile_layer_names),
        });
    }
}

impl Default for ControlOptions {
    fn default() -> Self {
        return Self {
            color: true,
            layer_name: true,
            opacity: true,
            position: "topright".to_string(),
            radio_checkbox: true,
            remove: true,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_built_in_settings() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();

        assert_eq!(config.placeholder_map_id, DEFAULT_PLACEHOLDER_MAP_ID);
        assert_eq!(config.tile_layer_names.len(), 4);
        assert_eq!(config.control, ControlOptions::default());
    }

    #[test]
    fn partial_file_overrides_only_named_keys() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE),
            "tile_layer_names = [\"Streets\"]\n\n[control]\nposition = \"bottomleft\"\nremove = false\n",
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.tile_layer_names, vec!["Streets".to_string()]);
        assert_eq!(config.control.position, "bottomleft");
        assert!(!config.control.remove);
        assert!(config.control.opacity, "unset control keys keep their defaults");
        assert_eq!(config.plugin_script_url, DEFAULT_PLUGIN_SCRIPT_URL);
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), "tile_layer_names = 3").unwrap();

        assert!(matches!(Config::load(dir.path()), Err(Error::TomlDe(_))));
    }
}
