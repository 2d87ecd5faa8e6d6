//! Corrections applied by `fixup` to a document `modify` already rewrote.

use std::collections::HashMap;

use regex::{Captures, Regex};

use crate::error::Error;
use crate::extract;

/// The real map variable: `var map_<hex> = L.map`.
const MAP_DECLARATION: &str = r"var (map_[a-f0-9]+) = L\.map";

/// Opening of a tile layer's options object, after its URL argument.
const TILE_OPTIONS_OPEN: &str = r#"var (tile_layer_[a-f0-9]+) = L\.tileLayer\(\s*"[^"]+",\s*\{"#;

/// A tile layer attaching itself to the map.
const TILE_ATTACH: &str = r"tile_layer_[a-f0-9]+\.addTo\(map_[a-f0-9]+\);";

/// The appearance control's constructor call and the map it is attached to.
const APPEARANCE_ATTACH: &str =
    r"(?s)(var appearanceControl = L\.control\.appearance\(.*?\))\.addTo\((map_[a-f0-9]+)\);";

/// Trailer appended to each disabled tile attach call.
const DISABLED_ATTACH_NOTE: &str = "// Commented out - managed by appearance control";

/// Outcome of pointing the appearance control at the real map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttachFix {
    /// The control was already attached to the real map.
    AlreadyCorrect,
    /// No appearance control was found.
    Missing,
    /// The control was moved off `from`.
    Retargeted {
        /// Map variable the control was attached to before.
        from: String,
    },
}

/// Comment out every tile-layer `.addTo(map)` call after the first, so only
/// one base layer is visible when the page loads. Returns how many calls were
/// disabled. Disabled calls still match, so a second run wraps them again.
///
/// # Errors
///
/// Returns `Error::Pattern` if the attach pattern fails to compile.
pub fn disable_extra_tile_attachments(content: &mut String) -> Result<usize, Error> {
    let pattern = Regex::new(TILE_ATTACH)?;
    let calls: Vec<(std::ops::Range<usize>, String)> = pattern
        .find_iter(content)
        .map(|m| return (m.range(), m.as_str().to_string()))
        .collect();

    if calls.len() <= 1 {
        return Ok(0);
    }

    // Back to front so earlier ranges stay valid.
    let extra = calls.iter().skip(1).rev();
    let mut disabled = 0_usize;
    for (range, call) in extra {
        content.replace_range(range.clone(), &format!("// {call} {DISABLED_ATTACH_NOTE}"));
        disabled = disabled.saturating_add(1);
    }
    return Ok(disabled);
}

/// Find the variable the document's `L.map(...)` is assigned to.
///
/// # Errors
///
/// Returns `Error::Pattern` if the map pattern fails to compile.
pub fn map_id(content: &str) -> Result<Option<String>, Error> {
    return Ok(extract::declared_ids(content, MAP_DECLARATION)?.into_iter().next());
}

/// Give tile layers a `"name"` option by position: the first declared tile
/// layer gets `labels[0]`, and so on. Layers past the end of `labels` stay
/// unnamed. Existing names are not checked, so a second pass adds another.
/// Returns `(layer, label)` for each layer named, in declaration order.
///
/// # Errors
///
/// Returns `Error::Pattern` if a tile pattern fails to compile.
pub fn name_tile_layers(content: &mut String, labels: &[String]) -> Result<Vec<(String, String)>, Error> {
    let tile_layers = extract::declared_ids(content, extract::TILE_DECLARATION)?;
    let named: Vec<(String, String)> = tile_layers
        .into_iter()
        .zip(labels.iter().cloned())
        .collect();
    let pattern = Regex::new(TILE_OPTIONS_OPEN)?;
    let updated = {
        let by_id: HashMap<&str, &str> =
            named.iter().map(|(id, label)| return (id.as_str(), label.as_str())).collect();
        pattern
            .replace_all(content, |caps: &Captures<'_>| {
                let whole = caps.get(0).map_or("", |m| return m.as_str());
                return match caps.get(1).and_then(|id| return by_id.get(id.as_str())) {
                    None => whole.to_string(),
                    Some(label) => format!("{whole}\n  \"name\": \"{label}\","),
                };
            })
            .into_owned()
    };
    *content = updated;

    return Ok(named);
}

/// Attach the appearance control to `map_id` unless it already is.
///
/// # Errors
///
/// Returns `Error::Pattern` if the control pattern fails to compile.
pub fn retarget_appearance_control(content: &mut String, map_id: &str) -> Result<AttachFix, Error> {
    let pattern = Regex::new(APPEARANCE_ATTACH)?;
    let Some(current) = pattern
        .captures(content)
        .and_then(|c| return c.get(2))
        .map(|m| return m.as_str().to_string())
    else {
        return Ok(AttachFix::Missing);
    };

    if current == map_id {
        return Ok(AttachFix::AlreadyCorrect);
    }

    let updated = pattern.replace_all(content, |caps: &Captures<'_>| {
        let call = caps.get(1).map_or("", |m| return m.as_str());
        return format!("{call}.addTo({map_id});");
    });
    *content = updated.into_owned();

    return Ok(AttachFix::Retargeted { from: current });
}
