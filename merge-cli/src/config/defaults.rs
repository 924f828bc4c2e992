//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, &'static str);

const DEFS: &[DefTuple] = &[
    ("MERGE_LAYOUT", "four-grid", "Layout used when --layout is not given"),
    ("MERGE_WIDTH", "400", "Canvas width in pixels"),
    ("MERGE_HEIGHT", "400", "Canvas height in pixels"),
    ("MERGE_OUTPUT_DIR", ".", "Directory merged images are written to"),
    ("MERGE_FETCH_TIMEOUT_SECS", "30", "Per-image fetch timeout in seconds"),
    (
        "MERGE_RENDER_FALLBACK",
        "false",
        "Draw unscaled sources instead of failing when rendering fails",
    ),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});

/// Get the default value for a setting key, or `None` if not defined.
pub fn get_default(key: &str) -> Option<&'static str> {
    DEFAULT_SETTINGS.get(key).map(|d| d.default)
}
