//! Persisted accessibility preference (base font size).
//!
//! Stored as JSON under a single namespaced key. Reads fail open: a missing
//! file, unparseable JSON or an out-of-shape value all yield the defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Namespaced key the preference object lives under.
pub const PREFS_KEY: &str = "acc_prefs";

pub const DEFAULT_FONT_SIZE_PX: u8 = 16;
pub const MIN_FONT_SIZE_PX: u8 = 12;
pub const MAX_FONT_SIZE_PX: u8 = 22;

#[derive(Debug, thiserror::Error)]
pub enum PreferenceError {
    #[error("failed to write preferences to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize preferences: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FontPreference {
    #[serde(rename = "fontSizePx")]
    font_size_px: u8,
}

impl Default for FontPreference {
    fn default() -> Self {
        Self {
            font_size_px: DEFAULT_FONT_SIZE_PX,
        }
    }
}

impl FontPreference {
    /// Builds a preference, clamping into the supported range.
    #[must_use]
    pub fn new(font_size_px: i64) -> Self {
        let clamped = font_size_px.clamp(i64::from(MIN_FONT_SIZE_PX), i64::from(MAX_FONT_SIZE_PX));
        // The clamp above keeps the value inside u8 range.
        Self {
            font_size_px: u8::try_from(clamped).unwrap_or(DEFAULT_FONT_SIZE_PX),
        }
    }

    #[must_use]
    pub fn font_size_px(self) -> u8 {
        self.font_size_px
    }

    #[must_use]
    pub fn increase(self) -> Self {
        Self::new(i64::from(self.font_size_px) + 1)
    }

    #[must_use]
    pub fn decrease(self) -> Self {
        Self::new(i64::from(self.font_size_px) - 1)
    }

    /// Text announced to assistive technology after a change.
    #[must_use]
    pub fn announcement(self) -> String {
        format!("Font size: {} pixels", self.font_size_px)
    }
}

/// File-backed store for [`FontPreference`].
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the stored preference, falling back to defaults on any problem.
    #[must_use]
    pub fn load(&self) -> FontPreference {
        let Some(root) = self.read_root() else {
            return FontPreference::default();
        };

        match root.get(PREFS_KEY).and_then(|prefs| prefs.get("fontSizePx")) {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| {
                    // Fractional sizes are truncated like an integer pixel count.
                    #[allow(clippy::cast_possible_truncation)]
                    n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)
                })
                .map_or_else(FontPreference::default, FontPreference::new),
            Some(other) => {
                tracing::debug!(value = %other, "ignoring malformed font size preference");
                FontPreference::default()
            }
            None => FontPreference::default(),
        }
    }

    /// Persists the preference, keeping any unrelated keys already in the file.
    ///
    /// # Errors
    ///
    /// Returns [`PreferenceError::Io`] if the file or its parent directory
    /// cannot be written.
    pub fn save(&self, pref: FontPreference) -> Result<(), PreferenceError> {
        let mut root = self.read_root().unwrap_or_default();
        root.insert(PREFS_KEY.to_string(), serde_json::to_value(pref)?);
        let body = serde_json::to_string_pretty(&Value::Object(root))?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| PreferenceError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        std::fs::write(&self.path, body).map_err(|source| PreferenceError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn read_root(&self) -> Option<Map<String, Value>> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Some(map),
            Ok(_) | Err(_) => {
                tracing::debug!(path = %self.path.display(), "preference file is malformed; using defaults");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir()
            .join(format!("dermloc-prefs-{}-{name}", std::process::id()))
            .join("prefs.json")
    }

    #[test]
    fn new_clamps_into_range() {
        assert_eq!(FontPreference::new(4).font_size_px(), 12);
        assert_eq!(FontPreference::new(99).font_size_px(), 22);
        assert_eq!(FontPreference::new(18).font_size_px(), 18);
    }

    #[test]
    fn increase_and_decrease_stop_at_bounds() {
        let max = FontPreference::new(22);
        assert_eq!(max.increase(), max);
        let min = FontPreference::new(12);
        assert_eq!(min.decrease(), min);
        assert_eq!(FontPreference::default().increase().font_size_px(), 17);
    }

    #[test]
    fn load_missing_file_yields_default() {
        let store = PreferenceStore::new(scratch_path("missing"));
        assert_eq!(store.load(), FontPreference::default());
    }

    #[test]
    fn load_malformed_file_yields_default() {
        let path = scratch_path("malformed");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "{not json").unwrap();
        let store = PreferenceStore::new(&path);
        assert_eq!(store.load(), FontPreference::default());

        std::fs::write(&path, r#"{"acc_prefs": {"fontSizePx": "big"}}"#).unwrap();
        assert_eq!(store.load(), FontPreference::default());
    }

    #[test]
    fn load_clamps_out_of_range_stored_value() {
        let path = scratch_path("clamp");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"acc_prefs": {"fontSizePx": 40}}"#).unwrap();
        assert_eq!(PreferenceStore::new(&path).load().font_size_px(), 22);
    }

    #[test]
    fn save_then_load_keeps_other_keys() {
        let path = scratch_path("save");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"theme": "dark"}"#).unwrap();

        let store = PreferenceStore::new(&path);
        store.save(FontPreference::new(19)).unwrap();
        assert_eq!(store.load().font_size_px(), 19);

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["theme"], "dark");
        assert_eq!(raw[PREFS_KEY]["fontSizePx"], 19);
    }

    #[test]
    fn announcement_mentions_pixels() {
        assert_eq!(FontPreference::new(14).announcement(), "Font size: 14 pixels");
    }
}
