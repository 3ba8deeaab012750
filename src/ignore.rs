use std::{collections::HashSet, path::Path};

use serde::Deserialize;
use tracing::warn;

/// Directory names excluded from crawling wherever they appear in a path.
const DEFAULT_IGNORES: &[&str] =
    &[".git", "node_modules", "target", "Library", "__pycache__"];

/// Set of path-segment names to exclude from crawling. A path is ignored if
/// any of its segments (compared case-insensitively) exactly equals a member.
#[derive(Debug, Clone)]
pub struct IgnoreSet {
    names: HashSet<String>,
}

#[derive(Deserialize)]
struct IgnoreConfig {
    #[serde(default)]
    ignore: Vec<String>,
}

impl Default for IgnoreSet {
    fn default() -> Self {
        Self {
            names: DEFAULT_IGNORES.iter().map(|s| s.to_lowercase()).collect(),
        }
    }
}

impl IgnoreSet {
    /// Build the ignore set, merging names from an optional JSON config
    /// (`{"ignore": ["name", ...]}`) into the defaults. A missing,
    /// unreadable, or malformed config falls back to the defaults alone.
    pub fn load(config_path: Option<&Path>) -> Self {
        let mut set = Self::default();
        let Some(path) = config_path else {
            return set;
        };

        match std::fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|text| {
                serde_json::from_str::<IgnoreConfig>(&text)
                    .map_err(|e| e.to_string())
            }) {
            Ok(config) => {
                set.names
                    .extend(config.ignore.iter().map(|n| n.to_lowercase()));
            }
            Err(e) => {
                warn!("failed to read ignore config {}: {e}", path.display());
            }
        }
        set
    }

    /// True if any segment of `path` matches an ignored name.
    pub fn is_ignored(&self, path: &Path) -> bool {
        path.iter().any(|segment| {
            self.names
                .contains(&segment.to_string_lossy().to_lowercase())
        })
    }

    #[cfg(test)]
    pub fn from_names(names: &[&str]) -> Self {
        Self {
            names: names.iter().map(|s| s.to_lowercase()).collect(),
        }
    }
}
