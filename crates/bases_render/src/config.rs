use std::path::PathBuf;

use bases_core::MarkerStyle;
use serde::{Deserialize, Serialize};

pub const ENV_VAULT_ROOT: &str = "BASES_VAULT_ROOT";
pub const ENV_INCLUDE_SCRIPT: &str = "BASES_INCLUDE_SCRIPT";

/// Settings for a render session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderConfig {
    /// Directory the corpus is loaded from and definitions are looked up in first.
    pub vault_root: PathBuf,
    /// Marker style for list views that do not declare one.
    pub default_list_marker: MarkerStyle,
    /// Append the tab controller script after rendered fragments.
    pub include_script: bool,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            vault_root: PathBuf::from("."),
            default_list_marker: MarkerStyle::Bulleted,
            include_script: false,
        }
    }
}

impl RenderConfig {
    /// Create a configuration from CLI flags and the process environment
    pub fn from_cli_and_env(
        vault_root: Option<PathBuf>,
        default_list_marker: Option<MarkerStyle>,
        include_script: Option<bool>,
    ) -> Self {
        Self::from_cli_and_lookup(vault_root, default_list_marker, include_script, |key| {
            std::env::var(key).ok()
        })
    }

    /// Same as [`RenderConfig::from_cli_and_env`] with an explicit variable lookup.
    pub fn from_cli_and_lookup(
        vault_root: Option<PathBuf>,
        default_list_marker: Option<MarkerStyle>,
        include_script: Option<bool>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let mut config = Self::default();

        // Environment first, so flags win
        if let Some(root) = lookup(ENV_VAULT_ROOT).filter(|v| !v.trim().is_empty()) {
            config.vault_root = PathBuf::from(root);
        }
        if let Some(raw) = lookup(ENV_INCLUDE_SCRIPT) {
            match parse_flag(&raw) {
                Some(flag) => config.include_script = flag,
                None => log::warn!("ignoring {}={:?}: expected a boolean", ENV_INCLUDE_SCRIPT, raw),
            }
        }

        if let Some(root) = vault_root {
            config.vault_root = root;
        }
        if let Some(marker) = default_list_marker {
            config.default_list_marker = marker;
        }
        if let Some(flag) = include_script {
            config.include_script = flag;
        }

        config
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}
