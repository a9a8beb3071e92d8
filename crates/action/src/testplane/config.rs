//! Typed view over `testplane config` output

use std::collections::HashMap;

use serde::Deserialize;

use crate::constants::{plugin, LOCAL_GRID_URL};
use crate::error::{ActionError, ActionResult};

const DEFAULT_LAST_FAILED_OUTPUT: &str = ".testplane/failed.json";

/// Snapshot of the resolved Testplane config. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedConfig {
    #[serde(default)]
    pub grid_url: String,

    #[serde(default)]
    pub last_failed: LastFailed,

    /// `null` entries mean the plugin is switched off
    #[serde(default)]
    pub plugins: HashMap<String, Option<PluginConfig>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LastFailed {
    /// Relative to the Testplane working directory
    pub output: String,
}

impl Default for LastFailed {
    fn default() -> Self {
        Self {
            output: DEFAULT_LAST_FAILED_OUTPUT.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PluginConfig {
    #[serde(default)]
    pub enabled: Option<bool>,
}

impl ResolvedConfig {
    pub fn from_json(output: &str) -> ActionResult<Self> {
        serde_json::from_str(output).map_err(|source| ActionError::InvalidConfig {
            output: output.to_string(),
            source,
        })
    }

    pub fn is_using_local_browsers(&self) -> bool {
        self.grid_url == LOCAL_GRID_URL
    }

    pub fn has_html_reporter_plugin(&self) -> bool {
        self.has_enabled_plugin(plugin::HTML_REPORTER, true)
    }

    pub fn last_failed_tests_json_path(&self) -> &str {
        &self.last_failed.output
    }

    fn has_enabled_plugin(&self, name: &str, enabled_by_default: bool) -> bool {
        match self.plugins.get(name) {
            Some(Some(plugin)) => plugin.enabled.unwrap_or(enabled_by_default),
            _ => false,
        }
    }
}
