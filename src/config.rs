//! Injection configuration
//!
//! Every literal the injector relies on (script names, source directories, the anchor
//! line and the line inserted after it) lives in [`InjectConfig`]. The defaults match
//! the current Balatro release; a YAML file can override any subset of fields for
//! other host-script versions:
//!
//! ```yaml
//! anchor: "    self.SPEEDFACTOR = 1"
//! insertion: "    initSteamodded()"
//! source_dirs: [core, debug, loader]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{InjectorError, Result};

/// Configuration passed into the merge, patch and round-trip procedures
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct InjectConfig {
    /// Primary script inside the archive; source directories are appended to it
    pub main_script: String,

    /// Secondary script inside the archive; receives the insertion line
    pub game_script: String,

    /// Source directory names, merged in this order
    pub source_dirs: Vec<String>,

    /// Fragment emitted first within each source directory
    pub core_fragment: String,

    /// Extension (without the dot) of files treated as fragments
    pub fragment_extension: String,

    /// Text searched for in the secondary script, first match wins
    pub anchor: String,

    /// Line inserted directly after the anchor line
    pub insertion: String,
}

impl Default for InjectConfig {
    fn default() -> Self {
        Self {
            main_script: "main.lua".to_string(),
            game_script: "game.lua".to_string(),
            source_dirs: vec![
                "core".to_string(),
                "debug".to_string(),
                "loader".to_string(),
            ],
            core_fragment: "core.lua".to_string(),
            fragment_extension: "lua".to_string(),
            anchor: "    self.SPEEDFACTOR = 1".to_string(),
            insertion: "    initSteamodded()".to_string(),
        }
    }
}

impl InjectConfig {
    /// Parse configuration from a YAML string, filling missing fields with defaults
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let yaml = fs::read_to_string(path).map_err(|e| InjectorError::ConfigReadFailed {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config = Self::from_yaml(&yaml).map_err(|e| match e {
            InjectorError::ConfigParseFailed { reason, .. } => InjectorError::ConfigParseFailed {
                path: path.display().to_string(),
                reason,
            },
            other => other,
        })?;

        tracing::debug!(path = %path.display(), "loaded injection config");
        Ok(config)
    }

    /// Reject configurations that would make the injector silently do nothing useful
    pub fn validate(&self) -> Result<()> {
        let required = [
            ("main_script", &self.main_script),
            ("game_script", &self.game_script),
            ("anchor", &self.anchor),
            ("insertion", &self.insertion),
            ("fragment_extension", &self.fragment_extension),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(invalid(format!("'{field}' must not be empty")));
            }
        }

        if self.main_script == self.game_script {
            return Err(invalid(format!(
                "'main_script' and 'game_script' are both '{}'",
                self.main_script
            )));
        }

        for script in [&self.main_script, &self.game_script] {
            if script.contains(['/', '\\']) {
                return Err(invalid(format!(
                    "'{script}' must name a file at the archive root"
                )));
            }
        }

        if self.anchor.contains('\n') || self.insertion.contains('\n') {
            return Err(invalid(
                "'anchor' and 'insertion' must be single lines".to_string(),
            ));
        }

        if self.fragment_extension.starts_with('.') {
            return Err(invalid(format!(
                "'fragment_extension' should not start with a dot: '{}'",
                self.fragment_extension
            )));
        }

        Ok(())
    }
}

fn invalid(message: String) -> InjectorError {
    InjectorError::ConfigInvalid { message }
}
