//! Host configuration
//!
//! Settings a caller would otherwise pass as props to the form host, read
//! from a TOML file. Every key is optional.
//!
//! ```toml
//! submit_delay_ms = 250
//! allow_edit = false
//! size = "lg"
//! submit_label = "Create"
//! ```

use crate::state::ModalSize;
use formwright_core::{FormError, FormResult};
use formwright_schema::serialization::EXPORT_SUFFIX;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Host settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Delay between an accepted submit and the host closing
    pub submit_delay_ms: u64,

    /// Whether the structure may be edited at all
    pub allow_edit: bool,

    /// Whether the mode toggle is offered
    pub show_edit_button: bool,

    /// Container size hint
    pub size: ModalSize,

    pub submit_label: String,
    pub cancel_label: String,

    /// Appended to the host id to name exported files
    pub export_suffix: String,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            submit_delay_ms: 1000,
            allow_edit: true,
            show_edit_button: true,
            size: ModalSize::default(),
            submit_label: "Save".to_string(),
            cancel_label: "Cancel".to_string(),
            export_suffix: EXPORT_SUFFIX.to_string(),
        }
    }
}

impl HostConfig {
    /// Parse a TOML document
    pub fn from_toml_str(text: &str) -> FormResult<Self> {
        toml::from_str(text).map_err(|e| FormError::InvalidConfig(e.to_string()))
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: impl AsRef<Path>) -> FormResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "No host config found, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(path).map_err(|e| FormError::FileRead {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let config = Self::from_toml_str(&text)?;
        debug!(path = %path.display(), "Loaded host config");
        Ok(config)
    }

    /// Render as TOML
    pub fn to_toml_string(&self) -> FormResult<String> {
        toml::to_string_pretty(self).map_err(|e| FormError::InvalidConfig(e.to_string()))
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    /// Whether the mode toggle is usable
    pub fn can_toggle_mode(&self) -> bool {
        self.allow_edit && self.show_edit_button
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = HostConfig::default();
        assert_eq!(config.submit_delay(), Duration::from_secs(1));
        assert!(config.can_toggle_mode());
        assert_eq!(config.size, ModalSize::Md);
        assert_eq!(config.export_suffix, "_structure.json");
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config = HostConfig::from_toml_str("allow_edit = false\nsize = \"xl\"\n").unwrap();
        assert!(!config.allow_edit);
        assert!(!config.can_toggle_mode());
        assert_eq!(config.size, ModalSize::Xl);
        assert_eq!(config.submit_label, "Save");
    }

    #[test]
    fn test_malformed_toml() {
        let err = HostConfig::from_toml_str("submit_delay_ms = \"soon\"").unwrap_err();
        assert!(matches!(err, FormError::InvalidConfig(_)));
    }

    #[test]
    fn test_load_missing_and_present() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("host.toml");
        assert_eq!(HostConfig::load(&path).unwrap(), HostConfig::default());

        let config = HostConfig {
            submit_delay_ms: 10,
            ..HostConfig::default()
        };
        std::fs::write(&path, config.to_toml_string().unwrap()).unwrap();
        assert_eq!(HostConfig::load(&path).unwrap(), config);
    }
}
