//! Bridge settings

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tivo_protocol::Channel;
use tivo_proxy::{load_snapshot, ProxyConfig, SnapshotError};
use tracing::{info, warn};

/// Errors loading the settings file or the lineup it names
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("failed to read settings {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed settings {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to load device lineup: {0}")]
    Lineup(#[from] SnapshotError),
}

/// Simulated device settings
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeviceSettings {
    /// JSON channel list reported by the device (built-in demo lineup if unset)
    #[serde(default)]
    pub lineup_file: Option<PathBuf>,
}

/// Application settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    /// Name the object server registers under
    #[serde(default = "default_server_name")]
    pub server_name: String,
    /// Served object configuration
    #[serde(default)]
    pub proxy: ProxyConfig,
    /// Device configuration
    #[serde(default)]
    pub device: DeviceSettings,
}

fn default_server_name() -> String {
    "PNObjectServer".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_name: default_server_name(),
            proxy: ProxyConfig::default(),
            device: DeviceSettings::default(),
        }
    }
}

impl Settings {
    /// $XDG_CONFIG_HOME/tivo-bridge, falling back to ~/.config/tivo-bridge
    fn config_dir() -> Option<PathBuf> {
        if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
            let path = PathBuf::from(xdg_config);
            if path.is_absolute() {
                return Some(path.join("tivo-bridge"));
            }
        }

        dirs::home_dir().map(|h| h.join(".config").join("tivo-bridge"))
    }

    /// Default settings file path
    pub fn settings_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("settings.json"))
    }

    /// Load settings
    ///
    /// An explicit path must exist and parse. Without one, the default path
    /// is tried and anything wrong with it falls back to defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, SettingsError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let Some(path) = Self::settings_path().filter(|p| p.exists()) else {
            info!("No settings file; using defaults");
            return Ok(Self::default());
        };
        match Self::from_file(&path) {
            Ok(settings) => Ok(settings),
            Err(e) => {
                warn!("{}; using defaults", e);
                Ok(Self::default())
            }
        }
    }

    /// Read settings from `path`
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let data = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let settings = serde_json::from_str(&data).map_err(|source| SettingsError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Channel lineup for the simulated device
    pub fn lineup(&self) -> Result<Vec<Channel>, SettingsError> {
        match &self.device.lineup_file {
            Some(path) => Ok(load_snapshot(path)?),
            None => Ok(tivo_sim::demo_lineup()),
        }
    }
}

#[cfg(test)]
mod tests {
    use tivo_proxy::Scorer;

    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, "{}").unwrap();

        let settings = Settings::from_file(&path).unwrap();
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.server_name, "PNObjectServer");
        assert!(settings.proxy.hd_only);
    }

    #[test]
    fn test_nested_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(
            &path,
            r#"{
                "server_name": "LivingRoom",
                "proxy": {"hd_only": false, "scorer": "token_set"},
                "device": {"lineup_file": "/srv/lineup.json"}
            }"#,
        )
        .unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.server_name, "LivingRoom");
        assert_eq!(settings.proxy.scorer, Scorer::TokenSet);
        assert!(!settings.proxy.hd_only);
        assert_eq!(
            settings.device.lineup_file,
            Some(PathBuf::from("/srv/lineup.json"))
        );
    }

    #[test]
    fn test_explicit_path_errors() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            Settings::load(Some(&missing)),
            Err(SettingsError::Io { .. })
        ));

        let bad = dir.path().join("bad.json");
        std::fs::write(&bad, "server_name = 1").unwrap();
        assert!(matches!(
            Settings::load(Some(&bad)),
            Err(SettingsError::Malformed { .. })
        ));
    }

    #[test]
    fn test_lineup_from_file_or_demo() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lineup.json");
        std::fs::write(
            &path,
            r#"[{"name": "KQED", "channelNumber": 9, "channelId": 9, "isHdtv": true}]"#,
        )
        .unwrap();

        let mut settings = Settings::default();
        assert_eq!(settings.lineup().unwrap(), tivo_sim::demo_lineup());

        settings.device.lineup_file = Some(path);
        let lineup = settings.lineup().unwrap();
        assert_eq!(lineup.len(), 1);
        assert_eq!(lineup[0].channel_number, "9");
        assert_eq!(lineup[0].affiliate, "");
    }
}
