//! Configuration types for homebrew-dl
//!
//! User-facing settings are persisted as a single JSON document, loaded at
//! bootstrap and written back on shutdown (and whenever the frontend decides
//! to checkpoint). Every field has a serde default so old config files keep
//! loading as fields are added.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Destination directories for installed content
///
/// Each path is relative to the application root unless the user picked an
/// absolute one. Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Where executable applications are installed (default: "apps")
    #[serde(default = "default_app_dir")]
    pub app_dir: PathBuf,

    /// Where ROM files are installed (default: "roms")
    #[serde(default = "default_rom_dir")]
    pub rom_dir: PathBuf,

    /// Where downloaded archives are kept (default: "archives")
    #[serde(default = "default_archive_dir")]
    pub archive_dir: PathBuf,

    /// Where launcher shortcuts are written (default: "shortcuts")
    #[serde(default = "default_shortcut_dir")]
    pub shortcut_dir: PathBuf,

    /// Where firmware payloads are installed (default: "firmware")
    #[serde(default = "default_firmware_dir")]
    pub firmware_dir: PathBuf,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            app_dir: default_app_dir(),
            rom_dir: default_rom_dir(),
            archive_dir: default_archive_dir(),
            shortcut_dir: default_shortcut_dir(),
            firmware_dir: default_firmware_dir(),
        }
    }
}

/// Boot-time automation toggles
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BootConfig {
    /// Refresh the active catalog store on boot (default: true)
    #[serde(default = "default_true")]
    pub auto_update_store: bool,

    /// Check for application updates on boot (default: true)
    #[serde(default = "default_true")]
    pub update_check: bool,
}

impl Default for BootConfig {
    fn default() -> Self {
        Self {
            auto_update_store: true,
            update_check: true,
        }
    }
}

/// Frontend appearance toggles
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GuiConfig {
    /// Draw the store's background image if the sprite sheet has one (default: true)
    #[serde(default = "default_true")]
    pub use_background: bool,

    /// Use the downloadable custom font instead of the system font (default: false)
    #[serde(default)]
    pub custom_font: bool,
}

impl Default for GuiConfig {
    fn default() -> Self {
        Self {
            use_background: true,
            custom_font: false,
        }
    }
}

/// HTTP fetch behavior
///
/// Certificate verification is ON by default; `danger_accept_invalid_certs`
/// exists for development against self-signed hosts and is deliberately
/// named after the footgun it is.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User-agent header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Maximum redirect hops to follow (default: 50)
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// Per-request timeout (default: 30 seconds)
    #[serde(default = "default_timeout", with = "duration_serde")]
    pub timeout: Duration,

    /// Accept invalid TLS certificates (default: false)
    #[serde(default)]
    pub danger_accept_invalid_certs: bool,

    /// Check free space against Content-Length before persisting (default: true)
    #[serde(default = "default_true")]
    pub check_free_space: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
            timeout: default_timeout(),
            danger_accept_invalid_certs: false,
            check_free_space: true,
        }
    }
}

/// Main configuration for a homebrew-dl application
///
/// Sub-configs are flattened for serialization, so the on-disk JSON stays a
/// single flat-ish document a user can hand-edit; `fetch` is nested because
/// its fields are tuning knobs rather than day-to-day settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Active language code (default: "en")
    #[serde(default = "default_language")]
    pub language: String,

    /// File name of the catalog store opened at boot (default: "universal-db.unistore")
    #[serde(default = "default_store_file")]
    pub default_store: String,

    /// Index of the active theme (default: 0)
    #[serde(default)]
    pub theme: usize,

    /// Destination directories for installed content
    #[serde(flatten)]
    pub directories: DirectoryConfig,

    /// Boot-time automation toggles
    #[serde(flatten)]
    pub boot: BootConfig,

    /// Frontend appearance toggles
    #[serde(flatten)]
    pub gui: GuiConfig,

    /// HTTP fetch behavior
    #[serde(default)]
    pub fetch: FetchConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            language: default_language(),
            default_store: default_store_file(),
            theme: 0,
            directories: DirectoryConfig::default(),
            boot: BootConfig::default(),
            gui: GuiConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// A missing file yields the defaults (first boot); any other I/O error
    /// or a malformed document is surfaced.
    pub async fn load(path: &Path) -> Result<Self> {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                let config = serde_json::from_slice(&bytes)?;
                tracing::debug!(path = %path.display(), "loaded config");
                Ok(config)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write configuration to a JSON file, overwriting any existing one
    pub async fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_vec_pretty(self)?;
        tokio::fs::write(path, json).await?;
        tracing::debug!(path = %path.display(), "saved config");
        Ok(())
    }
}

// Default value functions
fn default_language() -> String {
    "en".to_string()
}

fn default_store_file() -> String {
    "universal-db.unistore".to_string()
}

fn default_app_dir() -> PathBuf {
    PathBuf::from("apps")
}

fn default_rom_dir() -> PathBuf {
    PathBuf::from("roms")
}

fn default_archive_dir() -> PathBuf {
    PathBuf::from("archives")
}

fn default_shortcut_dir() -> PathBuf {
    PathBuf::from("shortcuts")
}

fn default_firmware_dir() -> PathBuf {
    PathBuf::from("firmware")
}

fn default_true() -> bool {
    true
}

fn default_user_agent() -> String {
    concat!("homebrew-dl-v", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_redirects() -> usize {
    50
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

// Duration serialization helper
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn defaults_match_first_boot_expectations() {
        let config = Config::default();

        assert_eq!(config.language, "en");
        assert_eq!(config.default_store, "universal-db.unistore");
        assert_eq!(config.theme, 0);
        assert!(config.boot.auto_update_store);
        assert!(config.boot.update_check);
        assert!(config.gui.use_background);
        assert!(!config.gui.custom_font);
        assert_eq!(config.directories.app_dir, PathBuf::from("apps"));
        assert_eq!(config.directories.firmware_dir, PathBuf::from("firmware"));
    }

    #[test]
    fn fetch_defaults_are_safe() {
        let fetch = FetchConfig::default();

        assert!(
            !fetch.danger_accept_invalid_certs,
            "certificate verification must be on by default"
        );
        assert_eq!(fetch.max_redirects, 50);
        assert_eq!(fetch.timeout, Duration::from_secs(30));
        assert!(fetch.user_agent.starts_with("homebrew-dl-v"));
    }

    #[test]
    fn config_default_survives_json_round_trip() {
        let original = Config::default();

        let json = serde_json::to_string(&original).expect("Config must serialize to JSON");
        let restored: Config =
            serde_json::from_str(&json).expect("Config must deserialize from its own JSON");

        assert_eq!(restored.language, original.language);
        assert_eq!(restored.default_store, original.default_store);
        assert_eq!(restored.theme, original.theme);
        assert_eq!(restored.directories.rom_dir, original.directories.rom_dir);
        assert_eq!(
            restored.boot.auto_update_store,
            original.boot.auto_update_store
        );
        assert_eq!(restored.gui.custom_font, original.gui.custom_font);
        assert_eq!(restored.fetch.max_redirects, original.fetch.max_redirects);
        assert_eq!(restored.fetch.timeout, original.fetch.timeout);
    }

    #[test]
    fn flattened_fields_appear_at_top_level_in_json() {
        let json = serde_json::to_value(Config::default()).unwrap();

        // Hand-editable flat layout: toggles and directories sit at the root.
        assert!(json.get("auto_update_store").is_some());
        assert!(json.get("use_background").is_some());
        assert!(json.get("app_dir").is_some());
        // Tuning knobs stay nested.
        assert!(json.get("fetch").is_some());
        assert!(json["fetch"].get("max_redirects").is_some());
    }

    #[test]
    fn empty_document_deserializes_to_defaults() {
        let config: Config = serde_json::from_str("{}").expect("all fields must default");
        assert_eq!(config.language, "en");
        assert!(config.boot.update_check);
        assert!(!config.fetch.danger_accept_invalid_certs);
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"language": "de", "custom_font": true}"#).unwrap();
        assert_eq!(config.language, "de");
        assert!(config.gui.custom_font);
        assert!(config.gui.use_background, "untouched fields keep defaults");
    }

    #[test]
    fn timeout_serializes_as_integer_seconds() {
        let json = serde_json::to_value(Config::default()).unwrap();
        assert_eq!(json["fetch"]["timeout"], 30);
    }

    #[tokio::test]
    async fn load_missing_file_returns_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(&dir.path().join("config.json")).await.unwrap();
        assert_eq!(config.language, "en");
    }

    #[tokio::test]
    async fn save_then_load_round_trips_mutations() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");

        let mut config = Config::default();
        config.language = "pl".to_string();
        config.theme = 2;
        config.boot.auto_update_store = false;
        config.directories.rom_dir = PathBuf::from("/mnt/sd/roms");
        config.save(&path).await.unwrap();

        let restored = Config::load(&path).await.unwrap();
        assert_eq!(restored.language, "pl");
        assert_eq!(restored.theme, 2);
        assert!(!restored.boot.auto_update_store);
        assert_eq!(restored.directories.rom_dir, PathBuf::from("/mnt/sd/roms"));
    }

    #[tokio::test]
    async fn load_rejects_malformed_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        tokio::fs::write(&path, b"{broken").await.unwrap();

        let err = Config::load(&path).await.unwrap_err();
        assert!(matches!(err, crate::error::Error::Serialization(_)));
    }
}
