//! Configuration management
//!
//! Settings live in `settings.json` under the data directory:
//! ```json
//! {
//!   "app": {
//!     "persistLedgers": false,
//!     "transferDelays": { "sameBankMs": [1000, 10000],
//!                         "crossBankMs": [11000, 20000] }
//!   }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::services::transfer::DelayProfile;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default)]
    persist_ledgers: bool,
    #[serde(default)]
    transfer_delays: Option<DelayProfile>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

/// Engine configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    /// Carry per-account ledgers in the snapshot file. Off by default:
    /// ledgers rebuild empty on load.
    pub persist_ledgers: bool,
    pub transfer_delays: DelayProfile,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            persist_ledgers: false,
            transfer_delays: DelayProfile::default(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the data directory.
    ///
    /// `MONETA_FAST_TRANSFERS` (for CI/testing) zeroes the transfer
    /// delay profile regardless of the settings file.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let settings_path = data_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let transfer_delays = resolve_transfer_delays(
            std::env::var("MONETA_FAST_TRANSFERS").ok().as_deref(),
            raw.app.transfer_delays.clone(),
        );

        Ok(Self {
            persist_ledgers: raw.app.persist_ledgers,
            transfer_delays,
            _raw_settings: raw,
        })
    }

    /// Save config to the data directory.
    /// Preserves settings fields the engine doesn't manage.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let settings_path = data_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.app.persist_ledgers = self.persist_ledgers;
        settings.app.transfer_delays = Some(self.transfer_delays.clone());

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }
}

/// The `MONETA_FAST_TRANSFERS` override wins over the settings file;
/// anything but an affirmative value falls back to the configured (or
/// default) profile. Takes the env value as a parameter so tests never
/// have to mutate process environment.
fn resolve_transfer_delays(
    fast_transfers: Option<&str>,
    configured: Option<DelayProfile>,
) -> DelayProfile {
    match fast_transfers {
        Some("true" | "1" | "yes" | "TRUE" | "YES") => DelayProfile::none(),
        _ => configured.unwrap_or_default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn missing_settings_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(!config.persist_ledgers);
        assert_eq!(config.transfer_delays, DelayProfile::default());
    }

    #[test]
    fn corrupt_settings_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("settings.json"), "{ nope").unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert!(!config.persist_ledgers);
    }

    #[test]
    fn settings_round_trip_preserves_unmanaged_fields() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{ "app": { "persistLedgers": true, "theme": "dark" } }"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert!(config.persist_ledgers);

        config.save(dir.path()).unwrap();
        let content = std::fs::read_to_string(dir.path().join("settings.json")).unwrap();
        assert!(content.contains("\"theme\""));
        assert!(content.contains("persistLedgers"));
    }

    #[test]
    fn fast_transfers_override_zeroes_the_delays() {
        assert_eq!(
            resolve_transfer_delays(Some("1"), None),
            DelayProfile::none()
        );
        assert_eq!(
            resolve_transfer_delays(Some("true"), Some(DelayProfile::default())),
            DelayProfile::none()
        );
        assert_eq!(
            resolve_transfer_delays(Some("YES"), Some(DelayProfile::default())),
            DelayProfile::none()
        );
        // non-affirmative values leave the configured profile alone
        let custom = DelayProfile {
            same_bank_ms: (5, 10),
            cross_bank_ms: (20, 30),
        };
        assert_eq!(
            resolve_transfer_delays(Some("no"), Some(custom.clone())),
            custom
        );
        assert_eq!(resolve_transfer_delays(None, None), DelayProfile::default());
    }

    #[test]
    fn delay_profile_parses_from_settings() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("settings.json"),
            r#"{ "app": { "transferDelays": { "sameBankMs": [5, 10], "crossBankMs": [20, 30] } } }"#,
        )
        .unwrap();

        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.transfer_delays.same_bank_ms, (5, 10));
        assert_eq!(config.transfer_delays.cross_bank_ms, (20, 30));
    }
}
