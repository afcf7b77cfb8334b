use crate::catalog::DEFAULT_DEVICE_NAME;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Persisted configuration from `Pixelspoof Settings.yaml`
///
/// One flat preference block shared between the settings UI (writer) and the
/// engine (reader). Export then import must reproduce an equal value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoofConfig {
    #[serde(rename = "Spoof_Settings", default)]
    pub spoof_settings: SpoofSettings,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpoofSettings {
    /// Catalog key of the device to impersonate
    #[serde(rename = "Device To Spoof", default = "default_device")]
    pub device_to_spoof: String,

    /// Hand-picked capability flags; when present this set is used verbatim
    /// instead of cumulative tier resolution
    #[serde(rename = "Custom Feature Flags", default)]
    pub custom_feature_flags: Option<BTreeSet<String>>,

    /// Only activate inside the target application's process
    #[serde(rename = "Strict Package Match", default = "default_true")]
    pub strict_package_match: bool,

    /// Actively deny known flags the selected profile was not granted
    /// (defeats custom ROMs that natively report high-tier features)
    #[serde(rename = "Override ROM Feature Levels", default = "default_true")]
    pub override_rom_feature_levels: bool,

    /// Emit a log line per intercepted query and field write
    #[serde(rename = "Verbose Logs", default)]
    pub verbose_logs: bool,

    /// Master kill switch; false disables both subsystems entirely
    #[serde(rename = "Module Enabled", default = "default_true")]
    pub module_enabled: bool,

    /// Spoof the Android version the selected device shipped with.
    /// Takes precedence over the manual label whenever true.
    #[serde(rename = "Android Version Follow Device", default = "default_true")]
    pub version_follow_device: bool,

    /// Free-text version label ("8.1.0", "11", ...) used when not following
    /// the device; unparseable labels skip version spoofing
    #[serde(rename = "Android Version Manual", default)]
    pub version_manual_label: Option<String>,
}

impl Default for SpoofSettings {
    fn default() -> Self {
        Self {
            device_to_spoof: default_device(),
            custom_feature_flags: None,
            strict_package_match: true,
            override_rom_feature_levels: true,
            verbose_logs: false,
            module_enabled: true,
            version_follow_device: true,
            version_manual_label: None,
        }
    }
}

impl Default for SpoofConfig {
    fn default() -> Self {
        Self {
            spoof_settings: SpoofSettings::default(),
        }
    }
}

fn default_device() -> String {
    DEFAULT_DEVICE_NAME.to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_defaults() {
        let settings = SpoofSettings::default();
        assert_eq!(settings.device_to_spoof, "Pixel 5");
        assert!(settings.custom_feature_flags.is_none());
        assert!(settings.strict_package_match);
        assert!(settings.override_rom_feature_levels);
        assert!(!settings.verbose_logs);
        assert!(settings.module_enabled);
        assert!(settings.version_follow_device);
        assert!(settings.version_manual_label.is_none());
    }

    #[test]
    fn test_partial_yaml_fills_defaults() {
        let yaml = "Spoof_Settings:\n  Device To Spoof: Pixel 2\n";
        let config: SpoofConfig = serde_yaml_ng::from_str(yaml).unwrap();
        assert_eq!(config.spoof_settings.device_to_spoof, "Pixel 2");
        assert!(config.spoof_settings.module_enabled);
        assert!(config.spoof_settings.strict_package_match);
    }

    #[test]
    fn test_empty_mapping_is_all_defaults() {
        let config: SpoofConfig = serde_yaml_ng::from_str("Spoof_Settings: {}\n").unwrap();
        assert_eq!(config, SpoofConfig::default());
    }

    #[test]
    fn test_custom_flags_roundtrip_in_yaml() {
        let mut config = SpoofConfig::default();
        config.spoof_settings.custom_feature_flags = Some(
            ["flag.b", "flag.a"]
                .into_iter()
                .map(String::from)
                .collect(),
        );

        let yaml = serde_yaml_ng::to_string(&config).unwrap();
        let parsed: SpoofConfig = serde_yaml_ng::from_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
