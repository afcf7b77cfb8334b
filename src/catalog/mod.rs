//! Static reference data for device spoofing.
//!
//! This module holds the immutable catalog the rest of the engine resolves
//! against:
//! - [`DeviceProfile`]: identity fields (BRAND, MODEL, FINGERPRINT, ...) for
//!   every spoofable Pixel device, plus the sentinel "None" profile
//! - [`FeatureLevelTier`]: chronologically ordered groups of capability flags
//!   (a device grants its own tier's flags and every earlier tier's)
//! - [`AndroidVersion`]: OS version descriptors used for version spoofing
//!
//! The catalog is fully static. It is built once per process via
//! [`DeviceCatalog::builtin`] and never mutated afterwards.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Device name of the sentinel "spoofing disabled" profile.
pub const SENTINEL_DEVICE_NAME: &str = "None";

/// Device selected when the preference store carries no choice.
pub const DEFAULT_DEVICE_NAME: &str = "Pixel 5";

/// An Android OS version as reported through the version-identity fields.
///
/// `sdk` is monotonically associated with release ordering in the catalog.
/// This is relied upon by feature-gated server checks but not enforced here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AndroidVersion {
    /// Human-readable label shown in settings, e.g. "Oreo 8.1.0"
    pub label: String,
    /// Value written to the RELEASE field, e.g. "8.1.0"
    pub release: String,
    /// Value written to the SDK_INT field
    pub sdk: i32,
}

/// A spoofable device: its identity fields and the feature tier it sits in.
///
/// `identity_fields` preserves definition order; the override engine writes
/// each field exactly once, so iteration order does not affect the result.
#[derive(Debug, Clone)]
pub struct DeviceProfile {
    /// Unique key, e.g. "Pixel 3a XL"
    pub device_name: String,
    /// OS-identity fields to overwrite (BRAND, MANUFACTURER, DEVICE, PRODUCT,
    /// MODEL, FINGERPRINT). Empty for the sentinel profile.
    pub identity_fields: IndexMap<String, String>,
    /// Name of the tier in [`DeviceCatalog::tiers`] this device belongs to
    pub feature_level: String,
    /// OS version shipped on this device, used by the "follow device" policy
    pub android_version: Option<AndroidVersion>,
}

impl DeviceProfile {
    /// Whether this is the sentinel "spoofing disabled" profile.
    pub fn is_sentinel(&self) -> bool {
        self.identity_fields.is_empty()
    }
}

/// A named group of capability flags introduced by one device generation.
#[derive(Debug, Clone)]
pub struct FeatureLevelTier {
    /// Unique tier name, matches [`DeviceProfile::feature_level`]
    pub name: String,
    /// Capability flags introduced by this tier
    pub flags: Vec<String>,
}

/// The immutable catalog of devices, tiers and versions.
///
/// Lookups have no side effects; the only failure mode is "not found".
#[derive(Debug)]
pub struct DeviceCatalog {
    versions: Vec<AndroidVersion>,
    tiers: Vec<FeatureLevelTier>,
    profiles: Vec<DeviceProfile>,
    android_prefix: Regex,
}

static BUILTIN: Lazy<DeviceCatalog> = Lazy::new(DeviceCatalog::build);

impl DeviceCatalog {
    /// Get the process-wide builtin catalog.
    pub fn builtin() -> &'static DeviceCatalog {
        &BUILTIN
    }

    /// Find a device profile by its exact, case-sensitive name.
    ///
    /// Returns `None` for unknown names. The sentinel profile "None" *is*
    /// found by this lookup; callers check [`DeviceProfile::is_sentinel`].
    pub fn find_profile(&self, device_name: &str) -> Option<&DeviceProfile> {
        self.profiles.iter().find(|p| p.device_name == device_name)
    }

    /// Position of a tier in the fixed chronological order.
    ///
    /// Returns `None` if the name is not a known tier (including the
    /// sentinel's empty level). Callers must treat that as "grant nothing".
    pub fn tier_index(&self, feature_level: &str) -> Option<usize> {
        self.tiers.iter().position(|t| t.name == feature_level)
    }

    /// All tiers in chronological order, earliest release first.
    pub fn tiers(&self) -> &[FeatureLevelTier] {
        &self.tiers
    }

    /// All device profiles, sentinel first.
    pub fn profiles(&self) -> &[DeviceProfile] {
        &self.profiles
    }

    /// All known Android version descriptors.
    pub fn versions(&self) -> &[AndroidVersion] {
        &self.versions
    }

    /// Union of every tier's capability flags.
    ///
    /// This is the superset the interceptor actively denies from: any known
    /// flag a profile was not granted. Computed over the tier list directly
    /// so it stays correct if the catalog grows new devices under a different
    /// naming scheme.
    pub fn all_flags(&self) -> HashSet<String> {
        self.tiers
            .iter()
            .flat_map(|t| t.flags.iter().cloned())
            .collect()
    }

    /// Look up an Android version from a free-text label.
    ///
    /// Accepts the full catalog label ("Oreo 8.1.0", case-insensitive), the
    /// bare release string ("8.1.0", "11"), or either prefixed with
    /// "Android ". Returns `None` for anything else; callers skip version
    /// spoofing in that case.
    pub fn version_from_label(&self, label: &str) -> Option<&AndroidVersion> {
        let needle = self.android_prefix.replace(label.trim(), "");
        let needle = needle.trim();
        if needle.is_empty() {
            return None;
        }
        self.versions
            .iter()
            .find(|v| v.label.eq_ignore_ascii_case(needle) || v.release == needle)
    }

    /// Construct the builtin catalog contents.
    fn build() -> Self {
        let ver_7_1_2 = version("Nougat 7.1.2", "7.1.2", 25);
        let ver_8_1_0 = version("Oreo 8.1.0", "8.1.0", 27);
        let ver_10_0 = version("Q 10.0", "10", 29);
        let ver_11_0 = version("R 11.0", "11", 30);
        let ver_12_0 = version("S 12.0", "12", 31);

        let versions = vec![
            ver_7_1_2,
            ver_8_1_0.clone(),
            ver_10_0.clone(),
            ver_11_0.clone(),
            ver_12_0.clone(),
        ];

        // Chronological order is load-bearing: granted sets are cumulative
        // unions over a prefix of this list.
        let tiers = vec![
            tier(
                "Pixel 2016",
                &[
                    "com.google.android.apps.photos.NEXUS_PRELOAD",
                    "com.google.android.apps.photos.nexus_preload",
                    "com.google.android.feature.PIXEL_EXPERIENCE",
                    "com.google.android.apps.photos.PIXEL_PRELOAD",
                    "com.google.android.apps.photos.PIXEL_2016_PRELOAD",
                ],
            ),
            tier(
                "Pixel 2017",
                &[
                    "com.google.android.feature.PIXEL_2017_EXPERIENCE",
                    "com.google.android.apps.photos.PIXEL_2017_PRELOAD",
                ],
            ),
            tier(
                "Pixel 2018",
                &[
                    "com.google.android.feature.PIXEL_2018_EXPERIENCE",
                    "com.google.android.apps.photos.PIXEL_2018_PRELOAD",
                ],
            ),
            tier(
                "Pixel 2019 mid-year",
                &[
                    "com.google.android.feature.PIXEL_2019_MIDYEAR_EXPERIENCE",
                    "com.google.android.apps.photos.PIXEL_2019_MIDYEAR_PRELOAD",
                ],
            ),
            tier(
                "Pixel 2019",
                &[
                    "com.google.android.feature.PIXEL_2019_EXPERIENCE",
                    "com.google.android.apps.photos.PIXEL_2019_PRELOAD",
                ],
            ),
            tier(
                "Pixel 2020 mid-year",
                &[
                    "com.google.android.feature.PIXEL_2020_MIDYEAR_EXPERIENCE",
                    "com.google.android.apps.photos.PIXEL_2020_MIDYEAR_PRELOAD",
                ],
            ),
            tier(
                "Pixel 2020",
                &[
                    "com.google.android.feature.PIXEL_2020_EXPERIENCE",
                    "com.google.android.apps.photos.PIXEL_2020_PRELOAD",
                ],
            ),
            tier(
                "Pixel 2021 mid-year",
                &[
                    "com.google.android.feature.PIXEL_2021_MIDYEAR_EXPERIENCE",
                    "com.google.android.apps.photos.PIXEL_2021_MIDYEAR_PRELOAD",
                ],
            ),
            tier(
                "Pixel 2021",
                &[
                    "com.google.android.feature.PIXEL_2021_EXPERIENCE",
                    "com.google.android.apps.photos.PIXEL_2021_PRELOAD",
                ],
            ),
        ];

        let profiles = vec![
            DeviceProfile {
                device_name: SENTINEL_DEVICE_NAME.to_string(),
                identity_fields: IndexMap::new(),
                feature_level: SENTINEL_DEVICE_NAME.to_string(),
                android_version: None,
            },
            pixel(
                "Pixel XL",
                "marlin",
                "google/marlin/marlin:10/QP1A.191005.007.A3/5972272:user/release-keys",
                "Pixel 2016",
                &ver_10_0,
            ),
            pixel(
                "Pixel 2",
                "walleye",
                "google/walleye/walleye:8.1.0/OPM1.171019.021/4565141:user/release-keys",
                "Pixel 2017",
                &ver_8_1_0,
            ),
            pixel(
                "Pixel 3 XL",
                "crosshatch",
                "google/crosshatch/crosshatch:11/RQ3A.211001.001/7641976:user/release-keys",
                "Pixel 2018",
                &ver_11_0,
            ),
            pixel(
                "Pixel 3a XL",
                "bonito",
                "google/bonito/bonito:11/RQ3A.211001.001/7641976:user/release-keys",
                "Pixel 2019 mid-year",
                &ver_11_0,
            ),
            pixel(
                "Pixel 4 XL",
                "coral",
                "google/coral/coral:12/SP1A.211105.002/7743617:user/release-keys",
                "Pixel 2019",
                &ver_12_0,
            ),
            pixel(
                "Pixel 4a",
                "sunfish",
                "google/sunfish/sunfish:11/RQ3A.211001.001/7641976:user/release-keys",
                "Pixel 2020 mid-year",
                &ver_11_0,
            ),
            pixel(
                "Pixel 5",
                "redfin",
                "google/redfin/redfin:12/SP1A.211105.003/7757856:user/release-keys",
                "Pixel 2020",
                &ver_12_0,
            ),
            pixel(
                "Pixel 5a",
                "barbet",
                "google/barbet/barbet:11/RD2A.211001.002/7644766:user/release-keys",
                "Pixel 2021 mid-year",
                &ver_11_0,
            ),
            pixel(
                "Pixel 6 Pro",
                "raven",
                "google/raven/raven:12/SD1A.210817.036/7805805:user/release-keys",
                "Pixel 2021",
                &ver_12_0,
            ),
        ];

        Self {
            versions,
            tiers,
            profiles,
            android_prefix: Regex::new(r"(?i)^android\s+").expect("static pattern"),
        }
    }
}

fn version(label: &str, release: &str, sdk: i32) -> AndroidVersion {
    AndroidVersion {
        label: label.to_string(),
        release: release.to_string(),
        sdk,
    }
}

fn tier(name: &str, flags: &[&str]) -> FeatureLevelTier {
    FeatureLevelTier {
        name: name.to_string(),
        flags: flags.iter().map(|f| f.to_string()).collect(),
    }
}

/// All Pixel profiles share the brand/manufacturer fields and use the device
/// codename for both DEVICE and PRODUCT.
fn pixel(
    device_name: &str,
    codename: &str,
    fingerprint: &str,
    feature_level: &str,
    android_version: &AndroidVersion,
) -> DeviceProfile {
    let mut identity_fields = IndexMap::new();
    identity_fields.insert("BRAND".to_string(), "google".to_string());
    identity_fields.insert("MANUFACTURER".to_string(), "Google".to_string());
    identity_fields.insert("DEVICE".to_string(), codename.to_string());
    identity_fields.insert("PRODUCT".to_string(), codename.to_string());
    identity_fields.insert("MODEL".to_string(), device_name.to_string());
    identity_fields.insert("FINGERPRINT".to_string(), fingerprint.to_string());

    DeviceProfile {
        device_name: device_name.to_string(),
        identity_fields,
        feature_level: feature_level.to_string(),
        android_version: Some(android_version.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_shared() {
        let a = DeviceCatalog::builtin();
        let b = DeviceCatalog::builtin();
        assert!(std::ptr::eq(a, b));
    }

    #[test]
    fn test_find_profile_exact_match() {
        let catalog = DeviceCatalog::builtin();
        let profile = catalog.find_profile("Pixel 5").unwrap();
        assert_eq!(profile.feature_level, "Pixel 2020");
        assert_eq!(profile.identity_fields.get("DEVICE").unwrap(), "redfin");
        assert_eq!(profile.identity_fields.get("MODEL").unwrap(), "Pixel 5");
    }

    #[test]
    fn test_find_profile_is_case_sensitive() {
        let catalog = DeviceCatalog::builtin();
        assert!(catalog.find_profile("pixel 5").is_none());
        assert!(catalog.find_profile("Pixel 99").is_none());
    }

    #[test]
    fn test_sentinel_profile() {
        let catalog = DeviceCatalog::builtin();
        let sentinel = catalog.find_profile(SENTINEL_DEVICE_NAME).unwrap();
        assert!(sentinel.is_sentinel());
        assert!(sentinel.android_version.is_none());
        assert!(catalog.tier_index(&sentinel.feature_level).is_none());
    }

    #[test]
    fn test_tier_order() {
        let catalog = DeviceCatalog::builtin();
        assert_eq!(catalog.tier_index("Pixel 2016"), Some(0));
        assert_eq!(catalog.tier_index("Pixel 2019 mid-year"), Some(3));
        assert_eq!(catalog.tier_index("Pixel 2021"), Some(8));
        assert_eq!(catalog.tier_index("Pixel 2035"), None);
    }

    #[test]
    fn test_all_flags_is_full_union() {
        let catalog = DeviceCatalog::builtin();
        let all = catalog.all_flags();
        // 5 flags in the 2016 tier, 2 in each of the 8 later tiers
        assert_eq!(all.len(), 21);
        assert!(all.contains("com.google.android.feature.PIXEL_EXPERIENCE"));
        assert!(all.contains("com.google.android.apps.photos.PIXEL_2021_PRELOAD"));
    }

    #[test]
    fn test_version_from_release_string() {
        let catalog = DeviceCatalog::builtin();
        assert_eq!(catalog.version_from_label("8.1.0").unwrap().sdk, 27);
        assert_eq!(catalog.version_from_label("11").unwrap().sdk, 30);
        assert_eq!(catalog.version_from_label("12").unwrap().sdk, 31);
    }

    #[test]
    fn test_version_from_full_label() {
        let catalog = DeviceCatalog::builtin();
        assert_eq!(catalog.version_from_label("Oreo 8.1.0").unwrap().sdk, 27);
        assert_eq!(catalog.version_from_label("oreo 8.1.0").unwrap().sdk, 27);
    }

    #[test]
    fn test_version_label_android_prefix_stripped() {
        let catalog = DeviceCatalog::builtin();
        assert_eq!(catalog.version_from_label("Android 11").unwrap().sdk, 30);
        assert_eq!(catalog.version_from_label("  android 12 ").unwrap().sdk, 31);
    }

    #[test]
    fn test_version_from_garbage_label() {
        let catalog = DeviceCatalog::builtin();
        assert!(catalog.version_from_label("").is_none());
        assert!(catalog.version_from_label("   ").is_none());
        assert!(catalog.version_from_label("KitKat 4.4").is_none());
        assert!(catalog.version_from_label("Android").is_none());
    }

    #[test]
    fn test_every_device_tier_exists() {
        let catalog = DeviceCatalog::builtin();
        for profile in catalog.profiles() {
            if profile.is_sentinel() {
                continue;
            }
            assert!(
                catalog.tier_index(&profile.feature_level).is_some(),
                "missing tier {} for {}",
                profile.feature_level,
                profile.device_name
            );
        }
    }

    #[test]
    fn test_tier_flags_are_disjoint() {
        // Reference data keeps tiers disjoint; the resolver does not depend
        // on it, but a collision here is a data-entry mistake.
        let catalog = DeviceCatalog::builtin();
        let mut seen = HashSet::new();
        for tier in catalog.tiers() {
            for flag in &tier.flags {
                assert!(seen.insert(flag.clone()), "flag repeated: {flag}");
            }
        }
    }
}
