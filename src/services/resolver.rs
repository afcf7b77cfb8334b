//! Cumulative feature-flag resolution.
//!
//! A device profile grants every capability flag introduced by its own tier
//! and all earlier tiers: newer devices are supersets of older ones. The
//! complementary denied set is everything else the catalog knows about, so
//! the interceptor can actively contradict ROMs that natively report
//! high-tier flags the user did not select.

use crate::catalog::DeviceCatalog;
use crate::models::SpoofSettings;
use std::collections::HashSet;

/// The two flag sets the interceptor consults, fixed for a process lifetime.
///
/// `granted` and `denied` are disjoint by construction
/// (denied = all known flags − granted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFeatureState {
    /// Flags answered `true`
    pub granted: HashSet<String>,
    /// Flags answered `false` when the ROM override policy is enabled
    pub denied: HashSet<String>,
}

/// Computes granted/denied capability sets from a device selection.
#[derive(Debug, Clone, Copy)]
pub struct FeatureFlagResolver {
    catalog: &'static DeviceCatalog,
}

impl FeatureFlagResolver {
    pub fn new(catalog: &'static DeviceCatalog) -> Self {
        Self { catalog }
    }

    /// Cumulative granted set for a device name.
    ///
    /// Unions the flags of every tier at or before the device's tier,
    /// in catalog order. Unknown device names, the sentinel profile, and
    /// unknown tier names all resolve to the empty set.
    pub fn resolve_granted(&self, device_name: &str) -> HashSet<String> {
        let Some(profile) = self.catalog.find_profile(device_name) else {
            return HashSet::new();
        };
        let Some(tier_index) = self.catalog.tier_index(&profile.feature_level) else {
            return HashSet::new();
        };

        self.catalog
            .tiers()
            .iter()
            .take(tier_index + 1)
            .flat_map(|t| t.flags.iter().cloned())
            .collect()
    }

    /// Known flags the profile must actively deny.
    ///
    /// The superset is the union of every tier's flags taken from the
    /// catalog directly, never by resolving some "newest device" stand-in,
    /// so it stays correct as the catalog grows.
    pub fn resolve_denied(&self, granted: &HashSet<String>) -> HashSet<String> {
        let mut all = self.catalog.all_flags();
        all.retain(|flag| !granted.contains(flag));
        all
    }

    /// Resolve the full feature state for a settings snapshot.
    ///
    /// When the user saved an explicit flag set from the customization
    /// screen it is used verbatim as the granted set; otherwise the granted
    /// set is the cumulative resolution of the selected device. The denied
    /// set is always computed against the full catalog superset.
    pub fn resolve(&self, settings: &SpoofSettings) -> ResolvedFeatureState {
        let granted: HashSet<String> = match &settings.custom_feature_flags {
            Some(flags) => {
                tracing::info!("Feature flags source: custom set ({} flags)", flags.len());
                flags.iter().cloned().collect()
            }
            None => {
                tracing::info!("Feature flags source: device {}", settings.device_to_spoof);
                self.resolve_granted(&settings.device_to_spoof)
            }
        };

        let denied = self.resolve_denied(&granted);

        if settings.verbose_logs {
            tracing::debug!("Granted flags: {:?}", granted);
            tracing::debug!("Denied flags: {:?}", denied);
        }

        ResolvedFeatureState { granted, denied }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::SENTINEL_DEVICE_NAME;

    fn resolver() -> FeatureFlagResolver {
        FeatureFlagResolver::new(DeviceCatalog::builtin())
    }

    #[test]
    fn test_earliest_tier_grants_only_its_own_flags() {
        let granted = resolver().resolve_granted("Pixel XL");
        assert_eq!(granted.len(), 5);
        assert!(granted.contains("com.google.android.apps.photos.NEXUS_PRELOAD"));
        assert!(!granted.contains("com.google.android.feature.PIXEL_2017_EXPERIENCE"));
    }

    #[test]
    fn test_resolution_is_cumulative() {
        let granted = resolver().resolve_granted("Pixel 3 XL");
        // Pixel 2018 tier: 5 + 2 + 2 flags
        assert_eq!(granted.len(), 9);
        assert!(granted.contains("com.google.android.apps.photos.NEXUS_PRELOAD"));
        assert!(granted.contains("com.google.android.feature.PIXEL_2017_EXPERIENCE"));
        assert!(granted.contains("com.google.android.feature.PIXEL_2018_EXPERIENCE"));
        assert!(!granted.contains("com.google.android.feature.PIXEL_2019_EXPERIENCE"));
    }

    #[test]
    fn test_monotonicity_across_tiers() {
        let r = resolver();
        let earlier = r.resolve_granted("Pixel 2");
        let later = r.resolve_granted("Pixel 6 Pro");
        assert!(later.len() > earlier.len());
        assert!(earlier.iter().all(|f| later.contains(f)));
    }

    #[test]
    fn test_unknown_and_sentinel_resolve_empty() {
        let r = resolver();
        assert!(r.resolve_granted("unknown-device").is_empty());
        assert!(r.resolve_granted(SENTINEL_DEVICE_NAME).is_empty());
    }

    #[test]
    fn test_granted_and_denied_are_disjoint() {
        let r = resolver();
        for profile in DeviceCatalog::builtin().profiles() {
            let granted = r.resolve_granted(&profile.device_name);
            let denied = r.resolve_denied(&granted);
            assert!(granted.is_disjoint(&denied), "{}", profile.device_name);
            assert_eq!(
                granted.len() + denied.len(),
                DeviceCatalog::builtin().all_flags().len()
            );
        }
    }

    #[test]
    fn test_newest_device_denies_nothing() {
        let r = resolver();
        let granted = r.resolve_granted("Pixel 6 Pro");
        assert!(r.resolve_denied(&granted).is_empty());
    }

    #[test]
    fn test_resolve_uses_custom_flags_verbatim() {
        let mut settings = SpoofSettings::default();
        settings.custom_feature_flags = Some(
            [
                "com.google.android.feature.PIXEL_2021_EXPERIENCE",
                "some.flag.not.in.catalog",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        );

        let state = resolver().resolve(&settings);
        assert_eq!(state.granted.len(), 2);
        assert!(state.granted.contains("some.flag.not.in.catalog"));
        // Denied still computed against the full catalog superset
        assert!(
            state
                .denied
                .contains("com.google.android.feature.PIXEL_2020_EXPERIENCE")
        );
        assert!(
            !state
                .denied
                .contains("com.google.android.feature.PIXEL_2021_EXPERIENCE")
        );
    }

    #[test]
    fn test_resolve_defaults_to_selected_device() {
        let settings = SpoofSettings::default();
        let state = resolver().resolve(&settings);
        assert_eq!(state.granted, resolver().resolve_granted("Pixel 5"));
    }
}
