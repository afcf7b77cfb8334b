//! Host-runtime seam.
//!
//! The hooking framework that loads this engine into a target process is an
//! external collaborator. It talks to the engine through two narrow
//! interfaces so the core stays free of host-framework types:
//!
//! - [`ProcessLoadObserver`]: invoked once per process load, synchronously,
//!   before control returns to the host runtime (which guarantees identity
//!   fields are overwritten before any application code can read them)
//! - [`MethodInterceptor`]: invoked on every capability query for the
//!   remaining lifetime of the process
//!
//! [`SpoofModule`] wires the catalog, resolver, identity engine and
//! interceptor together behind those interfaces. Nothing in this module
//! panics: any failure is logged, counted, and contained so a spoofing
//! problem can never take down the host application.

use crate::TARGET_PACKAGE;
use crate::catalog::{AndroidVersion, DeviceCatalog, DeviceProfile};
use crate::config::ConfigurationStore;
use crate::metrics::Metrics;
use crate::models::SpoofSettings;
use crate::services::{CapabilityQueryInterceptor, FeatureFlagResolver, IdentityOverrideEngine};
use crate::services::identity::IdentitySurface;
use once_cell::sync::OnceCell;
use std::sync::Arc;

/// Identity of the process the host runtime just loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessInfo {
    pub package_name: String,
}

impl ProcessInfo {
    pub fn new(package_name: impl Into<String>) -> Self {
        Self {
            package_name: package_name.into(),
        }
    }
}

/// Per-process-load callback implemented by the engine.
///
/// Returns the interceptor the host adapter must install on the capability
/// query entry points, or `None` when nothing should be installed for this
/// process (module disabled, package mismatch, unreadable preferences).
pub trait ProcessLoadObserver: Send + Sync {
    fn on_process_load(
        &self,
        process: &ProcessInfo,
        surface: &mut dyn IdentitySurface,
    ) -> Option<Arc<dyn MethodInterceptor>>;
}

/// Per-call interception seam for the capability query entry points.
///
/// `Some(answer)` short-circuits the hooked call; `None` defers to the
/// original implementation. The optional `flags` argument mirrors the
/// two-argument signature variant of the query and never changes the answer.
pub trait MethodInterceptor: Send + Sync {
    fn intercept(&self, feature_name: &str, flags: Option<i32>) -> Option<bool>;
}

impl MethodInterceptor for CapabilityQueryInterceptor {
    fn intercept(&self, feature_name: &str, flags: Option<i32>) -> Option<bool> {
        self.intercept_query(feature_name, flags)
    }
}

/// The engine's entry point, registered with the host runtime.
///
/// Holds the injected preference store and the builtin catalog. The
/// preference store is read once per process load; a later change requires
/// the hooked application to restart, which is a deliberate and
/// user-communicated constraint.
pub struct SpoofModule {
    store: Arc<dyn ConfigurationStore>,
    catalog: &'static DeviceCatalog,
    metrics: Arc<Metrics>,
    identity_applied: OnceCell<()>,
}

impl SpoofModule {
    pub fn new(store: Arc<dyn ConfigurationStore>) -> Self {
        Self {
            store,
            catalog: DeviceCatalog::builtin(),
            metrics: Arc::new(Metrics::new()),
            identity_applied: OnceCell::new(),
        }
    }

    /// Diagnostics counters for this process.
    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Pick the Android version descriptor per the configured policy.
    ///
    /// "Follow device" always wins when set; otherwise the manual label is
    /// parsed, and an unparseable label skips version spoofing for this
    /// process lifetime.
    fn choose_version(
        &self,
        settings: &SpoofSettings,
        profile: &DeviceProfile,
    ) -> Option<AndroidVersion> {
        if settings.version_follow_device {
            return profile.android_version.clone();
        }

        let label = settings.version_manual_label.as_deref()?;
        match self.catalog.version_from_label(label) {
            Some(version) => Some(version.clone()),
            None => {
                tracing::warn!(
                    "Manual Android version label {:?} not recognized, skipping version spoof",
                    label
                );
                None
            }
        }
    }

    /// Gating shared by both subsystems: master switch and package match.
    fn is_active_for(&self, settings: &SpoofSettings, process: &ProcessInfo) -> bool {
        if !settings.module_enabled {
            tracing::debug!("Module disabled, skipping {}", process.package_name);
            return false;
        }
        if settings.strict_package_match && process.package_name != TARGET_PACKAGE {
            tracing::debug!(
                "Strict package match enabled, skipping {}",
                process.package_name
            );
            return false;
        }
        true
    }
}

impl ProcessLoadObserver for SpoofModule {
    fn on_process_load(
        &self,
        process: &ProcessInfo,
        surface: &mut dyn IdentitySurface,
    ) -> Option<Arc<dyn MethodInterceptor>> {
        let settings = match self.store.load() {
            Ok(config) => config.spoof_settings,
            Err(e) => {
                // Unreadable preferences mean "module inactive" - a distinct
                // state from "active but configured to spoof nothing".
                tracing::warn!("Preference store unavailable, module inactive: {e}");
                self.metrics.record_config_load_failure();
                self.metrics.record_process_skipped();
                return None;
            }
        };

        if !self.is_active_for(&settings, process) {
            self.metrics.record_process_skipped();
            return None;
        }

        tracing::info!(
            "Engine active for {} (device: {})",
            process.package_name,
            settings.device_to_spoof
        );

        // Identity overrides run at most once per process. A failure inside
        // the override engine is contained there and must not prevent the
        // capability interceptor from installing.
        self.identity_applied.get_or_init(|| {
            match self.catalog.find_profile(&settings.device_to_spoof) {
                Some(profile) => {
                    let version = self.choose_version(&settings, profile);
                    let engine =
                        IdentityOverrideEngine::new(settings.verbose_logs, self.metrics.clone());
                    engine.apply(profile, version.as_ref(), surface);
                }
                None => {
                    tracing::warn!(
                        "Unknown device {:?}, no identity overrides",
                        settings.device_to_spoof
                    );
                }
            }
        });

        let interceptor = CapabilityQueryInterceptor::new(
            settings,
            FeatureFlagResolver::new(self.catalog),
            self.metrics.clone(),
        );

        self.metrics.record_process_attached();
        Some(Arc::new(interceptor))
    }
}
