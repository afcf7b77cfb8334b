//! One-shot identity field overrides.
//!
//! Writes a device profile's static identity fields (and, policy permitting,
//! the OS version fields) into the hooked process through the injected
//! [`IdentitySurface`]. Runs synchronously inside the process-load callback,
//! before any application code can observe the fields.

use crate::catalog::{AndroidVersion, DeviceProfile};
use crate::metrics::Metrics;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Errors from the hooked process's identity-field surface.
#[derive(Error, Debug)]
pub enum SurfaceError {
    #[error("identity field {0} not found on target surface")]
    FieldNotFound(String),

    #[error("write to identity field {field} rejected: {reason}")]
    WriteRejected { field: String, reason: String },
}

/// A value written to a version-identity field. SDK_INT is an integer field
/// on the target surface; the other version fields are strings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VersionValue {
    Str(String),
    Int(i32),
}

impl fmt::Display for VersionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(s) => write!(f, "{s}"),
            Self::Int(i) => write!(f, "{i}"),
        }
    }
}

/// Write surface for the target process's OS-identity fields.
///
/// Implemented by the host adapter against whatever hooking substrate is in
/// use. Build fields (BRAND, MODEL, ...) and version fields (RELEASE,
/// SDK_INT, SDK) live on separate target surfaces; a failure on one must not
/// be treated as a failure of the other.
pub trait IdentitySurface {
    /// Overwrite a static build-identity field.
    fn write_build_field(&mut self, field: &str, value: &str) -> Result<(), SurfaceError>;

    /// Overwrite a version-identity field.
    fn write_version_field(&mut self, field: &str, value: &VersionValue)
    -> Result<(), SurfaceError>;
}

/// Applies a device profile's identity fields exactly once per process.
///
/// The one-shot guarantee is enforced by the caller
/// ([`SpoofModule`](crate::hooks::SpoofModule)); `apply` itself is
/// idempotent since field writes are last-write-wins over a fixed map.
#[derive(Clone)]
pub struct IdentityOverrideEngine {
    verbose: bool,
    metrics: Arc<Metrics>,
}

impl IdentityOverrideEngine {
    pub fn new(verbose: bool, metrics: Arc<Metrics>) -> Self {
        Self { verbose, metrics }
    }

    /// Apply identity overrides for `profile` and optionally `version`.
    ///
    /// The sentinel profile writes nothing at all. A surface error is logged
    /// and abandons the remaining writes on that surface only; the version
    /// surface is still attempted after a build-surface failure. Nothing is
    /// returned and nothing propagates: the hooked application must never be
    /// taken down by a spoofing failure, and the capability interceptor
    /// installs independently of any outcome here.
    pub fn apply(
        &self,
        profile: &DeviceProfile,
        version: Option<&AndroidVersion>,
        surface: &mut dyn IdentitySurface,
    ) {
        if profile.is_sentinel() {
            tracing::debug!("Sentinel profile selected, no identity overrides");
            return;
        }

        self.apply_build_fields(profile, surface);

        if let Some(version) = version {
            self.apply_version_fields(version, surface);
        }
    }

    fn apply_build_fields(&self, profile: &DeviceProfile, surface: &mut dyn IdentitySurface) {
        for (field, value) in &profile.identity_fields {
            match surface.write_build_field(field, value) {
                Ok(()) => {
                    self.metrics.record_identity_field_written();
                    if self.verbose {
                        tracing::debug!("Identity field {} = {}", field, value);
                    }
                }
                Err(e) => {
                    self.metrics.record_identity_write_failure();
                    tracing::error!(
                        "Identity surface write failed ({}), abandoning remaining build fields",
                        e
                    );
                    return;
                }
            }
        }
        tracing::info!(
            "Applied {} identity fields for {}",
            profile.identity_fields.len(),
            profile.device_name
        );
    }

    fn apply_version_fields(&self, version: &AndroidVersion, surface: &mut dyn IdentitySurface) {
        let writes = [
            ("RELEASE", VersionValue::Str(version.release.clone())),
            ("SDK_INT", VersionValue::Int(version.sdk)),
            ("SDK", VersionValue::Str(version.sdk.to_string())),
        ];

        for (field, value) in &writes {
            match surface.write_version_field(field, value) {
                Ok(()) => {
                    self.metrics.record_version_field_written();
                    if self.verbose {
                        tracing::debug!("Version field {} = {}", field, value);
                    }
                }
                Err(e) => {
                    self.metrics.record_identity_write_failure();
                    tracing::error!(
                        "Version surface write failed ({}), abandoning remaining version fields",
                        e
                    );
                    return;
                }
            }
        }
        tracing::info!("Applied Android version {}", version.label);
    }
}
