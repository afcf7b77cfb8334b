// Pixelspoof - Device identity spoofing engine for Pixel feature gating
//
// This is the library crate containing the spoofing engine: the static device
// catalog, cumulative feature-flag resolution, the one-shot identity override,
// and the per-query capability interceptor. A host hooking runtime loads it
// into the target process and drives it through the interfaces in `hooks`.

pub mod catalog;
pub mod config;
pub mod hooks;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod services;

// Re-export commonly used types for convenience
pub use catalog::DeviceCatalog;
pub use config::{ConfigManager, ConfigurationStore};
pub use hooks::{MethodInterceptor, ProcessInfo, ProcessLoadObserver, SpoofModule};
pub use models::{SpoofConfig, SpoofSettings};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const ENGINE_NAME: &str = env!("CARGO_PKG_NAME");

/// Package name of the target application (Google Photos)
pub const TARGET_PACKAGE: &str = "com.google.android.apps.photos";
