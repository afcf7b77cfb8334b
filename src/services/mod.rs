//! Services module - Pure spoofing logic, free of host-runtime types.
//!
//! This module contains the core decision logic of the engine. The services
//! are **framework-agnostic**: they never see hooking-framework or UI types,
//! only the catalog, the settings snapshot, and the narrow surface traits,
//! which keeps them testable without a hooked process.
//!
//! # Components
//!
//! - [`FeatureFlagResolver`]: turns a selected device (or an explicit custom
//!   flag set) into the granted/denied capability sets. Resolution is
//!   cumulative over the chronologically ordered tier list.
//!
//! - [`IdentityOverrideEngine`]: one-shot application of a device profile's
//!   identity fields (and optionally an Android version descriptor) into the
//!   hooked process's OS-identity surface.
//!
//! - [`CapabilityQueryInterceptor`]: per-call decision for capability queries;
//!   short-circuits `true` for granted flags, `false` for denied flags when
//!   the ROM override policy is on, and defers to the original implementation
//!   otherwise.
//!
//! # Design Philosophy
//!
//! - **Pure**: no I/O; all inputs are explicit parameters or injected traits
//! - **Crash-free**: a spoofing failure is logged and contained, never
//!   propagated into the host application
//! - **Restart-to-apply**: resolved state is computed once per process and
//!   deliberately never refreshed when preferences change afterwards

pub mod identity;
pub mod interceptor;
pub mod resolver;

pub use identity::{IdentityOverrideEngine, IdentitySurface, SurfaceError, VersionValue};
pub use interceptor::{CapabilityQueryInterceptor, QueryDecision};
pub use resolver::{FeatureFlagResolver, ResolvedFeatureState};
