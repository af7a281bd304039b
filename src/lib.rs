//! # objtrack
//!
//! Object-lifetime tracking core for graphics-API validation layers.
//!
//! ## Features
//!
//! - Per-context handle registries (one per instance, one per device)
//! - Cross-context validation: valid, foreign, or unknown, with distinct
//!   diagnostic codes for each failure
//! - Parent/pool consistency and cascade destruction on pool reset/destroy
//! - Allocator-discipline checks at destroy time
//! - Leak reporting at device and instance teardown
//! - Queue family capability advisories
//! - Pluggable diagnostic sink with a skip-the-call signal
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use objtrack::{AllocatorKind, Handle, ObjectTracker, ObjectType, TrackerConfig};
//! use objtrack::{OT001, OT002};
//!
//! let tracker = ObjectTracker::new(TrackerConfig::default());
//!
//! let instance = Handle::new(0x1000);
//! let device = Handle::new(0x2000);
//! tracker.register_instance(instance, AllocatorKind::Default);
//! tracker.register_device(instance, device, AllocatorKind::Default);
//!
//! // Intercepted create call succeeded downstream: record the handle.
//! let buffer = Handle::new(0x3000);
//! tracker.register_object(device, ObjectType::Buffer, buffer, None, AllocatorKind::Default);
//!
//! // Later calls validate before forwarding.
//! let verdict = tracker.validate(device, buffer, ObjectType::Buffer, false, OT001, OT002);
//! assert!(verdict.passed());
//!
//! // Teardown reports anything the application forgot.
//! let leaks = tracker.teardown_instance(instance);
//! ```
//!
//! ## Locking
//!
//! A single coarse lock per tracker guards every registry and the context
//! directory. Each operation takes and releases it internally, so the
//! interception shim can follow the usual two-phase protocol: validate,
//! make the downstream call with no lock held, then record the result.

pub mod api;
pub mod diagnostics;
pub mod registry;
pub mod validate;

mod sync;
mod teardown;

#[cfg(feature = "debug")]
pub mod debug;

// Re-export public API at crate root for convenience
pub use api::config::TrackerConfig;
pub use api::stats::TrackerStats;
pub use api::tracker::ObjectTracker;

// Registry data model
pub use registry::directory::ContextDirectory;
pub use registry::record::{
    AllocatorKind, Handle, ObjectRecord, ObjectType, QueueCapabilities, RecordFlags,
};
pub use registry::store::{ContextKind, HandleRegistry, QueueInfo};

// Validation outcome
pub use validate::Verdict;

// Diagnostics - core types and sinks
pub use diagnostics::{
    suppress_diagnostics, CollectingSink, Diagnostic, DiagnosticCode, DiagnosticSink, Severity,
    StderrSink,
};
pub use diagnostics::{init_from_env, set_strict_mode, strict_mode, StrictMode, StrictModeGuard};

// Diagnostics - predefined codes
pub use diagnostics::{OT000, OT001, OT002, OT010, OT101, OT102, OT103, OT201, OT301, OT901};
