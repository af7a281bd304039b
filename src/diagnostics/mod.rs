//! Diagnostics for the object tracker.
//!
//! This module provides:
//! - **Diagnostic codes**: typed `OTxxx` codes with severities
//! - **The report sink**: the boundary to the layer's message machinery; the
//!   sink's boolean return is the "skip the downstream call" signal
//! - **Strict mode**: optional panic-on-diagnostic for CI
//!
//! ## Diagnostic Codes
//!
//! | Code  | Meaning                                   |
//! |-------|-------------------------------------------|
//! | OT000 | object created (informational)            |
//! | OT010 | object destroyed (informational)          |
//! | OT001 | unknown object handle                     |
//! | OT002 | handle owned by another context           |
//! | OT101 | created custom, destroyed default         |
//! | OT102 | created default, destroyed custom         |
//! | OT103 | destroy parent mismatch                   |
//! | OT201 | queue family lacks capability (advisory)  |
//! | OT301 | object leaked at context teardown         |
//! | OT901 | internal tracker invariant violated       |

pub mod emit;
pub mod kind;
pub mod strict;

// Re-export core types
pub use emit::{suppress_diagnostics, CollectingSink, DiagnosticSink, StderrSink};
pub use kind::{Diagnostic, DiagnosticCode, Severity};
pub use strict::{init_from_env, set_strict_mode, strict_mode, StrictMode, StrictModeGuard};

// Re-export predefined codes
pub use kind::{OT000, OT001, OT002, OT010, OT101, OT102, OT103, OT201, OT301, OT901};
