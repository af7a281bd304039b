//! Cross-context handle validation.
//!
//! Resolves whether a handle is valid, foreign, or unknown. The local
//! registry is checked first; only on a local miss does the validator walk
//! every other live registry in the directory, so the expensive path is
//! linear in live-context count and rare in correct programs.

use crate::diagnostics::emit::{emit, DiagnosticSink};
use crate::diagnostics::kind::{Diagnostic, DiagnosticCode};
use crate::registry::directory::ContextDirectory;
use crate::registry::record::{Handle, ObjectType};
use crate::registry::store::{ContextKind, HandleRegistry};

/// Outcome of a validation check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The handle checked out; no diagnostic was emitted.
    Pass,
    /// A diagnostic fired. `skip` carries the sink's request to skip the
    /// downstream call.
    Fail {
        /// Whether the sink asked the shim to skip the downstream call.
        skip: bool,
    },
}

impl Verdict {
    /// Whether validation passed.
    pub fn passed(&self) -> bool {
        matches!(self, Verdict::Pass)
    }

    /// Whether the shim should skip the downstream call.
    pub fn should_skip(&self) -> bool {
        matches!(self, Verdict::Fail { skip: true })
    }
}

/// Whether `handle` is live in `reg`'s bucket for `expected`.
///
/// Images retrieved from a swapchain live in the derived bucket rather than
/// the typed bucket, so the image check covers both.
fn found_in(reg: &HandleRegistry, expected: ObjectType, handle: Handle) -> bool {
    if reg.contains(expected, handle) {
        return true;
    }
    expected == ObjectType::Image && reg.derived_contains(handle)
}

/// Validate a handle against the context the call was addressed to.
///
/// Two distinct failure codes let callers tell "reused a destroyed handle"
/// from "passed an object that belongs to a sibling context".
pub(crate) fn validate_handle(
    dir: &ContextDirectory,
    sink: &dyn DiagnosticSink,
    context: Handle,
    handle: Handle,
    expected: ObjectType,
    null_allowed: bool,
    invalid_code: DiagnosticCode,
    foreign_code: DiagnosticCode,
) -> Verdict {
    if null_allowed && handle.is_null() {
        return Verdict::Pass;
    }

    // Devices are recorded in their owning instance's registry, not their
    // own, so the device check delegates to the instance.
    if expected == ObjectType::Device {
        return validate_device(dir, sink, context, handle, invalid_code);
    }

    let Some(local) = dir.resolve(context) else {
        let diag = Diagnostic::error(
            invalid_code,
            expected,
            handle,
            format!("invalid {} object {}", expected, handle),
        )
        .with_note("the addressed context is not tracked");
        let skip = emit(sink, &diag);
        return Verdict::Fail { skip };
    };

    if found_in(local, expected, handle) {
        return Verdict::Pass;
    }

    // Local miss: walk every other live registry.
    for reg in dir.registries() {
        if reg.context_handle() == local.context_handle() {
            continue;
        }
        if found_in(reg, expected, handle) {
            if expected.is_cross_device_shareable() {
                // Instance-level shareable object; crossing device
                // boundaries is permitted for this type only.
                return Verdict::Pass;
            }
            let diag = Diagnostic::error(
                foreign_code,
                expected,
                handle,
                format!(
                    "{} object {} was created by a different context",
                    expected, handle
                ),
            )
            .with_note("object is live elsewhere; the wrong device or instance was addressed");
            let skip = emit(sink, &diag);
            return Verdict::Fail { skip };
        }
    }

    let diag = Diagnostic::error(
        invalid_code,
        expected,
        handle,
        format!("invalid {} object {}", expected, handle),
    )
    .with_note("handle was never registered or has already been destroyed");
    let skip = emit(sink, &diag);
    Verdict::Fail { skip }
}

/// Device-specific validation path: scan the owning instance's device bucket.
fn validate_device(
    dir: &ContextDirectory,
    sink: &dyn DiagnosticSink,
    context: Handle,
    handle: Handle,
    invalid_code: DiagnosticCode,
) -> Verdict {
    let instance = dir.resolve(context).and_then(|reg| match reg.kind() {
        ContextKind::Device => reg.owner(),
        ContextKind::Instance => Some(reg.context_handle()),
    });

    if let Some(inst_reg) = instance.and_then(|i| dir.instance(i)) {
        if inst_reg.contains(ObjectType::Device, handle) {
            return Verdict::Pass;
        }
    }

    let diag = Diagnostic::error(
        invalid_code,
        ObjectType::Device,
        handle,
        format!("invalid Device object {}", handle),
    )
    .with_note("device is not live in the owning instance");
    let skip = emit(sink, &diag);
    Verdict::Fail { skip }
}
