//! Destroy-time consistency checks.
//!
//! Allocator and parent discipline are verified when an object is destroyed
//! or freed. Both checks are non-fatal: the diagnostic fires and the destroy
//! proceeds regardless.

use crate::diagnostics::emit::{emit, DiagnosticSink};
use crate::diagnostics::kind::{Diagnostic, DiagnosticCode};
use crate::registry::record::{Handle, ObjectType};
use crate::registry::store::HandleRegistry;

use super::cross_context::Verdict;

/// Check that allocator discipline matches between create and destroy.
///
/// Only the declaration is verified, not callback compatibility. An absent
/// record is left to the handle validator; this check stays silent.
pub(crate) fn validate_destroy(
    reg: &HandleRegistry,
    sink: &dyn DiagnosticSink,
    ty: ObjectType,
    handle: Handle,
    uses_custom_now: bool,
    created_custom_code: DiagnosticCode,
    created_default_code: DiagnosticCode,
) -> Verdict {
    let Some(record) = reg.get(ty, handle) else {
        return Verdict::Pass;
    };

    let created_custom = record.uses_custom_allocator();
    if created_custom == uses_custom_now {
        return Verdict::Pass;
    }

    let diag = if created_custom {
        Diagnostic::error(
            created_custom_code,
            ty,
            handle,
            format!(
                "{} object {} was created with custom allocator callbacks but is destroyed without them",
                ty, handle
            ),
        )
    } else {
        Diagnostic::error(
            created_default_code,
            ty,
            handle,
            format!(
                "{} object {} was created without custom allocator callbacks but is destroyed with them",
                ty, handle
            ),
        )
    }
    .with_note("allocator discipline must match between create and destroy");

    let skip = emit(sink, &diag);
    Verdict::Fail { skip }
}

/// Check that a destroy call's declared parent matches the recorded one.
pub(crate) fn validate_parent(
    reg: &HandleRegistry,
    sink: &dyn DiagnosticSink,
    ty: ObjectType,
    handle: Handle,
    expected_parent: Option<Handle>,
    mismatch_code: DiagnosticCode,
) -> Verdict {
    let Some(record) = reg.get(ty, handle) else {
        return Verdict::Pass;
    };

    if record.parent == expected_parent {
        return Verdict::Pass;
    }

    let diag = Diagnostic::error(
        mismatch_code,
        ty,
        handle,
        format!(
            "{} object {} is freed from parent {} but was allocated from {}",
            ty,
            handle,
            fmt_parent(expected_parent),
            fmt_parent(record.parent)
        ),
    )
    .with_note("the operation proceeds; downstream behavior is undefined");

    let skip = emit(sink, &diag);
    Verdict::Fail { skip }
}

fn fmt_parent(parent: Option<Handle>) -> String {
    match parent {
        Some(h) => h.to_string(),
        None => "none".to_string(),
    }
}
