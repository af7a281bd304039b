//! Queue capability advisories.
//!
//! Queue checks never block a call; a queue submitted work its family cannot
//! execute gets a warning naming the operation, nothing more.

use crate::diagnostics::emit::{emit, DiagnosticSink};
use crate::diagnostics::kind::{Diagnostic, OT201};
use crate::registry::record::{Handle, ObjectType, QueueCapabilities};
use crate::registry::store::HandleRegistry;

use super::cross_context::Verdict;

/// Warn when `queue`'s family lacks a required capability bit.
///
/// Unknown queues and families outside the capability table stay silent;
/// handle validity is the cross-context validator's job. The sink's skip
/// request is deliberately not propagated - this is informational only.
pub(crate) fn validate_queue_capability(
    reg: &HandleRegistry,
    sink: &dyn DiagnosticSink,
    queue: Handle,
    required: QueueCapabilities,
    operation: &str,
) -> Verdict {
    let Some(info) = reg.queue_info(queue) else {
        return Verdict::Pass;
    };
    let Some(caps) = reg.queue_family_caps(info.family_index) else {
        return Verdict::Pass;
    };

    if !caps.contains(required) {
        let diag = Diagnostic::warning(
            OT201,
            ObjectType::Queue,
            queue,
            format!(
                "{} requires {:?} capability but queue family {} does not advertise it",
                operation, required, info.family_index
            ),
        );
        emit(sink, &diag);
    }

    Verdict::Pass
}
