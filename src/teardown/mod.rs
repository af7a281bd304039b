//! Cascade destruction and context teardown.
//!
//! Pool resets and destroys take their children with them; context teardown
//! drains whatever the application left behind, reporting one leak per
//! surviving record. Ordering is mandatory: a context's registry is fully
//! drained before its entry leaves the directory, and child devices are
//! fully torn down before their owning instance's entry goes away.

use crate::diagnostics::emit::{emit, internal_error, DiagnosticSink};
use crate::diagnostics::kind::{Diagnostic, OT301};
use crate::registry::directory::ContextDirectory;
use crate::registry::record::{Handle, ObjectType};
use crate::registry::store::HandleRegistry;

/// Unregister every pooled child of `pool`. Returns how many were removed.
///
/// Mutation runs against a handle snapshot, never a live bucket iterator.
pub(crate) fn free_pool_children(
    reg: &mut HandleRegistry,
    pool_ty: ObjectType,
    pool: Handle,
) -> usize {
    let Some(child_ty) = pool_ty.pooled_child() else {
        return 0;
    };
    let children = reg.children_of(child_ty, pool);
    for child in &children {
        reg.remove(child_ty, *child);
    }
    children.len()
}

/// Report one leak diagnostic per record still present, then force-remove it.
///
/// `keep` names the context's own record, which is being destroyed
/// legitimately and must not be reported.
fn report_and_clear_leaks(
    reg: &mut HandleRegistry,
    sink: &dyn DiagnosticSink,
    keep: Option<(ObjectType, Handle)>,
) -> usize {
    let context = reg.context_handle();
    let mut leaks = 0;

    for ty in ObjectType::ALL {
        let mut handles = reg.handles_of_type(ty);
        handles.sort();
        for handle in handles {
            if keep == Some((ty, handle)) {
                continue;
            }
            let Some(record) = reg.force_remove(ty, handle) else {
                continue;
            };

            #[allow(unused_mut)]
            let mut message = format!(
                "{} object {} has not been destroyed (context {} teardown)",
                ty, handle, context
            );
            #[cfg(feature = "debug")]
            {
                message.push_str("\ncreated at:\n");
                message.push_str(record.created_at.frames());
            }
            #[cfg(not(feature = "debug"))]
            let _ = record;

            let diag = Diagnostic::error(OT301, ty, handle, message);
            emit(sink, &diag);
            leaks += 1;
        }
    }

    leaks
}

/// Tear down a device context, reporting leaks for surviving records.
///
/// Sequence: drop queues silently, cascade every pool's children, leak-report
/// and force-remove the rest, then remove the device's record from its owning
/// instance registry, then drop the directory entry. Returns the number of
/// leaks reported.
pub(crate) fn teardown_device(
    dir: &mut ContextDirectory,
    sink: &dyn DiagnosticSink,
    device: Handle,
) -> usize {
    let owner;
    let mut leaks = 0;
    {
        let Some(reg) = dir.device_mut(device) else {
            internal_error(
                sink,
                ObjectType::Device,
                device,
                format!("teardown of untracked device {}", device),
            );
            return 0;
        };
        owner = reg.owner();

        // Queues are retrieved, never destroyed by the application; they go
        // quietly with their device.
        for queue in reg.handles_of_type(ObjectType::Queue) {
            reg.force_remove(ObjectType::Queue, queue);
        }
        reg.clear_queue_metadata();

        // Pool children first, so pool contents are not double-reported.
        for pool_ty in [ObjectType::CommandPool, ObjectType::DescriptorPool] {
            for pool in reg.handles_of_type(pool_ty) {
                free_pool_children(reg, pool_ty, pool);
            }
        }

        leaks += report_and_clear_leaks(reg, sink, None);
        reg.clear_derived();
    }

    // The device's own record lives in the owning instance registry; it is
    // removed only once the device registry above is fully drained.
    if let Some(instance) = owner {
        if let Some(inst_reg) = dir.instance_mut(instance) {
            inst_reg.remove(ObjectType::Device, device);
        }
    }

    dir.remove_device(device);
    leaks
}

/// Tear down an instance context and, recursively, every child device still
/// alive. Returns the number of leaks reported.
pub(crate) fn teardown_instance(
    dir: &mut ContextDirectory,
    sink: &dyn DiagnosticSink,
    instance: Handle,
) -> usize {
    if dir.instance(instance).is_none() {
        internal_error(
            sink,
            ObjectType::Instance,
            instance,
            format!("teardown of untracked instance {}", instance),
        );
        return 0;
    }

    let mut leaks = 0;

    // A device still alive here is itself a leak; report it, then drain it.
    let mut children = dir.devices_of(instance);
    children.sort();
    for device in children {
        let diag = Diagnostic::error(
            OT301,
            ObjectType::Device,
            device,
            format!(
                "Device object {} has not been destroyed (context {} teardown)",
                device, instance
            ),
        );
        emit(sink, &diag);
        leaks += 1;
        leaks += teardown_device(dir, sink, device);
    }

    if let Some(reg) = dir.instance_mut(instance) {
        leaks += report_and_clear_leaks(reg, sink, Some((ObjectType::Instance, instance)));
        reg.clear_derived();
        // The instance's own record, removed last and without a leak report.
        reg.remove(ObjectType::Instance, instance);
    }

    dir.remove_instance(instance);
    leaks
}
