//! The object tracker: the public surface the interception shim calls.
//!
//! One coarse lock guards the context directory and every registry behind
//! it. Each operation acquires and releases the lock internally, so the
//! shim's two-phase protocol holds by construction:
//!
//! 1. pre-call validation (`validate*`) takes and drops the lock
//! 2. the downstream driver call runs with no tracker lock held
//! 3. post-call recording (`register*`/`unregister*`/teardown) takes and
//!    drops the lock again
//!
//! Nothing is atomic across phase two: another thread may mutate the
//! registries while the downstream call executes. That window is an accepted
//! limitation of the layering, not a bug to fix here.

use crate::diagnostics::emit::{emit, internal_error, DiagnosticSink, StderrSink};
use crate::diagnostics::kind::{Diagnostic, DiagnosticCode, OT000, OT010};
use crate::registry::directory::ContextDirectory;
use crate::registry::record::{
    AllocatorKind, Handle, ObjectRecord, ObjectType, QueueCapabilities, RecordFlags,
};
use crate::registry::store::HandleRegistry;
use crate::sync::mutex::Mutex;
use crate::teardown;
use crate::validate::cross_context::{validate_handle, Verdict};
use crate::validate::destroy::{validate_destroy, validate_parent};
use crate::validate::queues::validate_queue_capability;

use super::config::TrackerConfig;
use super::stats::TrackerStats;

/// Process-wide handle registry and cross-context validator.
///
/// The tracker is passive: no threads, timers, or I/O of its own. Every
/// operation is synchronous, in-memory, and at worst linear in map size or
/// live-context count.
pub struct ObjectTracker {
    directory: Mutex<ContextDirectory>,
    sink: Box<dyn DiagnosticSink>,
    config: TrackerConfig,
}

impl ObjectTracker {
    /// Create a tracker reporting through the default stderr sink.
    pub fn new(config: TrackerConfig) -> Self {
        Self::with_sink(config, Box::new(StderrSink::new()))
    }

    /// Create a tracker reporting through a custom sink.
    pub fn with_sink(config: TrackerConfig, sink: Box<dyn DiagnosticSink>) -> Self {
        Self {
            directory: Mutex::new(ContextDirectory::new()),
            sink,
            config,
        }
    }

    // =========================================================================
    // Context lifecycle
    // =========================================================================

    /// Record a freshly created instance context.
    ///
    /// The instance's own record lands in its own registry; re-registering a
    /// live instance is a no-op.
    pub fn register_instance(&self, instance: Handle, allocator: AllocatorKind) {
        let mut dir = self.directory.lock();
        if dir.instance(instance).is_some() {
            return;
        }
        let mut reg =
            HandleRegistry::new_instance(instance, self.config.expected_objects_per_type);
        reg.insert(ObjectRecord::new(
            ObjectType::Instance,
            instance,
            None,
            allocator,
        ));
        dir.add_instance(reg);
        drop(dir);
        self.report_create(ObjectType::Instance, instance);
    }

    /// Record a freshly created device context under `instance`.
    ///
    /// The device's record lands in the owning instance registry; the device
    /// gets its own (empty) registry in the directory.
    pub fn register_device(&self, instance: Handle, device: Handle, allocator: AllocatorKind) {
        let mut dir = self.directory.lock();
        if dir.device(device).is_some() {
            return;
        }
        let Some(inst_reg) = dir.instance_mut(instance) else {
            internal_error(
                self.sink.as_ref(),
                ObjectType::Device,
                device,
                format!("device {} created under untracked instance {}", device, instance),
            );
            return;
        };
        inst_reg.insert(ObjectRecord::new(
            ObjectType::Device,
            device,
            Some(instance),
            allocator,
        ));
        dir.add_device(HandleRegistry::new_device(
            device,
            instance,
            self.config.expected_objects_per_type,
        ));
        drop(dir);
        self.report_create(ObjectType::Device, device);
    }

    /// Tear down a device context, reporting a leak for every record the
    /// application left behind. Returns the number of leaks reported.
    pub fn teardown_device(&self, device: Handle) -> usize {
        let mut dir = self.directory.lock();
        teardown::teardown_device(&mut dir, self.sink.as_ref(), device)
    }

    /// Tear down an instance context and, recursively, every child device
    /// still alive. Returns the number of leaks reported.
    pub fn teardown_instance(&self, instance: Handle) -> usize {
        let mut dir = self.directory.lock();
        teardown::teardown_instance(&mut dir, self.sink.as_ref(), instance)
    }

    // =========================================================================
    // Post-call recording
    // =========================================================================

    /// Record a successfully created object.
    ///
    /// Idempotent: re-registering a live `(type, handle)` pair leaves the
    /// registry untouched.
    pub fn register_object(
        &self,
        context: Handle,
        ty: ObjectType,
        handle: Handle,
        parent: Option<Handle>,
        allocator: AllocatorKind,
    ) {
        self.register_object_with_flags(context, ty, handle, parent, allocator, RecordFlags::empty());
    }

    /// Record a successfully created object with extra status bits (e.g.
    /// secondary-level command buffers).
    pub fn register_object_with_flags(
        &self,
        context: Handle,
        ty: ObjectType,
        handle: Handle,
        parent: Option<Handle>,
        allocator: AllocatorKind,
        flags: RecordFlags,
    ) {
        let mut dir = self.directory.lock();
        let Some(reg) = dir.resolve_mut(context) else {
            internal_error(
                self.sink.as_ref(),
                ty,
                handle,
                format!("register of {} object {} under untracked context {}", ty, handle, context),
            );
            return;
        };
        let inserted = reg.insert(ObjectRecord::new(ty, handle, parent, allocator).with_flags(flags));
        drop(dir);
        if inserted {
            self.report_create(ty, handle);
        }
    }

    /// Record an explicit destroy/free. Removing an absent handle is a no-op.
    pub fn unregister_object(&self, context: Handle, ty: ObjectType, handle: Handle) {
        let mut dir = self.directory.lock();
        let Some(reg) = dir.resolve_mut(context) else {
            return;
        };
        let removed = reg.remove(ty, handle).is_some();
        drop(dir);
        if removed {
            self.report_destroy(ty, handle);
        }
    }

    /// Presence test within the addressed context only.
    pub fn contains(&self, context: Handle, ty: ObjectType, handle: Handle) -> bool {
        let dir = self.directory.lock();
        dir.resolve(context)
            .map_or(false, |reg| reg.contains(ty, handle))
    }

    // =========================================================================
    // Derived objects
    // =========================================================================

    /// Record an object retrieved rather than allocated (e.g. a presentable
    /// image), keyed under its owner.
    pub fn register_derived(&self, context: Handle, owner: Handle, ty: ObjectType, handle: Handle) {
        let mut dir = self.directory.lock();
        let Some(reg) = dir.resolve_mut(context) else {
            internal_error(
                self.sink.as_ref(),
                ty,
                handle,
                format!("register of derived {} object {} under untracked context {}", ty, handle, context),
            );
            return;
        };
        let record = ObjectRecord::new(ty, handle, Some(owner), AllocatorKind::Default)
            .with_flags(RecordFlags::DERIVED);
        let inserted = reg.insert_derived(owner, record);
        drop(dir);
        if inserted {
            self.report_create(ty, handle);
        }
    }

    /// Presence test for the addressed context's derived bucket, across all
    /// owners.
    pub fn contains_derived(&self, context: Handle, handle: Handle) -> bool {
        let dir = self.directory.lock();
        dir.resolve(context)
            .map_or(false, |reg| reg.derived_contains(handle))
    }

    /// Remove one derived record. Absent handles are a no-op.
    pub fn unregister_derived(&self, context: Handle, owner: Handle, handle: Handle) {
        let mut dir = self.directory.lock();
        if let Some(reg) = dir.resolve_mut(context) {
            reg.remove_derived(owner, handle);
        }
    }

    /// Remove every derived record belonging to `owner` (e.g. the swapchain
    /// being destroyed). Returns how many records were dropped.
    pub fn destroy_owner_derived(&self, context: Handle, owner: Handle) -> usize {
        let mut dir = self.directory.lock();
        dir.resolve_mut(context)
            .map_or(0, |reg| reg.remove_derived_owner(owner))
    }

    // =========================================================================
    // Pre-call validation
    // =========================================================================

    /// Resolve whether a handle is valid, foreign, or unknown for the
    /// context the call was addressed to.
    #[allow(clippy::too_many_arguments)]
    pub fn validate(
        &self,
        context: Handle,
        handle: Handle,
        expected: ObjectType,
        null_allowed: bool,
        invalid_code: DiagnosticCode,
        foreign_code: DiagnosticCode,
    ) -> Verdict {
        let dir = self.directory.lock();
        validate_handle(
            &dir,
            self.sink.as_ref(),
            context,
            handle,
            expected,
            null_allowed,
            invalid_code,
            foreign_code,
        )
    }

    /// Check allocator discipline at destroy time. Non-fatal; the destroy
    /// proceeds whatever the verdict.
    #[allow(clippy::too_many_arguments)]
    pub fn validate_destroy(
        &self,
        context: Handle,
        ty: ObjectType,
        handle: Handle,
        uses_custom_now: bool,
        created_custom_code: DiagnosticCode,
        created_default_code: DiagnosticCode,
    ) -> Verdict {
        let dir = self.directory.lock();
        let Some(reg) = dir.resolve(context) else {
            return Verdict::Pass;
        };
        validate_destroy(
            reg,
            self.sink.as_ref(),
            ty,
            handle,
            uses_custom_now,
            created_custom_code,
            created_default_code,
        )
    }

    /// Check that a free call's declared parent matches the recorded one.
    /// Non-fatal.
    pub fn validate_parent(
        &self,
        context: Handle,
        ty: ObjectType,
        handle: Handle,
        expected_parent: Option<Handle>,
        mismatch_code: DiagnosticCode,
    ) -> Verdict {
        let dir = self.directory.lock();
        let Some(reg) = dir.resolve(context) else {
            return Verdict::Pass;
        };
        validate_parent(
            reg,
            self.sink.as_ref(),
            ty,
            handle,
            expected_parent,
            mismatch_code,
        )
    }

    // =========================================================================
    // Pools
    // =========================================================================

    /// Cascade a pool reset/destroy: unregister every record whose parent is
    /// `pool`. Returns how many children were removed.
    pub fn free_pool_children(&self, context: Handle, pool_ty: ObjectType, pool: Handle) -> usize {
        let mut dir = self.directory.lock();
        dir.resolve_mut(context)
            .map_or(0, |reg| teardown::free_pool_children(reg, pool_ty, pool))
    }

    // =========================================================================
    // Queues
    // =========================================================================

    /// Record a queue retrieved from `device`. Idempotent: retrieving the
    /// same queue again updates the family metadata in place.
    pub fn associate_queue(&self, device: Handle, queue: Handle, family_index: u32) {
        let mut dir = self.directory.lock();
        let Some(reg) = dir.device_mut(device) else {
            internal_error(
                self.sink.as_ref(),
                ObjectType::Queue,
                queue,
                format!("queue {} retrieved from untracked device {}", queue, device),
            );
            return;
        };
        let first_retrieval = reg.insert(ObjectRecord::new(
            ObjectType::Queue,
            queue,
            Some(device),
            AllocatorKind::Default,
        ));
        reg.associate_queue(queue, family_index);
        drop(dir);
        if first_retrieval {
            self.report_create(ObjectType::Queue, queue);
        }
    }

    /// Install the per-family capability table for `device`, as reported by
    /// the physical-device query.
    pub fn set_queue_family_capabilities(&self, device: Handle, caps: Vec<QueueCapabilities>) {
        let mut dir = self.directory.lock();
        if let Some(reg) = dir.device_mut(device) {
            reg.set_queue_family_caps(caps);
        }
    }

    /// Warn when a queue's family lacks a capability the operation wants.
    /// Advisory only; never blocks.
    pub fn validate_queue_capability(
        &self,
        device: Handle,
        queue: Handle,
        required: QueueCapabilities,
        operation: &str,
    ) -> Verdict {
        let dir = self.directory.lock();
        let Some(reg) = dir.device(device) else {
            return Verdict::Pass;
        };
        validate_queue_capability(reg, self.sink.as_ref(), queue, required, operation)
    }

    // =========================================================================
    // Introspection
    // =========================================================================

    /// Snapshot live-object statistics across every tracked context.
    pub fn stats(&self) -> TrackerStats {
        let dir = self.directory.lock();
        let mut stats = TrackerStats {
            instance_contexts: dir.instance_count(),
            device_contexts: dir.device_count(),
            ..TrackerStats::default()
        };
        for reg in dir.registries() {
            stats.total_objects += reg.total_live();
            for ty in ObjectType::ALL {
                stats.objects_by_type[ty.index()] += reg.live_count(ty);
            }
            stats.derived_objects += reg.derived_total();
            stats.tracked_queues += reg.queue_count();
        }
        stats
    }

    // =========================================================================
    // Lifecycle reporting
    // =========================================================================

    fn report_create(&self, ty: ObjectType, handle: Handle) {
        if !self.config.report_creates {
            return;
        }
        let diag = Diagnostic::info(
            OT000,
            ty,
            handle,
            format!("created {} object {}", ty, handle),
        );
        emit(self.sink.as_ref(), &diag);
    }

    fn report_destroy(&self, ty: ObjectType, handle: Handle) {
        if !self.config.report_destroys {
            return;
        }
        let diag = Diagnostic::info(
            OT010,
            ty,
            handle,
            format!("destroyed {} object {}", ty, handle),
        );
        emit(self.sink.as_ref(), &diag);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::emit::CollectingSink;
    use crate::diagnostics::kind::{OT001, OT002, OT101, OT102, OT103};
    use std::sync::Arc;

    fn tracker() -> (ObjectTracker, Arc<CollectingSink>) {
        let sink = Arc::new(CollectingSink::new());
        let tracker =
            ObjectTracker::with_sink(TrackerConfig::quiet(), Box::new(Arc::clone(&sink)));
        (tracker, sink)
    }

    const INSTANCE: Handle = Handle::new(0x100);
    const DEVICE: Handle = Handle::new(0x200);

    fn tracker_with_device() -> (ObjectTracker, Arc<CollectingSink>) {
        let (t, sink) = tracker();
        t.register_instance(INSTANCE, AllocatorKind::Default);
        t.register_device(INSTANCE, DEVICE, AllocatorKind::Default);
        (t, sink)
    }

    #[test]
    fn test_register_is_idempotent() {
        let (t, _) = tracker_with_device();
        let h = Handle::new(1);

        t.register_object(DEVICE, ObjectType::Buffer, h, None, AllocatorKind::Default);
        let before = t.stats();
        t.register_object(DEVICE, ObjectType::Buffer, h, None, AllocatorKind::Default);
        let after = t.stats();

        assert_eq!(before.total_objects, after.total_objects);
        assert_eq!(before.live(ObjectType::Buffer), 1);
        assert_eq!(after.live(ObjectType::Buffer), 1);
    }

    #[test]
    fn test_register_unregister_round_trip() {
        let (t, _) = tracker_with_device();
        let h = Handle::new(1);
        let baseline = t.stats();

        t.register_object(DEVICE, ObjectType::Sampler, h, None, AllocatorKind::Default);
        assert!(t.contains(DEVICE, ObjectType::Sampler, h));

        t.unregister_object(DEVICE, ObjectType::Sampler, h);
        assert!(!t.contains(DEVICE, ObjectType::Sampler, h));
        assert_eq!(t.stats().total_objects, baseline.total_objects);
        assert_eq!(t.stats().live(ObjectType::Sampler), 0);
    }

    #[test]
    fn test_unregister_absent_is_noop() {
        let (t, sink) = tracker_with_device();
        t.unregister_object(DEVICE, ObjectType::Fence, Handle::new(99));
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn test_validate_local_hit() {
        let (t, sink) = tracker_with_device();
        let h = Handle::new(1);
        t.register_object(DEVICE, ObjectType::Buffer, h, None, AllocatorKind::Default);

        let v = t.validate(DEVICE, h, ObjectType::Buffer, false, OT001, OT002);
        assert!(v.passed());
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn test_validate_null_allowed() {
        let (t, sink) = tracker_with_device();
        let v = t.validate(DEVICE, Handle::NULL, ObjectType::Buffer, true, OT001, OT002);
        assert!(v.passed());

        let v = t.validate(DEVICE, Handle::NULL, ObjectType::Buffer, false, OT001, OT002);
        assert!(!v.passed());
        assert_eq!(sink.with_code(OT001).len(), 1);
    }

    #[test]
    fn test_validate_unknown_handle() {
        let (t, sink) = tracker_with_device();
        let v = t.validate(DEVICE, Handle::new(77), ObjectType::Buffer, false, OT001, OT002);
        assert!(!v.passed());
        assert_eq!(sink.with_code(OT001).len(), 1);
        assert_eq!(sink.with_code(OT002).len(), 0);
    }

    #[test]
    fn test_validate_foreign_handle() {
        let (t, sink) = tracker_with_device();
        let d2 = Handle::new(0x201);
        t.register_device(INSTANCE, d2, AllocatorKind::Default);

        let h = Handle::new(1);
        t.register_object(DEVICE, ObjectType::Buffer, h, None, AllocatorKind::Default);

        let v = t.validate(d2, h, ObjectType::Buffer, false, OT001, OT002);
        assert!(!v.passed());
        assert_eq!(sink.with_code(OT002).len(), 1);

        // Same handle through the owning context passes.
        sink.clear();
        let v = t.validate(DEVICE, h, ObjectType::Buffer, false, OT001, OT002);
        assert!(v.passed());
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn test_validate_device_goes_through_instance() {
        let (t, sink) = tracker_with_device();

        let v = t.validate(DEVICE, DEVICE, ObjectType::Device, false, OT001, OT002);
        assert!(v.passed());

        let v = t.validate(DEVICE, Handle::new(0x999), ObjectType::Device, false, OT001, OT002);
        assert!(!v.passed());
        assert_eq!(sink.with_code(OT001).len(), 1);
    }

    #[test]
    fn test_surface_is_exempt_from_foreign() {
        let (t, sink) = tracker_with_device();
        let d2 = Handle::new(0x201);
        t.register_device(INSTANCE, d2, AllocatorKind::Default);

        let surface = Handle::new(0x50);
        t.register_object(INSTANCE, ObjectType::Surface, surface, None, AllocatorKind::Default);

        for device in [DEVICE, d2] {
            let v = t.validate(device, surface, ObjectType::Surface, false, OT001, OT002);
            assert!(v.passed(), "surface should validate under device {device}");
        }
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn test_derived_image_validates_locally() {
        let (t, sink) = tracker_with_device();
        let swapchain = Handle::new(0x60);
        let image = Handle::new(0x61);

        t.register_object(DEVICE, ObjectType::Swapchain, swapchain, None, AllocatorKind::Default);
        t.register_derived(DEVICE, swapchain, ObjectType::Image, image);

        let v = t.validate(DEVICE, image, ObjectType::Image, false, OT001, OT002);
        assert!(v.passed());
        assert!(t.contains_derived(DEVICE, image));
        assert!(sink.diagnostics().is_empty());

        assert_eq!(t.destroy_owner_derived(DEVICE, swapchain), 1);
        assert!(!t.contains_derived(DEVICE, image));
        let v = t.validate(DEVICE, image, ObjectType::Image, false, OT001, OT002);
        assert!(!v.passed());
        assert_eq!(sink.with_code(OT001).len(), 1);
    }

    #[test]
    fn test_allocator_mismatch_both_directions() {
        let (t, sink) = tracker_with_device();
        let custom = Handle::new(1);
        let default = Handle::new(2);
        t.register_object(DEVICE, ObjectType::Buffer, custom, None, AllocatorKind::Custom);
        t.register_object(DEVICE, ObjectType::Buffer, default, None, AllocatorKind::Default);

        let v = t.validate_destroy(DEVICE, ObjectType::Buffer, custom, false, OT101, OT102);
        assert!(!v.passed());
        assert_eq!(sink.with_code(OT101).len(), 1);

        let v = t.validate_destroy(DEVICE, ObjectType::Buffer, default, true, OT101, OT102);
        assert!(!v.passed());
        assert_eq!(sink.with_code(OT102).len(), 1);
    }

    #[test]
    fn test_allocator_match_is_silent() {
        let (t, sink) = tracker_with_device();
        let h = Handle::new(1);
        t.register_object(DEVICE, ObjectType::Image, h, None, AllocatorKind::Custom);

        let v = t.validate_destroy(DEVICE, ObjectType::Image, h, true, OT101, OT102);
        assert!(v.passed());
        assert!(sink.diagnostics().is_empty());
    }

    #[test]
    fn test_parent_mismatch() {
        let (t, sink) = tracker_with_device();
        let pool = Handle::new(0x10);
        let cb = Handle::new(0x20);
        t.register_object(DEVICE, ObjectType::CommandPool, pool, None, AllocatorKind::Default);
        t.register_object(DEVICE, ObjectType::CommandBuffer, cb, Some(pool), AllocatorKind::Default);

        let v = t.validate_parent(DEVICE, ObjectType::CommandBuffer, cb, Some(pool), OT103);
        assert!(v.passed());

        let v = t.validate_parent(DEVICE, ObjectType::CommandBuffer, cb, Some(Handle::new(0x11)), OT103);
        assert!(!v.passed());
        assert_eq!(sink.with_code(OT103).len(), 1);
    }

    #[test]
    fn test_pool_cascade_through_public_api() {
        let (t, _) = tracker_with_device();
        let pool = Handle::new(0x10);
        t.register_object(DEVICE, ObjectType::DescriptorPool, pool, None, AllocatorKind::Default);
        for raw in 0x20..0x23 {
            t.register_object(
                DEVICE,
                ObjectType::DescriptorSet,
                Handle::new(raw),
                Some(pool),
                AllocatorKind::Default,
            );
        }

        let before = t.stats().live(ObjectType::DescriptorSet);
        assert_eq!(t.free_pool_children(DEVICE, ObjectType::DescriptorPool, pool), 3);
        assert_eq!(t.stats().live(ObjectType::DescriptorSet), before - 3);
    }

    #[test]
    fn test_queue_capability_advisory() {
        let (t, sink) = tracker_with_device();
        let queue = Handle::new(0x30);
        t.set_queue_family_capabilities(
            DEVICE,
            vec![QueueCapabilities::TRANSFER, QueueCapabilities::GRAPHICS],
        );
        t.associate_queue(DEVICE, queue, 0);

        let v = t.validate_queue_capability(DEVICE, queue, QueueCapabilities::TRANSFER, "copy");
        assert!(v.passed());
        assert!(sink.diagnostics().is_empty());

        let v = t.validate_queue_capability(DEVICE, queue, QueueCapabilities::GRAPHICS, "draw");
        assert!(v.passed(), "capability check is advisory only");
        assert_eq!(sink.with_code(crate::diagnostics::kind::OT201).len(), 1);
    }

    #[test]
    fn test_associate_queue_is_idempotent() {
        let (t, _) = tracker_with_device();
        let queue = Handle::new(0x30);
        t.associate_queue(DEVICE, queue, 0);
        t.associate_queue(DEVICE, queue, 1);

        let stats = t.stats();
        assert_eq!(stats.live(ObjectType::Queue), 1);
        assert_eq!(stats.tracked_queues, 1);
    }

    #[test]
    fn test_stats_counts_contexts() {
        let (t, _) = tracker_with_device();
        let stats = t.stats();
        assert_eq!(stats.instance_contexts, 1);
        assert_eq!(stats.device_contexts, 1);
        // Instance + device records.
        assert_eq!(stats.total_objects, 2);
    }
}
