//! Integration tests for objtrack.

use std::sync::Arc;
use std::thread;

use objtrack::{
    AllocatorKind, CollectingSink, Handle, ObjectTracker, ObjectType, TrackerConfig, OT001, OT002,
    OT101, OT102, OT301,
};

fn tracker() -> (ObjectTracker, Arc<CollectingSink>) {
    let sink = Arc::new(CollectingSink::new());
    let tracker = ObjectTracker::with_sink(TrackerConfig::quiet(), Box::new(Arc::clone(&sink)));
    (tracker, sink)
}

const INSTANCE: Handle = Handle::new(0x1000);
const D1: Handle = Handle::new(0x2001);
const D2: Handle = Handle::new(0x2002);

fn two_device_setup() -> (ObjectTracker, Arc<CollectingSink>) {
    let (t, sink) = tracker();
    t.register_instance(INSTANCE, AllocatorKind::Default);
    t.register_device(INSTANCE, D1, AllocatorKind::Default);
    t.register_device(INSTANCE, D2, AllocatorKind::Default);
    (t, sink)
}

#[test]
fn test_registration_idempotence_preserves_counts() {
    let (t, _) = two_device_setup();
    let h = Handle::new(1);

    t.register_object(D1, ObjectType::Buffer, h, None, AllocatorKind::Default);
    let first = t.stats();
    t.register_object(D1, ObjectType::Buffer, h, None, AllocatorKind::Default);
    let second = t.stats();

    assert_eq!(first.total_objects, second.total_objects);
    assert_eq!(first.live(ObjectType::Buffer), second.live(ObjectType::Buffer));
}

#[test]
fn test_register_unregister_round_trip() {
    let (t, _) = two_device_setup();
    let baseline = t.stats();

    for ty in ObjectType::ALL {
        if ty.is_context() {
            continue;
        }
        let h = Handle::new(0x4000 + ty.index() as u64);
        t.register_object(D1, ty, h, None, AllocatorKind::Default);
        assert!(t.contains(D1, ty, h));
        t.unregister_object(D1, ty, h);
        assert!(!t.contains(D1, ty, h));
    }

    let after = t.stats();
    assert_eq!(baseline.total_objects, after.total_objects);
    assert_eq!(baseline.objects_by_type, after.objects_by_type);
}

#[test]
fn test_cross_context_distinction() {
    let (t, sink) = two_device_setup();
    let x = Handle::new(0x10);
    t.register_object(D1, ObjectType::Buffer, x, None, AllocatorKind::Default);

    // Registered only in D1: foreign from D2, valid from D1.
    assert!(!t.validate(D2, x, ObjectType::Buffer, false, OT001, OT002).passed());
    assert_eq!(sink.with_code(OT002).len(), 1);

    assert!(t.validate(D1, x, ObjectType::Buffer, false, OT001, OT002).passed());

    // Never registered anywhere: unknown, not foreign.
    let y = Handle::new(0x11);
    assert!(!t.validate(D2, y, ObjectType::Buffer, false, OT001, OT002).passed());
    assert_eq!(sink.with_code(OT001).len(), 1);
}

#[test]
fn test_parent_cascade_removes_all_children() {
    let (t, _) = two_device_setup();
    let pool = Handle::new(0x20);
    t.register_object(D1, ObjectType::CommandPool, pool, None, AllocatorKind::Default);
    for raw in 0x21..0x24 {
        t.register_object(
            D1,
            ObjectType::CommandBuffer,
            Handle::new(raw),
            Some(pool),
            AllocatorKind::Default,
        );
    }

    let before = t.stats();
    let removed = t.free_pool_children(D1, ObjectType::CommandPool, pool);
    let after = t.stats();

    assert_eq!(removed, 3);
    assert_eq!(after.live(ObjectType::CommandBuffer), 0);
    assert_eq!(before.total_objects - after.total_objects, 3);
}

#[test]
fn test_device_teardown_leak_accounting() {
    let (t, sink) = two_device_setup();
    let child = Handle::new(0x30);
    t.register_object(D1, ObjectType::Fence, child, None, AllocatorKind::Default);

    let leaks = t.teardown_device(D1);

    assert_eq!(leaks, 1);
    let reported = sink.with_code(OT301);
    assert_eq!(reported.len(), 1);
    assert_eq!(reported[0].object_type, ObjectType::Fence);
    assert_eq!(reported[0].handle, child);

    // D1's registry is gone; its record left the instance registry too.
    assert!(!t.contains(INSTANCE, ObjectType::Device, D1));
    assert_eq!(t.stats().device_contexts, 1);
}

#[test]
fn test_instance_teardown_recurses_into_devices() {
    let (t, sink) = tracker();
    t.register_instance(INSTANCE, AllocatorKind::Default);
    t.register_device(INSTANCE, D1, AllocatorKind::Default);

    let child = Handle::new(0x30);
    t.register_object(D1, ObjectType::Semaphore, child, None, AllocatorKind::Default);

    let leaks = t.teardown_instance(INSTANCE);

    // The device leaks, then its semaphore.
    assert_eq!(leaks, 2);
    let reported = sink.with_code(OT301);
    assert_eq!(reported[0].object_type, ObjectType::Device);
    assert_eq!(reported[0].handle, D1);
    assert_eq!(reported[1].object_type, ObjectType::Semaphore);

    let stats = t.stats();
    assert_eq!(stats.total_objects, 0);
    assert_eq!(stats.instance_contexts, 0);
    assert_eq!(stats.device_contexts, 0);
}

#[test]
fn test_allocator_mismatch_diagnostics() {
    let (t, sink) = two_device_setup();
    let h = Handle::new(0x40);
    t.register_object(D1, ObjectType::Image, h, None, AllocatorKind::Custom);

    // Created custom, destroyed default: exactly one mismatch.
    t.validate_destroy(D1, ObjectType::Image, h, false, OT101, OT102);
    assert_eq!(sink.with_code(OT101).len(), 1);
    assert_eq!(sink.with_code(OT102).len(), 0);
    t.unregister_object(D1, ObjectType::Image, h);

    // Matching discipline both ways: silence.
    sink.clear();
    t.register_object(D1, ObjectType::Image, h, None, AllocatorKind::Custom);
    t.validate_destroy(D1, ObjectType::Image, h, true, OT101, OT102);
    t.unregister_object(D1, ObjectType::Image, h);
    assert!(sink.diagnostics().is_empty());
}

// The full two-device scenario: a buffer is context-bound, a surface is not,
// and tearing down the instance drains the device that was left behind.
#[test]
fn test_two_device_scenario() {
    let (t, sink) = two_device_setup();

    let x = Handle::new(0x50);
    t.register_object(D1, ObjectType::Buffer, x, None, AllocatorKind::Default);
    assert!(!t.validate(D2, x, ObjectType::Buffer, false, OT001, OT002).passed());
    assert_eq!(sink.with_code(OT002).len(), 1);

    let s = Handle::new(0x51);
    t.register_object(INSTANCE, ObjectType::Surface, s, None, AllocatorKind::Default);
    assert!(t.validate(D1, s, ObjectType::Surface, false, OT001, OT002).passed());
    assert!(t.validate(D2, s, ObjectType::Surface, false, OT001, OT002).passed());
    assert_eq!(sink.with_code(OT002).len(), 1, "surface crossing devices is exempt");

    // D2 goes away cleanly; D1 is abandoned with X still live.
    t.teardown_device(D2);
    sink.clear();
    t.teardown_instance(INSTANCE);

    let leaked = sink.with_code(OT301);
    assert_eq!(leaked.len(), 3);
    assert_eq!(leaked[0].object_type, ObjectType::Device);
    assert_eq!(leaked[0].handle, D1);
    assert_eq!(leaked[1].object_type, ObjectType::Buffer);
    assert_eq!(leaked[1].handle, x);
    assert_eq!(leaked[2].object_type, ObjectType::Surface);
    assert_eq!(leaked[2].handle, s);

    assert_eq!(t.stats().total_objects, 0);
}

#[test]
fn test_derived_images_follow_their_swapchain() {
    let (t, sink) = two_device_setup();
    let swapchain = Handle::new(0x60);
    t.register_object(D1, ObjectType::Swapchain, swapchain, None, AllocatorKind::Default);
    for raw in 0x61..0x64 {
        t.register_derived(D1, swapchain, ObjectType::Image, Handle::new(raw));
    }

    let image = Handle::new(0x61);
    assert!(t.validate(D1, image, ObjectType::Image, false, OT001, OT002).passed());
    // Derived images are context-bound like anything else.
    assert!(!t.validate(D2, image, ObjectType::Image, false, OT001, OT002).passed());
    assert_eq!(sink.with_code(OT002).len(), 1);

    assert_eq!(t.destroy_owner_derived(D1, swapchain), 3);
    assert!(!t.validate(D1, image, ObjectType::Image, false, OT001, OT002).passed());
    assert_eq!(sink.with_code(OT001).len(), 1);
}

#[test]
fn test_concurrent_register_validate() {
    let (t, _) = two_device_setup();
    let t = Arc::new(t);

    let mut handles = Vec::new();
    for worker in 0..4u64 {
        let t = Arc::clone(&t);
        handles.push(thread::spawn(move || {
            let base = 0x10000 * (worker + 1);
            for i in 0..100 {
                let h = Handle::new(base + i);
                t.register_object(D1, ObjectType::Buffer, h, None, AllocatorKind::Default);
                assert!(t.validate(D1, h, ObjectType::Buffer, false, OT001, OT002).passed());
                t.unregister_object(D1, ObjectType::Buffer, h);
            }
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    assert_eq!(t.stats().live(ObjectType::Buffer), 0);
}
