//! Minimal walkthrough: register contexts and objects, validate handles.
//!
//! Run with: cargo run --example hello_tracker

use objtrack::{
    AllocatorKind, Handle, ObjectTracker, ObjectType, TrackerConfig, OT001, OT002,
};

fn main() {
    let tracker = ObjectTracker::new(TrackerConfig::default());

    let instance = Handle::new(0x1000);
    let device = Handle::new(0x2000);
    tracker.register_instance(instance, AllocatorKind::Default);
    tracker.register_device(instance, device, AllocatorKind::Default);

    // The shim records a buffer after its create call succeeded downstream.
    let buffer = Handle::new(0x3000);
    tracker.register_object(device, ObjectType::Buffer, buffer, None, AllocatorKind::Default);

    // A later call validates before forwarding.
    let verdict = tracker.validate(device, buffer, ObjectType::Buffer, false, OT001, OT002);
    println!("live buffer validates: {}", verdict.passed());

    // Destroy it, then watch the same validation fail.
    tracker.unregister_object(device, ObjectType::Buffer, buffer);
    let verdict = tracker.validate(device, buffer, ObjectType::Buffer, false, OT001, OT002);
    println!("destroyed buffer validates: {}", verdict.passed());

    tracker.teardown_device(device);
    tracker.teardown_instance(instance);
}
