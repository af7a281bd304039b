//! Leak reporting: abandon a device with live objects and tear the
//! instance down.
//!
//! Run with: cargo run --example teardown_leaks

use objtrack::{AllocatorKind, Handle, ObjectTracker, ObjectType, TrackerConfig};

fn main() {
    let tracker = ObjectTracker::new(TrackerConfig::quiet());

    let instance = Handle::new(0x1000);
    let device = Handle::new(0x2000);
    tracker.register_instance(instance, AllocatorKind::Default);
    tracker.register_device(instance, device, AllocatorKind::Default);

    // A command pool with command buffers, plus a stray fence.
    let pool = Handle::new(0x3000);
    tracker.register_object(device, ObjectType::CommandPool, pool, None, AllocatorKind::Default);
    for raw in 0x3001..0x3004 {
        tracker.register_object(
            device,
            ObjectType::CommandBuffer,
            Handle::new(raw),
            Some(pool),
            AllocatorKind::Default,
        );
    }
    tracker.register_object(device, ObjectType::Fence, Handle::new(0x4000), None, AllocatorKind::Default);

    // The application "forgets" all of it. The pool's command buffers go
    // with the pool cascade; the pool and the fence are reported as leaks,
    // then the abandoned device itself.
    let leaks = tracker.teardown_instance(instance);
    println!("leaks reported at teardown: {}", leaks);
}
