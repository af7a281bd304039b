//! Tracker statistics.

use crate::registry::record::ObjectType;

/// Aggregated live-object statistics across every tracked context.
#[derive(Debug, Clone, Default)]
pub struct TrackerStats {
    /// Live records across all contexts and types.
    pub total_objects: usize,

    /// Live records per object type, indexed by `ObjectType::index()`.
    pub objects_by_type: [usize; ObjectType::COUNT],

    /// Derived (retrieved-not-allocated) records across all contexts.
    pub derived_objects: usize,

    /// Tracked queues across all device contexts.
    pub tracked_queues: usize,

    /// Live instance contexts.
    pub instance_contexts: usize,

    /// Live device contexts.
    pub device_contexts: usize,
}

impl TrackerStats {
    /// Live records of one type.
    pub fn live(&self, ty: ObjectType) -> usize {
        self.objects_by_type[ty.index()]
    }
}
