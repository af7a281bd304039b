//! The per-context handle registry.
//!
//! One registry exists per instance context and per device context. It owns
//! typed buckets of object records, the derived-object bucket (keyed by the
//! owning object, e.g. a swapchain), queue metadata, and the per-type and
//! total live counters.
//!
//! Counter invariant: outside an in-progress mutation,
//! `total == Σ per-type counts == Σ bucket sizes`.

use std::collections::HashMap;

use super::record::{Handle, ObjectRecord, ObjectType, QueueCapabilities};

/// Whether a registry belongs to an instance or a device context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// Top-level context.
    Instance,
    /// Child of an instance context.
    Device,
}

/// Metadata for a queue retrieved from a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueueInfo {
    /// Queue family the queue was retrieved from.
    pub family_index: u32,
}

/// Per-context store of live object records.
pub struct HandleRegistry {
    /// The context's own dispatchable handle.
    context: Handle,
    kind: ContextKind,
    /// Owning instance context for device registries. Lookup only, never
    /// ownership.
    owner: Option<Handle>,

    /// One bucket per object type, indexed by `ObjectType::index()`.
    buckets: [HashMap<Handle, ObjectRecord>; ObjectType::COUNT],

    /// Live records per type. Kept explicitly so the total is O(1).
    counts: [usize; ObjectType::COUNT],
    total: usize,

    /// Derived objects, keyed by owner handle then object handle. Derived
    /// records do not contribute to the counters above.
    derived: HashMap<Handle, HashMap<Handle, ObjectRecord>>,

    /// Queue handle -> family metadata, populated on queue retrieval.
    queues: HashMap<Handle, QueueInfo>,

    /// Capability set per queue family, indexed by family.
    queue_family_caps: Vec<QueueCapabilities>,
}

impl HandleRegistry {
    fn new(context: Handle, kind: ContextKind, owner: Option<Handle>, capacity: usize) -> Self {
        Self {
            context,
            kind,
            owner,
            buckets: std::array::from_fn(|_| HashMap::with_capacity(capacity)),
            counts: [0; ObjectType::COUNT],
            total: 0,
            derived: HashMap::new(),
            queues: HashMap::new(),
            queue_family_caps: Vec::new(),
        }
    }

    /// Create the registry for an instance context.
    pub fn new_instance(instance: Handle, capacity: usize) -> Self {
        Self::new(instance, ContextKind::Instance, None, capacity)
    }

    /// Create the registry for a device context owned by `instance`.
    pub fn new_device(device: Handle, instance: Handle, capacity: usize) -> Self {
        Self::new(device, ContextKind::Device, Some(instance), capacity)
    }

    /// The context's own handle.
    pub fn context_handle(&self) -> Handle {
        self.context
    }

    /// Instance or device context.
    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    /// Owning instance for device registries.
    pub fn owner(&self) -> Option<Handle> {
        self.owner
    }

    // =========================================================================
    // Typed buckets
    // =========================================================================

    /// Insert a record into its type's bucket.
    ///
    /// Idempotent: if the handle is already present in that bucket the call
    /// is a no-op and `false` is returned, leaving counters untouched.
    pub fn insert(&mut self, record: ObjectRecord) -> bool {
        let idx = record.object_type.index();
        let bucket = &mut self.buckets[idx];
        if bucket.contains_key(&record.handle) {
            return false;
        }
        bucket.insert(record.handle, record);
        self.counts[idx] += 1;
        self.total += 1;
        true
    }

    /// Remove a record, decrementing counters.
    ///
    /// Removal of an absent handle is a no-op returning `None`. This is the
    /// public destroy-recording path; the teardown path wraps it with a
    /// presence assertion (see [`HandleRegistry::force_remove`]).
    pub fn remove(&mut self, ty: ObjectType, handle: Handle) -> Option<ObjectRecord> {
        let idx = ty.index();
        let record = self.buckets[idx].remove(&handle)?;
        self.counts[idx] -= 1;
        self.total -= 1;
        Some(record)
    }

    /// Remove a record that the caller knows is present.
    ///
    /// Used by teardown after enumerating live handles; a miss here means the
    /// tracker's own bookkeeping broke.
    pub fn force_remove(&mut self, ty: ObjectType, handle: Handle) -> Option<ObjectRecord> {
        let record = self.remove(ty, handle);
        debug_assert!(
            record.is_some(),
            "force_remove of unknown {ty} handle {handle}"
        );
        record
    }

    /// Presence test within this registry only. No cross-context search.
    pub fn contains(&self, ty: ObjectType, handle: Handle) -> bool {
        self.buckets[ty.index()].contains_key(&handle)
    }

    /// Look up a record by type and handle.
    pub fn get(&self, ty: ObjectType, handle: Handle) -> Option<&ObjectRecord> {
        self.buckets[ty.index()].get(&handle)
    }

    /// Live records of one type.
    pub fn live_count(&self, ty: ObjectType) -> usize {
        self.counts[ty.index()]
    }

    /// Live records across all buckets.
    pub fn total_live(&self) -> usize {
        self.total
    }

    /// Snapshot of the handles currently in one bucket.
    ///
    /// Mutation during a cascade happens against this snapshot, never against
    /// a live bucket iterator.
    pub fn handles_of_type(&self, ty: ObjectType) -> Vec<Handle> {
        self.buckets[ty.index()].keys().copied().collect()
    }

    /// Handles in `ty`'s bucket whose parent is `parent`.
    pub fn children_of(&self, ty: ObjectType, parent: Handle) -> Vec<Handle> {
        self.buckets[ty.index()]
            .values()
            .filter(|r| r.parent == Some(parent))
            .map(|r| r.handle)
            .collect()
    }

    /// Verify the counter invariant. Cheap enough to assert in tests.
    pub fn counts_consistent(&self) -> bool {
        let per_type: usize = self.counts.iter().sum();
        let buckets: usize = self.buckets.iter().map(HashMap::len).sum();
        self.total == per_type && self.total == buckets
    }

    // =========================================================================
    // Derived objects
    // =========================================================================

    /// Insert a derived-object record under its owner.
    ///
    /// Idempotent like [`HandleRegistry::insert`].
    pub fn insert_derived(&mut self, owner: Handle, record: ObjectRecord) -> bool {
        let per_owner = self.derived.entry(owner).or_default();
        if per_owner.contains_key(&record.handle) {
            return false;
        }
        per_owner.insert(record.handle, record);
        true
    }

    /// Remove one derived record. Absent handles are a no-op.
    pub fn remove_derived(&mut self, owner: Handle, handle: Handle) -> Option<ObjectRecord> {
        let per_owner = self.derived.get_mut(&owner)?;
        let record = per_owner.remove(&handle);
        if per_owner.is_empty() {
            self.derived.remove(&owner);
        }
        record
    }

    /// Search every owner's derived records for a handle.
    pub fn derived_contains(&self, handle: Handle) -> bool {
        self.derived.values().any(|m| m.contains_key(&handle))
    }

    /// Remove every derived record belonging to one owner. Returns how many
    /// records were dropped.
    pub fn remove_derived_owner(&mut self, owner: Handle) -> usize {
        self.derived.remove(&owner).map_or(0, |m| m.len())
    }

    /// Drop the whole derived bucket. Returns how many records were dropped.
    pub fn clear_derived(&mut self) -> usize {
        let n = self.derived_total();
        self.derived.clear();
        n
    }

    /// Derived records across all owners.
    pub fn derived_total(&self) -> usize {
        self.derived.values().map(HashMap::len).sum()
    }

    // =========================================================================
    // Queues
    // =========================================================================

    /// Record or update queue family metadata.
    ///
    /// Retrieving the same queue again updates in place rather than
    /// duplicating.
    pub fn associate_queue(&mut self, queue: Handle, family_index: u32) {
        self.queues.insert(queue, QueueInfo { family_index });
    }

    /// Metadata for a tracked queue.
    pub fn queue_info(&self, queue: Handle) -> Option<QueueInfo> {
        self.queues.get(&queue).copied()
    }

    /// Number of tracked queues.
    pub fn queue_count(&self) -> usize {
        self.queues.len()
    }

    /// Install the per-family capability table.
    pub fn set_queue_family_caps(&mut self, caps: Vec<QueueCapabilities>) {
        self.queue_family_caps = caps;
    }

    /// Capability set of one queue family.
    pub fn queue_family_caps(&self, family_index: u32) -> Option<QueueCapabilities> {
        self.queue_family_caps.get(family_index as usize).copied()
    }

    /// Drop all queue metadata. Queues die with their device context.
    pub fn clear_queue_metadata(&mut self) {
        self.queues.clear();
    }
}
