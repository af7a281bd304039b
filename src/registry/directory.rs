//! The process-wide context directory.
//!
//! Maps each live context handle to its registry: one map for device
//! contexts, one for instance contexts. Entries are added on context
//! creation and removed on teardown, always under the tracker lock.

use std::collections::HashMap;

use super::record::Handle;
use super::store::HandleRegistry;

/// Directory of every live context's registry.
#[derive(Default)]
pub struct ContextDirectory {
    instances: HashMap<Handle, HandleRegistry>,
    devices: HashMap<Handle, HandleRegistry>,
}

impl ContextDirectory {
    /// Create an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an instance context's registry.
    pub fn add_instance(&mut self, registry: HandleRegistry) {
        self.instances.insert(registry.context_handle(), registry);
    }

    /// Add a device context's registry.
    pub fn add_device(&mut self, registry: HandleRegistry) {
        self.devices.insert(registry.context_handle(), registry);
    }

    /// Look up an instance registry.
    pub fn instance(&self, instance: Handle) -> Option<&HandleRegistry> {
        self.instances.get(&instance)
    }

    /// Look up an instance registry mutably.
    pub fn instance_mut(&mut self, instance: Handle) -> Option<&mut HandleRegistry> {
        self.instances.get_mut(&instance)
    }

    /// Look up a device registry.
    pub fn device(&self, device: Handle) -> Option<&HandleRegistry> {
        self.devices.get(&device)
    }

    /// Look up a device registry mutably.
    pub fn device_mut(&mut self, device: Handle) -> Option<&mut HandleRegistry> {
        self.devices.get_mut(&device)
    }

    /// Resolve a context handle to its registry, device contexts first.
    ///
    /// Calls are addressed through a dispatchable object; that object's
    /// context is either a device or, for instance-level calls, the instance
    /// itself.
    pub fn resolve(&self, context: Handle) -> Option<&HandleRegistry> {
        self.devices
            .get(&context)
            .or_else(|| self.instances.get(&context))
    }

    /// Resolve a context handle to its registry mutably.
    pub fn resolve_mut(&mut self, context: Handle) -> Option<&mut HandleRegistry> {
        if self.devices.contains_key(&context) {
            return self.devices.get_mut(&context);
        }
        self.instances.get_mut(&context)
    }

    /// Remove a device context entry.
    pub fn remove_device(&mut self, device: Handle) -> Option<HandleRegistry> {
        self.devices.remove(&device)
    }

    /// Remove an instance context entry.
    pub fn remove_instance(&mut self, instance: Handle) -> Option<HandleRegistry> {
        self.instances.remove(&instance)
    }

    /// Handles of every device context owned by `instance`.
    pub fn devices_of(&self, instance: Handle) -> Vec<Handle> {
        self.devices
            .values()
            .filter(|r| r.owner() == Some(instance))
            .map(|r| r.context_handle())
            .collect()
    }

    /// Iterate every live registry, devices first. This is the cross-context
    /// scan path: linear in the number of live contexts.
    pub fn registries(&self) -> impl Iterator<Item = &HandleRegistry> {
        self.devices.values().chain(self.instances.values())
    }

    /// Number of live instance contexts.
    pub fn instance_count(&self) -> usize {
        self.instances.len()
    }

    /// Number of live device contexts.
    pub fn device_count(&self) -> usize {
        self.devices.len()
    }
}
