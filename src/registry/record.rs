//! Object records and the closed catalogue of tracked object types.

use bitflags::bitflags;

/// An opaque 64-bit identifier for a graphics-API resource.
///
/// Handles are never dereferenced by the tracker; they are only compared and
/// used as map keys. `Handle::NULL` is the null sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u64);

impl Handle {
    /// The null handle.
    pub const NULL: Handle = Handle(0);

    /// Wrap a raw handle value.
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw handle value.
    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Check whether this is the null sentinel.
    pub fn is_null(&self) -> bool {
        self.0 == 0
    }
}

impl From<u64> for Handle {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "0x{:x}", self.0)
    }
}

/// The closed catalogue of tracked object types.
///
/// Each type selects one storage bucket in a registry. The discriminant is
/// the bucket index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum ObjectType {
    Instance,
    Device,
    Queue,
    Surface,
    Swapchain,
    CommandPool,
    CommandBuffer,
    DescriptorPool,
    DescriptorSetLayout,
    DescriptorSet,
    Buffer,
    BufferView,
    Image,
    ImageView,
    Sampler,
    ShaderModule,
    PipelineCache,
    PipelineLayout,
    Pipeline,
    RenderPass,
    Framebuffer,
    Fence,
    Semaphore,
    Event,
    QueryPool,
    DeviceMemory,
}

impl ObjectType {
    /// Number of object types (and of buckets per registry).
    pub const COUNT: usize = 26;

    /// Every object type, in bucket order.
    pub const ALL: [ObjectType; Self::COUNT] = [
        ObjectType::Instance,
        ObjectType::Device,
        ObjectType::Queue,
        ObjectType::Surface,
        ObjectType::Swapchain,
        ObjectType::CommandPool,
        ObjectType::CommandBuffer,
        ObjectType::DescriptorPool,
        ObjectType::DescriptorSetLayout,
        ObjectType::DescriptorSet,
        ObjectType::Buffer,
        ObjectType::BufferView,
        ObjectType::Image,
        ObjectType::ImageView,
        ObjectType::Sampler,
        ObjectType::ShaderModule,
        ObjectType::PipelineCache,
        ObjectType::PipelineLayout,
        ObjectType::Pipeline,
        ObjectType::RenderPass,
        ObjectType::Framebuffer,
        ObjectType::Fence,
        ObjectType::Semaphore,
        ObjectType::Event,
        ObjectType::QueryPool,
        ObjectType::DeviceMemory,
    ];

    /// Bucket index for this type.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Human-readable type name used in diagnostics.
    pub const fn name(self) -> &'static str {
        match self {
            ObjectType::Instance => "Instance",
            ObjectType::Device => "Device",
            ObjectType::Queue => "Queue",
            ObjectType::Surface => "Surface",
            ObjectType::Swapchain => "Swapchain",
            ObjectType::CommandPool => "CommandPool",
            ObjectType::CommandBuffer => "CommandBuffer",
            ObjectType::DescriptorPool => "DescriptorPool",
            ObjectType::DescriptorSetLayout => "DescriptorSetLayout",
            ObjectType::DescriptorSet => "DescriptorSet",
            ObjectType::Buffer => "Buffer",
            ObjectType::BufferView => "BufferView",
            ObjectType::Image => "Image",
            ObjectType::ImageView => "ImageView",
            ObjectType::Sampler => "Sampler",
            ObjectType::ShaderModule => "ShaderModule",
            ObjectType::PipelineCache => "PipelineCache",
            ObjectType::PipelineLayout => "PipelineLayout",
            ObjectType::Pipeline => "Pipeline",
            ObjectType::RenderPass => "RenderPass",
            ObjectType::Framebuffer => "Framebuffer",
            ObjectType::Fence => "Fence",
            ObjectType::Semaphore => "Semaphore",
            ObjectType::Event => "Event",
            ObjectType::QueryPool => "QueryPool",
            ObjectType::DeviceMemory => "DeviceMemory",
        }
    }

    /// The pool type this type is allocated from, if it is pool-owned.
    pub const fn pool_type(self) -> Option<ObjectType> {
        match self {
            ObjectType::CommandBuffer => Some(ObjectType::CommandPool),
            ObjectType::DescriptorSet => Some(ObjectType::DescriptorPool),
            _ => None,
        }
    }

    /// The child type a pool of this type owns, if it is a pool.
    pub const fn pooled_child(self) -> Option<ObjectType> {
        match self {
            ObjectType::CommandPool => Some(ObjectType::CommandBuffer),
            ObjectType::DescriptorPool => Some(ObjectType::DescriptorSet),
            _ => None,
        }
    }

    /// Whether this type is itself a logical context.
    pub const fn is_context(self) -> bool {
        matches!(self, ObjectType::Instance | ObjectType::Device)
    }

    /// Whether ownership of this type may legally cross device contexts.
    ///
    /// Surfaces are instance-level objects shared by every device created
    /// from that instance, so a surface found in a sibling registry is not
    /// a foreign-handle error.
    pub const fn is_cross_device_shareable(self) -> bool {
        matches!(self, ObjectType::Surface)
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

bitflags! {
    /// Status bits carried by an object record.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RecordFlags: u32 {
        /// Created with application-supplied allocation callbacks.
        const CUSTOM_ALLOCATOR = 1 << 0;
        /// Command buffer allocated at secondary level.
        const SECONDARY_LEVEL = 1 << 1;
        /// Retrieved rather than explicitly allocated (e.g. a presentable
        /// image), tracked in the derived-object bucket.
        const DERIVED = 1 << 2;
    }
}

impl Default for RecordFlags {
    fn default() -> Self {
        RecordFlags::empty()
    }
}

bitflags! {
    /// Capability bits of a queue family.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct QueueCapabilities: u32 {
        const GRAPHICS = 1 << 0;
        const COMPUTE = 1 << 1;
        const TRANSFER = 1 << 2;
        const SPARSE_BINDING = 1 << 3;
        const PROTECTED = 1 << 4;
    }
}

/// Allocator discipline declared at create time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocatorKind {
    /// No application callbacks; driver default allocation.
    Default,
    /// Application-supplied allocation callbacks.
    Custom,
}

impl AllocatorKind {
    /// Whether this is the custom-callback discipline.
    pub fn is_custom(self) -> bool {
        matches!(self, AllocatorKind::Custom)
    }
}

/// One entry per live handle.
///
/// Records are owned by the registry bucket they live in: created right after
/// the underlying operation reports success, removed on explicit destroy,
/// cascade, or forced context teardown.
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    /// The tracked handle.
    pub handle: Handle,
    /// Type tag selecting the bucket this record lives in.
    pub object_type: ObjectType,
    /// Status bits recorded at create time.
    pub flags: RecordFlags,
    /// Owning pool or parent object, if any.
    pub parent: Option<Handle>,
    /// Creation-site backtrace, replayed in leak diagnostics.
    #[cfg(feature = "debug")]
    pub created_at: crate::debug::backtrace::CreationTrace,
}

impl ObjectRecord {
    /// Create a record for a freshly created object.
    pub fn new(
        object_type: ObjectType,
        handle: Handle,
        parent: Option<Handle>,
        allocator: AllocatorKind,
    ) -> Self {
        let mut flags = RecordFlags::empty();
        if allocator.is_custom() {
            flags |= RecordFlags::CUSTOM_ALLOCATOR;
        }
        Self {
            handle,
            object_type,
            flags,
            parent,
            #[cfg(feature = "debug")]
            created_at: crate::debug::backtrace::CreationTrace::capture(),
        }
    }

    /// Builder: merge extra status bits into this record.
    pub fn with_flags(mut self, flags: RecordFlags) -> Self {
        self.flags |= flags;
        self
    }

    /// Whether the record was created with custom allocation callbacks.
    pub fn uses_custom_allocator(&self) -> bool {
        self.flags.contains(RecordFlags::CUSTOM_ALLOCATOR)
    }

    /// Whether this is a secondary-level command buffer.
    pub fn is_secondary(&self) -> bool {
        self.flags.contains(RecordFlags::SECONDARY_LEVEL)
    }

    /// Whether this is a derived (retrieved-not-allocated) object.
    pub fn is_derived(&self) -> bool {
        self.flags.contains(RecordFlags::DERIVED)
    }
}
