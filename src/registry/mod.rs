//! Per-context handle storage.
//!
//! This module provides:
//! - **Object records**: one value per live handle, owned by its bucket
//! - **Handle registries**: typed buckets plus the derived-object bucket and
//!   queue metadata, one registry per instance or device context
//! - **The context directory**: the process-wide map from context handle to
//!   registry, enumerated by the cross-context validator

pub mod directory;
pub mod record;
pub mod store;

pub use directory::ContextDirectory;
pub use record::{AllocatorKind, Handle, ObjectRecord, ObjectType, QueueCapabilities, RecordFlags};
pub use store::{ContextKind, HandleRegistry, QueueInfo};
