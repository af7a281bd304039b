//! Pre-call validation.
//!
//! These checks run in phase one of the interception protocol, before the
//! downstream call, with the tracker lock held. They never mutate registry
//! state; every outcome is a [`Verdict`] plus zero or more diagnostics
//! delivered through the report sink.

pub mod cross_context;
pub mod destroy;
pub mod queues;

pub use cross_context::Verdict;
