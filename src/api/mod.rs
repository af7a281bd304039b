//! Public tracker surface.

pub mod config;
pub mod stats;
pub mod tracker;

pub use config::TrackerConfig;
pub use stats::TrackerStats;
pub use tracker::ObjectTracker;
