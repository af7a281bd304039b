//! Tracker configuration.

/// Configuration for the object tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Emit an informational diagnostic for every registered object.
    pub report_creates: bool,

    /// Emit an informational diagnostic for every unregistered object.
    pub report_destroys: bool,

    /// Pre-allocated capacity per typed bucket (0 = allocate on demand).
    pub expected_objects_per_type: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            report_creates: true,
            report_destroys: false,
            expected_objects_per_type: 0,
        }
    }
}

impl TrackerConfig {
    /// Create a config with lifecycle reporting disabled.
    ///
    /// Error and warning diagnostics still fire; only the per-object
    /// create/destroy chatter is dropped.
    pub fn quiet() -> Self {
        Self {
            report_creates: false,
            report_destroys: false,
            expected_objects_per_type: 0,
        }
    }

    /// Builder pattern: toggle create reports.
    pub fn with_create_reports(mut self, enable: bool) -> Self {
        self.report_creates = enable;
        self
    }

    /// Builder pattern: toggle destroy reports.
    pub fn with_destroy_reports(mut self, enable: bool) -> Self {
        self.report_destroys = enable;
        self
    }

    /// Builder pattern: set per-bucket capacity.
    pub fn with_expected_objects_per_type(mut self, capacity: usize) -> Self {
        self.expected_objects_per_type = capacity;
        self
    }
}
