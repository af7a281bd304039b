//! Diagnostic codes and core types.
//!
//! Mirrors rustc's diagnostic levels for familiar UX.

use crate::registry::record::{Handle, ObjectType};

/// Diagnostic code wrapper for type-safe code references.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticCode(&'static str);

impl DiagnosticCode {
    /// Create a new diagnostic code.
    pub const fn new(code: &'static str) -> Self {
        Self(code)
    }

    /// Get the code string.
    pub const fn as_str(&self) -> &'static str {
        self.0
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The severity level of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational - object lifecycle events, not a problem.
    Info,
    /// Warning - advisory, the call proceeds.
    Warning,
    /// Error - the application broke a validity rule.
    Error,
}

impl Severity {
    /// Get the display prefix for this severity.
    pub fn prefix(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.prefix())
    }
}

/// A diagnostic message with code, offending object, and formatted message.
///
/// Diagnostic codes follow the pattern:
/// - `OT0xx` - Handle validity (lifecycle events, unknown, foreign)
/// - `OT1xx` - Destroy-time consistency (allocator, parent)
/// - `OT2xx` - Queue capability advisories
/// - `OT3xx` - Leaks at context teardown
/// - `OT9xx` - Internal tracker errors
#[derive(Debug, Clone)]
pub struct Diagnostic {
    /// Severity level.
    pub severity: Severity,
    /// Diagnostic code (e.g. "OT001").
    pub code: DiagnosticCode,
    /// Type tag of the object the diagnostic is about.
    pub object_type: ObjectType,
    /// The offending or affected handle.
    pub handle: Handle,
    /// Formatted message.
    pub message: String,
    /// Optional additional context.
    pub note: Option<&'static str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(
        code: DiagnosticCode,
        object_type: ObjectType,
        handle: Handle,
        message: String,
    ) -> Self {
        Self {
            severity: Severity::Error,
            code,
            object_type,
            handle,
            message,
            note: None,
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(
        code: DiagnosticCode,
        object_type: ObjectType,
        handle: Handle,
        message: String,
    ) -> Self {
        Self {
            severity: Severity::Warning,
            code,
            object_type,
            handle,
            message,
            note: None,
        }
    }

    /// Create a new informational diagnostic.
    pub fn info(
        code: DiagnosticCode,
        object_type: ObjectType,
        handle: Handle,
        message: String,
    ) -> Self {
        Self {
            severity: Severity::Info,
            code,
            object_type,
            handle,
            message,
            note: None,
        }
    }

    /// Add a note to this diagnostic.
    pub fn with_note(mut self, note: &'static str) -> Self {
        self.note = Some(note);
        self
    }
}

// =============================================================================
// Predefined codes (OT0xx - Handle validity)
// =============================================================================

/// OT000: object created.
pub const OT000: DiagnosticCode = DiagnosticCode::new("OT000");

/// OT010: object destroyed.
pub const OT010: DiagnosticCode = DiagnosticCode::new("OT010");

/// OT001: handle is not live in any known registry.
pub const OT001: DiagnosticCode = DiagnosticCode::new("OT001");

/// OT002: handle is live but owned by a different context.
pub const OT002: DiagnosticCode = DiagnosticCode::new("OT002");

// =============================================================================
// Predefined codes (OT1xx - Destroy-time consistency)
// =============================================================================

/// OT101: created with custom allocator callbacks, destroyed without them.
pub const OT101: DiagnosticCode = DiagnosticCode::new("OT101");

/// OT102: created without custom allocator callbacks, destroyed with them.
pub const OT102: DiagnosticCode = DiagnosticCode::new("OT102");

/// OT103: destroy call's declared parent does not match the recorded parent.
pub const OT103: DiagnosticCode = DiagnosticCode::new("OT103");

// =============================================================================
// Predefined codes (OT2xx - Queue advisories)
// =============================================================================

/// OT201: queue's family lacks a capability the operation wants.
pub const OT201: DiagnosticCode = DiagnosticCode::new("OT201");

// =============================================================================
// Predefined codes (OT3xx - Leaks)
// =============================================================================

/// OT301: object still live when its owning context was torn down.
pub const OT301: DiagnosticCode = DiagnosticCode::new("OT301");

// =============================================================================
// Predefined codes (OT9xx - Internal)
// =============================================================================

/// OT901: the tracker's own bookkeeping invariants broke.
pub const OT901: DiagnosticCode = DiagnosticCode::new("OT901");
