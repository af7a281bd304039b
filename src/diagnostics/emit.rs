//! Diagnostic emission backend.
//!
//! Handles delivering diagnostics to the report sink, with optional stderr
//! and log-crate output. The sink's boolean return is the "skip the
//! downstream call" signal surfaced to the interception shim.

use std::sync::atomic::{AtomicBool, Ordering};

use super::kind::{Diagnostic, Severity};
use super::strict::{should_panic, should_panic_on_warning};
use crate::sync::mutex::Mutex;

/// Global flag to suppress diagnostic output (for testing).
static DIAGNOSTICS_SUPPRESSED: AtomicBool = AtomicBool::new(false);

/// Suppress all diagnostic output.
pub fn suppress_diagnostics(suppress: bool) {
    DIAGNOSTICS_SUPPRESSED.store(suppress, Ordering::Relaxed);
}

/// Check if diagnostics are suppressed.
pub fn is_suppressed() -> bool {
    DIAGNOSTICS_SUPPRESSED.load(Ordering::Relaxed)
}

/// A diagnostic sink for validation-layer output.
///
/// Returning `true` asks the interception shim to skip the downstream call.
/// Sink configuration and message filtering live outside this crate.
pub trait DiagnosticSink: Send + Sync {
    /// Handle a diagnostic. Return whether the downstream call should be
    /// skipped.
    fn report(&self, diag: &Diagnostic) -> bool;
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for std::sync::Arc<S> {
    fn report(&self, diag: &Diagnostic) -> bool {
        (**self).report(diag)
    }
}

/// Deliver a diagnostic through a sink, honoring suppression and strict mode.
///
/// Returns the sink's skip request, or `false` when suppressed.
pub(crate) fn emit(sink: &dyn DiagnosticSink, diag: &Diagnostic) -> bool {
    if is_suppressed() {
        return false;
    }

    #[cfg(feature = "log")]
    emit_to_log(diag);

    let skip = sink.report(diag);

    // Strict mode (CI usage): escalate to a panic after the sink has seen it.
    let panic_now = match diag.severity {
        Severity::Error => should_panic(),
        Severity::Warning => should_panic_on_warning(),
        Severity::Info => false,
    };
    if panic_now {
        panic!(
            "[objtrack][{}] {}\nStrict mode enabled - diagnostics are fatal.",
            diag.code, diag.message
        );
    }

    skip
}

/// Report a tracker-internal invariant violation.
///
/// These are programming defects in the tracker itself, not application
/// errors: emit `OT901` for the record, then trip a debug assertion.
pub(crate) fn internal_error(
    sink: &dyn DiagnosticSink,
    object_type: crate::registry::record::ObjectType,
    handle: crate::registry::record::Handle,
    message: String,
) {
    let diag = Diagnostic::error(super::kind::OT901, object_type, handle, message)
        .with_note("this indicates a bug in the tracker, not the application");
    emit(sink, &diag);
    debug_assert!(false, "internal tracker error: {}", diag.message);
}

/// The default sink: formats diagnostics to stderr, never asks for a skip.
///
/// In release builds without the `diagnostics` feature the formatting is
/// compiled out and the sink is silent.
#[derive(Default)]
pub struct StderrSink;

impl StderrSink {
    /// Create a new stderr sink.
    pub fn new() -> Self {
        Self
    }
}

impl DiagnosticSink for StderrSink {
    fn report(&self, diag: &Diagnostic) -> bool {
        #[cfg(any(debug_assertions, feature = "diagnostics"))]
        emit_to_stderr(diag);

        #[cfg(not(any(debug_assertions, feature = "diagnostics")))]
        let _ = diag;

        false
    }
}

/// Internal: emit to stderr.
#[cfg(any(debug_assertions, feature = "diagnostics"))]
fn emit_to_stderr(diag: &Diagnostic) {
    use std::io::Write;

    let mut stderr = std::io::stderr();

    // Main diagnostic line
    let _ = writeln!(
        stderr,
        "[objtrack][{}] {}: {} object {}: {}",
        diag.code,
        diag.severity.prefix(),
        diag.object_type,
        diag.handle,
        diag.message
    );

    // Note (if present)
    if let Some(note) = diag.note {
        let _ = writeln!(stderr, "  note: {}", note);
    }
}

/// Emit a diagnostic using the log crate (if available).
#[cfg(feature = "log")]
pub fn emit_to_log(diag: &Diagnostic) {
    match diag.severity {
        Severity::Error => {
            log::error!("[{}] {} {}: {}", diag.code, diag.object_type, diag.handle, diag.message);
        }
        Severity::Warning => {
            log::warn!("[{}] {} {}: {}", diag.code, diag.object_type, diag.handle, diag.message);
        }
        Severity::Info => {
            log::debug!("[{}] {} {}: {}", diag.code, diag.object_type, diag.handle, diag.message);
        }
    }

    if let Some(note) = diag.note {
        log::info!("  note: {}", note);
    }
}

/// A simple sink that collects diagnostics.
#[derive(Default)]
pub struct CollectingSink {
    diagnostics: Mutex<Vec<Diagnostic>>,
    skip_on_error: AtomicBool,
}

impl CollectingSink {
    /// Create a new collecting sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the sink request a downstream-call skip on every error.
    pub fn request_skip_on_error(&self, skip: bool) {
        self.skip_on_error.store(skip, Ordering::Relaxed);
    }

    /// Get all collected diagnostics.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.lock().clone()
    }

    /// Collected diagnostics carrying one specific code.
    pub fn with_code(&self, code: super::kind::DiagnosticCode) -> Vec<Diagnostic> {
        self.diagnostics
            .lock()
            .iter()
            .filter(|d| d.code == code)
            .cloned()
            .collect()
    }

    /// Clear collected diagnostics.
    pub fn clear(&self) {
        self.diagnostics.lock().clear();
    }

    /// Check if any errors were collected.
    pub fn has_errors(&self) -> bool {
        self.diagnostics
            .lock()
            .iter()
            .any(|d| d.severity == Severity::Error)
    }
}

impl DiagnosticSink for CollectingSink {
    fn report(&self, diag: &Diagnostic) -> bool {
        self.diagnostics.lock().push(diag.clone());
        diag.severity == Severity::Error && self.skip_on_error.load(Ordering::Relaxed)
    }
}
