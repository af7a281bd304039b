//! Build script for objtrack.
//!
//! Emits feature-related notes for users integrating the tracker into a
//! validation layer build.

use std::env;

fn main() {
    // Re-run if features change
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_DEBUG");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_PARKING_LOT");
    println!("cargo:rerun-if-env-changed=CARGO_FEATURE_DIAGNOSTICS");

    let debug_enabled = env::var("CARGO_FEATURE_DEBUG").is_ok();
    let parking_lot_enabled = env::var("CARGO_FEATURE_PARKING_LOT").is_ok();
    let diagnostics_enabled = env::var("CARGO_FEATURE_DIAGNOSTICS").is_ok();

    let profile = env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());
    let is_release = profile == "release";

    if debug_enabled {
        emit_info("Debug features enabled");
        emit_note("Leak diagnostics will include creation-site backtraces.");

        if is_release {
            emit_warning("Debug features enabled in release build!");
            emit_note("Backtrace capture on every create is costly. Consider disabling for production layers.");
        }
    }

    if parking_lot_enabled {
        emit_info("Using parking_lot for the tracker lock (faster lock implementation)");
    }

    if is_release && !diagnostics_enabled {
        emit_note("Release build: stderr diagnostics are compiled out unless the 'diagnostics' feature is enabled.");
        emit_note("Custom DiagnosticSink implementations are unaffected.");
    }
}

fn emit_info(msg: &str) {
    println!("cargo:warning=[objtrack] ℹ️  {}", msg);
}

fn emit_note(msg: &str) {
    println!("cargo:warning=[objtrack]    {}", msg);
}

fn emit_warning(msg: &str) {
    println!("cargo:warning=[objtrack] ⚠️  {}", msg);
}
