//! Debug utilities for tracking object creation sites.
//!
//! Only compiled when the `debug` feature is enabled.

pub mod backtrace;
