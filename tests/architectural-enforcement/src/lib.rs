//! Architectural Enforcement Integration Tests
//!
//! This package contains integration tests that enforce workspace policy on
//! the `owen/core` sources:
//! - No blocking sleeps; timers only where clips wait on the engine
//! - Logging through `tracing`, never stdout
//! - Errors propagated, never unwrapped
//!
//! The checks live in `tests/`; this library only exposes the scanned path.

/// Source tree checked by the policy tests, relative to this package
pub const CORE_SRC: &str = "../../owen/core/src";
