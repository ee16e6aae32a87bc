//! Test utilities for the auth service crate.
//!
//! This module provides shared doubles for both unit tests (in `src/`) and
//! integration tests (in `tests/`). It is compiled for unit tests and when the
//! `test-support` feature is enabled.

mod clock;
mod doubles;

pub use clock::MutableClock;
pub use doubles::{FakeSharedCache, InstrumentedUserStore, RecordingEventBus, RecordingMetrics};
