//! Property-based tests.
//!
//! Every test builds its own Tokio runtime, paused where time matters so
//! refills and cooldowns are deterministic.


use tokio::runtime::{Builder, Runtime};

/// A current-thread runtime whose clock only moves when the test advances
/// it or every task is idle.
pub fn paused_runtime() -> Runtime {
    Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .unwrap()
}
