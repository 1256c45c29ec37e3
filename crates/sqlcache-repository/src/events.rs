//! Diagnostics sink for background maintenance.

use sqlcache_core::{CacheError, Interface};
use tracing::{debug, error, info};

/// Receives the outcome of each sweep.
///
/// Sweeps never return errors to their caller, so this is the only place a
/// sweep failure can be observed.
pub trait CacheEventSink: Interface + Send + Sync {
    /// A sweep finished and removed `removed` rows.
    fn sweep_completed(&self, removed: u64);

    /// A sweep failed; the error was swallowed.
    fn sweep_failed(&self, error: &CacheError);
}

/// Event sink that forwards to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl CacheEventSink for TracingEventSink {
    fn sweep_completed(&self, removed: u64) {
        if removed == 0 {
            debug!("Expired item sweep removed nothing");
        } else {
            info!(removed, "Expired item sweep completed");
        }
    }

    fn sweep_failed(&self, error: &CacheError) {
        error!(code = error.error_code(), "Expired item sweep failed: {}", error);
    }
}
