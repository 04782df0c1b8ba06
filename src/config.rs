//! Tunables for the whole crate. Built with `derive_builder`, the same
//! crate `TimeCache` uses to build itself.

use derive_builder::Builder;
use std::time::Duration as StdDuration;

/// Default per-edge retention window Δ, matching `TimeCacheBuilder`'s own
/// default of 10 seconds.
pub const DEFAULT_CACHE_DURATION_NANOS: i64 = 10_000_000_000;

/// Default Backfill window `W`.
pub const DEFAULT_BACKFILL_WINDOW_NANOS: i64 = 5_000_000_000;

#[derive(Debug, Clone, Builder)]
#[builder(pattern = "owned")]
pub struct TfConfig {
    /// Max storage duration Δ applied to newly created `TimeCache`s.
    #[builder(default = "DEFAULT_CACHE_DURATION_NANOS")]
    pub default_cache_duration_nanos: i64,

    /// Backfill lookback window `W`, in nanoseconds.
    #[builder(default = "DEFAULT_BACKFILL_WINDOW_NANOS")]
    pub backfill_window_nanos: i64,

    /// Configured frame-ID prefix. `None` reproduces the common case of
    /// ignoring the prefix entirely and leaving raw ids untouched.
    #[builder(default = "None")]
    pub frame_prefix: Option<String>,

    /// Default deadline applied to a lookup when the caller doesn't supply
    /// one explicitly. `None` means unbounded.
    #[builder(default = "None")]
    pub default_deadline: Option<StdDuration>,
}

impl Default for TfConfig {
    fn default() -> Self {
        TfConfigBuilder::default().build().expect("all fields have defaults")
    }
}
