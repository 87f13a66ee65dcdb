//! Logger setup for the runner and tests.
//!
//! Library code only talks to the `log` facade. Per-tick summaries go out at
//! debug level and per-agent steering at trace level, so a plain run shows
//! lifecycle events and catches only.

use env_logger::{Builder, Env};

/// Filter used when `RUST_LOG` is unset.
///
/// Other crates stay at `warn`; `verbose` raises this crate from `info` to
/// `debug`, which adds one line per tick.
pub fn default_filter(verbose: bool) -> String {
    let own = if verbose { "debug" } else { "info" };
    format!("warn,{}={}", env!("CARGO_CRATE_NAME"), own)
}

/// Install `env_logger` with millisecond timestamps.
///
/// Safe to call more than once; later calls leave the first logger in place.
pub fn init(verbose: bool) {
    let env = Env::default().default_filter_or(default_filter(verbose));
    let mut builder = Builder::from_env(env);
    builder.format_timestamp_millis();
    let _ = builder.try_init();
}
