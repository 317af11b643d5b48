//! Logging and tracing setup for core-mfx
//!
//! Call [`init`] once at startup, or [`init_verbose`] when chasing a
//! resolution problem. `RUST_LOG` overrides the default filter:
//!
//! ```bash
//! RUST_LOG=debug core-mfx calllog.db                    # every candidate attempt
//! RUST_LOG=mfx_lib::timeline=trace core-mfx ...          # dropped timestamps
//! RUST_LOG=warn core-mfx ...                             # failures only
//! ```
//!
//! Levels used across the crate:
//!
//! - `warn`  - failed loads, exhausted candidate chains
//! - `info`  - accepted candidates, stored datasets, exports
//! - `debug` - artifact open/close, each candidate attempt
//! - `trace` - timeline values that did not parse

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn default_filter() -> EnvFilter {
    if cfg!(debug_assertions) {
        EnvFilter::new("core_mfx=debug,mfx_lib=debug")
    } else {
        EnvFilter::new("core_mfx=info,mfx_lib=info")
    }
}

/// Compact single-line output with targets
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter());

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_target(true)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .with_writer(std::io::stderr)
            .compact(),
    );

    // Already set (tests, embedding front end): keep the existing one
    let _ = tracing::subscriber::set_global_default(subscriber);
}

/// Pretty output with file/line and worker thread names
pub fn init_verbose() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("core_mfx=trace,mfx_lib=trace"));

    let subscriber = tracing_subscriber::registry().with(filter).with(
        fmt::layer()
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true)
            .with_writer(std::io::stderr)
            .pretty(),
    );

    let _ = tracing::subscriber::set_global_default(subscriber);
}
