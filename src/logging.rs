//! Subscriber setup for binaries and tests that want to see the crate's
//! `tracing` output. Library code only emits events.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Installs a compact global subscriber.
///
/// `RUST_LOG` takes precedence; otherwise `verbose` selects `trace` (one
/// event per generated instant) over `info` for this crate.
pub fn init_logger(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("u_period=trace,info")
        } else {
            EnvFilter::new("u_period=info")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}
