//! Logging setup for the command line binary.
//!
//! Diagnostics go to stderr through `tracing` so stdout only carries the
//! rendered graph.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// `verbose` wins over `quiet`. Without either flag `RUST_LOG` is honoured,
/// falling back to info level for this crate.
pub fn init_logger(verbose: bool, quiet: bool) {
    let filter = build_filter(verbose, quiet);

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .compact();

    // A second initialisation (tests, embedding) is not an error.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}

fn build_filter(verbose: bool, quiet: bool) -> EnvFilter {
    if verbose {
        EnvFilter::new("component_graph=debug")
    } else if quiet {
        EnvFilter::new("component_graph=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("component_graph=info"))
    }
}
