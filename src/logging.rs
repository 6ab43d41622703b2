//! Diagnostics for report builds, written to stderr.
//!
//! - `debug`: each table file as it is loaded, and the parsed award, package
//!   and item counts.
//! - `warn`: ItemTable could not be found, so item names fall back to `Item_<id>`.
//! - `info`: the output directory, award file count and index row count after a
//!   build.
//!
//! The CSV reports are the product output and are never affected by `RUST_LOG`.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber.
///
/// Reads `RUST_LOG` env var. Defaults to `warn` if unset.
///
/// # Example
/// ```bash
/// RUST_LOG=dropchance=debug dropchance build
/// ```
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .init();
}
