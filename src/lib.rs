//! `cwa-tools` - Command-line utilities for the Taiwan CWA open-data API
//!
//! This library backs two small binaries: `check-locations`, which inspects
//! a locally cached hiking-forecast dataset for matching location names, and
//! `fetch-township`, which retrieves a township forecast from the CWA
//! datastore and writes it to a local file.

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;

// Re-export core types for public API
pub use api::CwaApiClient;
pub use config::{CwaConfig, FetchConfig, LoggingConfig, LookupConfig};
pub use dataset::{LocationRecord, LookupReport};
pub use error::CwaError;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize tracing output per the logging configuration.
///
/// Diagnostics go to stderr; stdout is reserved for the binaries' output
/// contract. `RUST_LOG` overrides the configured level when set.
pub fn init_tracing(logging: &LoggingConfig) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(logging.level.clone()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    // try_init so tests that pull in the library twice don't panic
    let result = if logging.format == "compact" {
        builder.compact().try_init()
    } else {
        builder.try_init()
    };
    let _ = result;
}
