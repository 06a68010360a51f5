//! logging
//!
//! `tracing` subscriber setup for applications embedding the crate.
//!
//! The library itself only emits events through the `tracing` macros:
//! - `debug!` summaries at the end of resolve and prepare passes
//! - `warn!` for each unresolved serial under the `warn` policy
//!
//! Installing a subscriber is left to the application; [`init`] is a
//! convenience for the common case.

use tracing_subscriber::util::TryInitError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Output verbosity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verbosity {
    /// Quiet mode - errors only
    Quiet,
    /// Normal mode - warnings and above
    Normal,
    /// Debug mode - pass summaries and lookups
    Debug,
}

impl Verbosity {
    /// Create verbosity from flags.
    pub fn from_flags(quiet: bool, debug: bool) -> Self {
        if quiet {
            Verbosity::Quiet
        } else if debug {
            Verbosity::Debug
        } else {
            Verbosity::Normal
        }
    }

    /// Default filter directive for this verbosity.
    pub fn directive(&self) -> &'static str {
        match self {
            Verbosity::Quiet => "smdx=error",
            Verbosity::Normal => "smdx=warn",
            Verbosity::Debug => "smdx=debug",
        }
    }
}

/// Install a compact fmt subscriber on stderr.
///
/// `RUST_LOG` overrides the verbosity's default directive.
///
/// # Errors
///
/// Returns an error if a global subscriber is already installed.
pub fn init(verbosity: Verbosity) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(verbosity.directive()));

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .compact(),
        )
        .try_init()
}
