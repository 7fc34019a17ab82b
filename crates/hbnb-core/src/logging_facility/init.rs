//! Logging initialization module

use std::str::FromStr;
use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output
    Development,
    /// JSON structured output
    Production,
    /// No output; tests use `init_test_capture()` instead
    Test,
}

impl FromStr for Profile {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pretty" | "development" => Ok(Profile::Development),
            "json" | "production" => Ok(Profile::Production),
            "test" => Ok(Profile::Test),
            other => Err(format!("unknown log format: {}", other)),
        }
    }
}

static INIT_ONCE: Once = Once::new();

fn default_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("hbnb=debug")
        } else {
            EnvFilter::new("hbnb=warn")
        }
    })
}

/// Initialize the logging facility
///
/// Call once at startup. Later calls are no-ops. `RUST_LOG` overrides the
/// default `hbnb=warn` filter; `verbose` raises the default to debug.
pub fn init(profile: Profile, verbose: bool) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(default_filter(verbose))
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(default_filter(verbose))
                .init();
        }
        Profile::Test => {
            tracing_subscriber::registry().init();
        }
    });
}
