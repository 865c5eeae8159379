//! Logging setup
//!
//! Reports go to stdout, so the subscriber always writes to stderr.

use std::error::Error;

use tracing_subscriber::EnvFilter;

/// Install the global subscriber. `RUST_LOG` wins over `default_filter`.
///
/// Fails if a global subscriber is already installed.
pub fn init_tracing(json: bool, default_filter: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_init_fails() {
        let _ = init_tracing(false, "attest=debug");
        assert!(init_tracing(true, "attest=debug").is_err());
    }
}
