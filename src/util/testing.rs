//! Shared helpers for unit and integration tests

use std::env;
use std::ffi::OsString;
use std::sync::Once;

use tracing::{debug, info};
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    prelude::*,
    EnvFilter,
};

use crate::application::PreparedInvocation;

static TEST_SETUP: Once = Once::new();

/// Install the test log subscriber once per process. `RUST_LOG` overrides the
/// default `argspec=trace` filter.
pub fn init_test_setup() {
    TEST_SETUP.call_once(|| {
        setup_test_logging();
        info!("Test Setup complete");
    });
}

fn setup_test_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("argspec=trace"));

    let subscriber = tracing_subscriber::registry().with(
        fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_thread_names(false)
            .with_span_events(FmtSpan::CLOSE)
            .with_filter(env_filter),
    );

    if tracing::dispatcher::has_been_set() {
        debug!("Tracing subscriber already set");
    } else {
        subscriber.try_init().unwrap_or_else(|e| {
            eprintln!("Error: Failed to set up logging: {}", e);
        });
    }
}

/// Command line with a program name in front, as `try_parse_from` expects.
pub fn argv(args: &[&str]) -> Vec<OsString> {
    std::iter::once("prog")
        .chain(args.iter().copied())
        .map(OsString::from)
        .collect()
}

/// Run an invocation, returning its exit code and everything it reported.
pub fn run_captured(invocation: PreparedInvocation) -> (i32, String) {
    let mut report = Vec::new();
    let code = invocation.run_with(&mut report);
    (code, String::from_utf8_lossy(&report).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_test_setup_is_idempotent() {
        init_test_setup();
        init_test_setup();
    }

    #[test]
    fn test_argv_prepends_program_name() {
        assert_eq!(argv(&["sum", "1"]), vec!["prog", "sum", "1"]);
    }
}
