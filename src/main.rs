use std::process;

use argspec::cli::{commands, CliResult, Dispatcher};
use argspec::config::Settings;
use argspec::CommandModule;
use tracing::debug;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer};

const MODULES: &[CommandModule] = &[commands::register];

fn build_dispatcher(settings: &Settings) -> CliResult<Dispatcher> {
    let dispatcher = Dispatcher::from_modules(
        env!("CARGO_PKG_NAME"),
        "File toolbox whose command line is derived from signature records",
        MODULES,
    )?
    .with_completion()?
    .with_color(settings.color.into());
    Ok(dispatcher)
}

fn main() {
    let settings = Settings::load().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    });
    setup_logging(&settings.log);
    debug!(?settings, "loaded settings");

    let dispatcher = build_dispatcher(&settings).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(e.exit_code());
    });

    let invocation = dispatcher.parse();
    if invocation.traceback() {
        enable_backtraces();
    }
    process::exit(invocation.run());
}

/// Capture backtraces in errors built from here on, unless the user chose otherwise.
fn enable_backtraces() {
    if std::env::var_os("RUST_LIB_BACKTRACE").is_none() {
        std::env::set_var("RUST_LIB_BACKTRACE", "1");
    }
}

fn setup_logging(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|e| {
        eprintln!("Invalid log filter {:?}: {}", directive, e);
        EnvFilter::new("warn")
    });

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_names(false)
        .with_span_events(FmtSpan::CLOSE);

    tracing_subscriber::registry()
        .with(fmt_layer.with_filter(filter))
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use argspec::util::testing;

    #[ctor::ctor]
    fn init() {
        testing::init_test_setup();
    }

    #[test]
    fn verify_cli() {
        let dispatcher = build_dispatcher(&Settings::default()).unwrap();
        dispatcher.command().clone().debug_assert();
    }
}
