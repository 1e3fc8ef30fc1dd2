//! Log output for the command-line front-end.
//!
//! `RUST_LOG` wins when set; otherwise `-v` flags pick the level. Records
//! emitted through the `log` facade by `otpbridge-otp` are forwarded into
//! the same subscriber.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Default filter directive for a `-v` count.
pub fn filter_for(verbose: u8) -> String {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    format!("otpbridge={level},otpbridge_otp={level}")
}

/// Install the global subscriber. Logs go to stderr so they never mix
/// with URIs or QR art on stdout.
pub fn init(verbose: u8) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter_for(verbose)));

    let result = tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init();

    if let Err(e) = result {
        eprintln!("logging already initialised: {e}");
    }
}
