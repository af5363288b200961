//! Logging initialization.

use tracing_subscriber::{EnvFilter, fmt};

/// Install the stderr subscriber.
///
/// Logs go to stderr so stdout carries only records. `RUST_LOG` wins over
/// the level picked from `-v`.
pub fn init_logging(verbosity: u8) {
    let default = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
