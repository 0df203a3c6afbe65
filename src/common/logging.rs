//! Logging and tracing configuration
//!
//! The CLI logs compact lines to stderr so stdout stays free for results.
//! With `--log-file` a second, detailed layer is written to the data dir.

use std::fs::{File, OpenOptions};
use std::path::PathBuf;
use tracing::Subscriber;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use super::paths;

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("bpbind=info,warn"))
}

/// Initialize tracing for the CLI (stderr logging)
///
/// Logs are controlled by the `RUST_LOG` environment variable.
/// Default level is INFO for this crate, WARN for dependencies.
pub fn init_cli() {
    tracing_subscriber::registry()
        .with(filter())
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false)
                .compact(),
        )
        .init();
}

/// Subscriber writing a detailed log to `file` and compact lines to stderr
fn file_subscriber(file: File) -> impl Subscriber + Send + Sync + 'static {
    let file_layer = fmt::layer()
        .with_writer(file)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true);

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    tracing_subscriber::registry()
        .with(filter())
        .with(file_layer)
        .with(stderr_layer)
}

/// Initialize tracing with an additional log file
///
/// Returns the log file path, or `None` when the file could not be opened
/// (stderr logging is still installed in that case).
pub fn init_with_file() -> Option<PathBuf> {
    let log_file = paths::log_dir().and_then(|dir| {
        std::fs::create_dir_all(&dir).ok()?;
        Some(dir.join("bpbind.log"))
    });

    let opened = log_file.and_then(|path| {
        match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => Some((file, path)),
            Err(e) => {
                eprintln!("Warning: Could not open log file: {}", e);
                None
            }
        }
    });

    match opened {
        Some((file, path)) => {
            file_subscriber(file).init();
            Some(path)
        }
        None => {
            init_cli();
            None
        }
    }
}
