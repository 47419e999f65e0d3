use std::fs::{self, File, OpenOptions};
use std::path::Path;
use std::sync::{Mutex, Once};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "formsmith=info";

static INIT: Once = Once::new();

#[derive(Debug)]
enum LogDestination {
    Stderr,
    File(File),
    /// A log file was asked for but could not be opened.
    Discard,
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

fn destination(log_file: Option<&Path>) -> LogDestination {
    let Some(path) = log_file else {
        return LogDestination::Stderr;
    };
    if let Some(parent) = path.parent() {
        let _ = fs::create_dir_all(parent);
    }
    match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => LogDestination::File(file),
        Err(_) => LogDestination::Discard,
    }
}

/// Installs the global subscriber. Later calls are no-ops.
///
/// With `log_file` set, events are appended there so they do not draw over
/// the interactive screen, and are discarded if the file cannot be opened.
/// Without it they go to stderr.
pub fn init_tracing(log_file: Option<&Path>) {
    INIT.call_once(|| {
        let builder = tracing_subscriber::fmt()
            .with_env_filter(env_filter())
            .with_target(false);

        let _ = match destination(log_file) {
            LogDestination::Stderr => builder.with_writer(std::io::stderr).try_init(),
            LogDestination::File(file) => builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .try_init(),
            LogDestination::Discard => builder.with_writer(std::io::sink).try_init(),
        };
    });
}
