use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

const DEBUG_LOG_FILENAME: &str = ".manuscript-cli-debug.log";

/// Install the global subscriber. With `debug`, everything at debug level
/// goes to a file in the working directory and the returned guard must be
/// held until exit; otherwise warnings go to stderr.
pub fn init(debug: bool) -> Option<WorkerGuard> {
    if debug {
        return Some(setup_debug_logging());
    }
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .init();
    None
}

fn setup_debug_logging() -> WorkerGuard {
    let file_appender = tracing_appender::rolling::never(".", DEBUG_LOG_FILENAME);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_ansi(false)
        .init();

    guard
}
