use tracing_subscriber::{fmt, EnvFilter};

const LOG_ENV: &str = "GFXPROBE_LOG";

fn env_filter(default: &str) -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(default))
}

/// Initialize structured logging with environment filter.
/// Set GFXPROBE_LOG=debug (or trace, info, warn, error) for verbosity control.
pub fn init_logging() {
    fmt()
        .with_env_filter(env_filter("info"))
        .with_target(true)
        .with_thread_ids(true)
        .init();
}

/// Like [`init_logging`], but leaves an already installed subscriber alone.
/// Embedding applications usually own the subscriber, so the default level
/// here is quieter.
pub fn try_init_logging() -> bool {
    fmt()
        .with_env_filter(env_filter("warn"))
        .with_target(true)
        .with_thread_ids(true)
        .try_init()
        .is_ok()
}
