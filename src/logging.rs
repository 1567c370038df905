// * tracing setup for diagnostics on stderr
use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

/// Diagnostics go to stderr; stdout carries nothing but the result lines.
///
/// Filtered through `RUST_LOG`, quiet (`warn`) by default.
pub fn init_logging() -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(console::user_attended_stderr())
        .with_target(false)
        .try_init()
        .map_err(|err| anyhow!("failed to initialize logging: {err}"))
}
