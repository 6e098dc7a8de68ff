use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter, e.g. `docpack=debug`
pub const LOG_ENV: &str = "DOCPACK_LOG";

/// Install a `fmt` subscriber filtered by `DOCPACK_LOG`, then `RUST_LOG`,
/// then `info`.
///
/// Returns `false` if a global subscriber was already installed.
pub fn init() -> bool {
    let filter = EnvFilter::try_from_env(LOG_ENV)
        .or_else(|_| EnvFilter::try_from_default_env())
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .is_ok()
}
