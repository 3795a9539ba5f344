use tracing_subscriber::EnvFilter;

/// Compact stderr logging. `RUST_LOG` overrides the default `info` level.
///
/// Reports go to stdout, so logs must never share it.
pub fn setup_logger(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .compact()
        .with_env_filter(filter)
        .init();
}
