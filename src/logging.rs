use tracing_subscriber::EnvFilter;

/// Pick the filter directive: `RUST_LOG`, then `--verbose`, then the
/// configured level.
pub fn filter_directive(rust_log: Option<&str>, verbose: bool, configured: Option<&str>) -> String {
    match rust_log {
        Some(directive) if !directive.trim().is_empty() => directive.to_string(),
        _ if verbose => "debug".to_string(),
        _ => configured.unwrap_or("info").to_string(),
    }
}

/// Install the stderr subscriber. Stdout is left to command output.
pub fn init(verbose: bool, configured: Option<&str>) {
    let rust_log = std::env::var("RUST_LOG").ok();
    let directive = filter_directive(rust_log.as_deref(), verbose, configured);
    let filter = EnvFilter::try_new(&directive).unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
