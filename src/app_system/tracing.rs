/// Configure tracing once at application startup for the entire process.
///
/// Filtering is environment-based: `RUST_LOG=debug cargo run` shows the
/// per-request client/handler flow, `info` (the default) shows lifecycle
/// events only.
pub fn setup_tracing() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_timer(tracing_subscriber::fmt::time::uptime())
        .compact()
        .init();
}
