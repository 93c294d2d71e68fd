use tracing_subscriber::EnvFilter;

/// Initialize the global tracing subscriber.
///
/// Respects `RUST_LOG`, defaulting to `info` for our crates and `warn` for
/// dependencies.
pub fn init() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,server=info,services=info,db=info,utils=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
