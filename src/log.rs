pub fn init() {
    use tracing_subscriber::EnvFilter;

    tracing_subscriber::fmt()
        // Set `RUST_LOG` to `trace` to see every decoded instruction.
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_target(false)
        .without_time()
        .init();
}
