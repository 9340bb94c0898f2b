use tracing_subscriber::EnvFilter;

/// Map the `-v` count to a filter; `RUST_LOG` wins when set. Logs go to
/// stderr so stdout stays clean for the console output itself.
pub fn setup_logging(verbose_level: u8) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let filter_str = match verbose_level {
            0 => "warn,bridge_console=info,markdown=info",
            1 => "info,bridge_console=debug,markdown=debug",
            _ => "debug,bridge_console=trace,markdown=trace",
        };
        EnvFilter::new(filter_str)
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
