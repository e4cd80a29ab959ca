use tracing_subscriber::EnvFilter;

/// Installs the global subscriber, writing to stderr so stdout stays the chat.
///
/// `RUST_LOG` wins when set; otherwise `-v` flags raise the configured filter.
pub fn setup_logging(verbose_level: u8, configured_filter: &str) {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let filter_str = match verbose_level {
            0 => configured_filter,
            1 => "info,chatdeck=debug",
            _ => "debug,chatdeck=trace",
        };
        EnvFilter::try_new(filter_str).unwrap_or_else(|e| {
            eprintln!("Warning: invalid log filter '{}': {}", filter_str, e);
            EnvFilter::new("warn")
        })
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();
}
