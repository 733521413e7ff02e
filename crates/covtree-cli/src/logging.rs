use std::env;
use tracing::debug;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

const DEFAULT_LOG_FILE: &str = "./logs/covtree.log";

fn log_file_path(configured: Option<String>) -> String {
    configured
        .filter(|path| !path.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_LOG_FILE.to_string())
}

pub fn init_logger() -> impl Drop {
    let filter = env::var("TRACING_LEVEL").unwrap_or_else(|_| "info".to_string());
    let filter_layer = EnvFilter::new(filter);

    let log_file_path = log_file_path(env::var("LOG_FILE_PATH").ok());

    let file_appender = tracing_appender::rolling::never("./", &log_file_path);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Listings go to stdout, so diagnostics stay on stderr
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .pretty()
                .with_file(false)
                .without_time()
                .with_ansi(true),
        )
        .with(
            fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false),
        )
        .with(filter_layer)
        .init();

    debug!(
        version = env!("CARGO_PKG_VERSION"),
        log_file = %log_file_path,
        "covtree started"
    );

    guard
}
