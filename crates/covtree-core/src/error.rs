use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Report parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A totals lookup missed. Candidate paths always come from the report's own
    /// file list, so this signals a broken report implementation.
    #[error("No coverage entry for path: {0}")]
    NotFound(String),

    #[error("Invalid report: {0}")]
    InvalidReport(String),
}
