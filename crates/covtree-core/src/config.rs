use crate::error::Error;
use crate::oracle::SourceRef;
use config::{Config, Environment, File as ConfigFile};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Which source host answers existence checks for paths without coverage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OracleKind {
    #[default]
    Checkout,
    Git,
    None,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub report_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub repository: String,
    #[serde(default = "default_commit")]
    pub commit: String,
    #[serde(default)]
    pub oracle: OracleKind,
    #[serde(default = "default_oracle_timeout_ms")]
    pub oracle_timeout_ms: u64,
}

fn default_commit() -> String {
    "HEAD".to_string()
}

fn default_oracle_timeout_ms() -> u64 {
    5000
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            report_path: None,
            source_root: None,
            repository: String::new(),
            commit: default_commit(),
            oracle: OracleKind::default(),
            oracle_timeout_ms: default_oracle_timeout_ms(),
        }
    }
}

impl AppConfig {
    pub fn source_ref(&self) -> SourceRef {
        SourceRef {
            repository: self.repository.clone(),
            commit: self.commit.clone(),
        }
    }
}

/// Load `Covtree.toml` from the working directory (or `path`, which must then
/// exist), overlaid with `COVTREE_*` environment variables.
pub fn load_configuration(path: Option<&Path>) -> Result<AppConfig, Error> {
    let file = match path {
        Some(path) => ConfigFile::from(path).required(true),
        None => ConfigFile::with_name("Covtree").required(false),
    };

    let builder = Config::builder()
        .add_source(file)
        .add_source(Environment::with_prefix("COVTREE"))
        .build()?;
    Ok(builder.try_deserialize::<AppConfig>()?)
}
