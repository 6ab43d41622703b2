use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum DropChanceError {
    #[error("could not find {name} in any of: {searched}")]
    TableNotFound { name: String, searched: String },

    #[error("failed to read {}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {table}")]
    Json {
        table: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{table} entry {key:?}: {reason}")]
    InvalidEntry {
        table: &'static str,
        key: String,
        reason: String,
    },

    #[error("award {0} is not in DropTable")]
    UnknownAward(i64),

    #[error("failed to write {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("invalid config: {0}")]
    Config(String),

    #[error("failed to parse config {}", .path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub type Result<T> = std::result::Result<T, DropChanceError>;

impl DropChanceError {
    pub(crate) fn invalid(table: &'static str, key: &str, reason: impl Into<String>) -> Self {
        DropChanceError::InvalidEntry {
            table,
            key: key.to_string(),
            reason: reason.into(),
        }
    }
}
