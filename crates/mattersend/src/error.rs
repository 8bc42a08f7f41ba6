use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced by the library. The binary wraps these with `anyhow` context.
#[derive(Debug, Error)]
pub enum Error {
    /// Settings could not be resolved (no webhook URL, unknown section, bad icon).
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parsing config {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// The webhook answered with a server error.
    #[error("webhook returned HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unknown tabular dialect '{0}' (expected sniff, excel, excel-tab or unix)")]
    UnknownDialect(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("serializing payload: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}
