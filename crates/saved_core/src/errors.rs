use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SaverError {
    #[error("authentication failed: {0}")]
    Authentication(String),
    #[error("invalid credentials store: {0}")]
    Config(String),
    #[error("invalid URL: {0}")]
    InvalidUrl(String),
    #[error("network request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("API responded with HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("response is not valid JSON: {0}")]
    InvalidJson(String),
    #[error("saved {kind} is missing attribute `{field}`")]
    MissingAttribute {
        kind: &'static str,
        field: &'static str,
    },
    #[error("file operation failed: {0}")]
    Io(#[from] io::Error),
    #[error("CSV write failed: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("saved items export failed: {0}")]
    Core(#[from] SaverError),
    #[error("{0}")]
    Context(String),
}

impl ExportError {
    pub fn context<T: Into<String>>(self, message: T) -> Self {
        let message = message.into();
        match self {
            ExportError::Core(err) => ExportError::Context(format!("{message}: {err}")),
            ExportError::Context(existing) => {
                ExportError::Context(format!("{message}: {existing}"))
            }
        }
    }
}
