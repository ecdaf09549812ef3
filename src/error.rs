//! Error types for whatsapp-dispatch

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("No such file: {}", .path.display())]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Contacts file is empty: {}", .0.display())]
    EmptyContacts(PathBuf),

    #[error("Missing required environment variables: {}", .0.join(", "))]
    MissingEnv(Vec<&'static str>),

    #[error("API failed: {status} - {body}")]
    Delivery { status: u16, body: String },

    #[error("Fallback send failed: {0}")]
    Fallback(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// Conditions that abort the whole run with the file-error exit status
    pub fn is_file_error(&self) -> bool {
        matches!(self, Error::MissingFile { .. } | Error::EmptyContacts(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
