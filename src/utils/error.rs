use thiserror::Error;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("Error while downloading data: {message}")]
    DownloadError {
        message: String,
        #[source]
        source: Option<reqwest::Error>,
    },

    #[error("Error while reading CSV: {message}")]
    ReadError { message: String },

    #[error("The CSV is missing the following fields: {}", missing.join(", "))]
    ValidationError { missing: Vec<String> },

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigError { field: String, message: String },
}

impl FetchError {
    pub fn download(message: impl Into<String>) -> Self {
        Self::DownloadError {
            message: message.into(),
            source: None,
        }
    }

    pub fn read(message: impl Into<String>) -> Self {
        Self::ReadError {
            message: message.into(),
        }
    }

    pub fn config(field: &str, message: impl Into<String>) -> Self {
        Self::ConfigError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    /// Download, read and validation failures are user-facing and end up in
    /// the `{"error": ...}` envelope. Everything else is an infrastructure
    /// failure that the caller has to deal with.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            Self::DownloadError { .. } | Self::ReadError { .. } | Self::ValidationError { .. }
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::DownloadError { .. } => "download",
            Self::ReadError { .. } => "read",
            Self::ValidationError { .. } => "validation",
            Self::SerializationError(_) => "serialization",
            Self::IoError(_) => "io",
            Self::ConfigError { .. } => "config",
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        Self::DownloadError {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<csv::Error> for FetchError {
    fn from(err: csv::Error) -> Self {
        Self::read(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
