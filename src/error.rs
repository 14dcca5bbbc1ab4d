use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Error loading price data from {url}: HTTP {status}")]
    Fetch { url: String, status: u16 },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid price document: {0}")]
    Decode(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl Error {
    /// Whether another attempt at the same request could succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            Error::Network(_) => true,
            Error::Fetch { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Error::Network("Request timed out".to_string())
        } else if err.is_connect() {
            Error::Network("Failed to connect to data host".to_string())
        } else if err.is_decode() {
            Error::Decode(err.to_string())
        } else {
            Error::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Decode(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {name}: {value:?} ({reason})")]
    Invalid {
        name: &'static str,
        value: String,
        reason: String,
    },
}
