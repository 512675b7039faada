use reqwest::StatusCode;
use thiserror::Error;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum Error {
    /// Transport-level failure: connect, timeout, TLS, broken body.
    #[error("Unable to reach the server: {0}")]
    Network(#[from] reqwest::Error),
    /// The API answered `401 Unauthorized`.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },
    /// Any other `4xx` answer.
    #[error("Request failed ({status}): {message}")]
    Validation { status: StatusCode, message: String },
    #[error("Server error ({status}): {message}")]
    Server { status: StatusCode, message: String },
    #[error("Failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl Error {
    /// Classifies a non-success HTTP status.
    #[must_use]
    pub fn from_status(status: StatusCode, message: String) -> Self {
        if status == StatusCode::UNAUTHORIZED {
            Self::Unauthorized { message }
        } else if status.is_client_error() {
            Self::Validation { status, message }
        } else {
            Self::Server { status, message }
        }
    }

    #[must_use]
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::NotAuthenticated)
    }

    #[must_use]
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, Self::Validation { .. } | Self::InvalidInput(_))
    }

    #[must_use]
    pub fn is_network_failure(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Unauthorized { .. } => Some(StatusCode::UNAUTHORIZED),
            Self::Validation { status, .. } | Self::Server { status, .. } => Some(*status),
            Self::Network(err) => err.status(),
            _ => None,
        }
    }
}
