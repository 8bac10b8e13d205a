use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    /// Validation errors (bad base URL, bad field value)
    #[error("Validation error: {0}")]
    Validation(String),

    /// Configuration errors (malformed trigger regex, bad settings file)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network errors (connect/DNS/transport failure)
    #[error("Network error: {0}")]
    Network(String),

    /// Non-success HTTP status from a backend service
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    /// Serialization errors (response body did not parse)
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Timeout errors
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get error code string
    pub fn error_code(&self) -> &str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Http { .. } => "HTTP_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Timeout(_) => "TIMEOUT",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error came out of a dispatch (transport/status/parse) as
    /// opposed to a configuration-time failure.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            AppError::Network(_) | AppError::Http { .. } | AppError::Serialization(_) | AppError::Timeout(_)
        )
    }
}

/// Conversion from serde_json::Error
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Conversion from reqwest::Error
impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Timeout(err.to_string())
        } else if err.is_decode() {
            AppError::Serialization(err.to_string())
        } else {
            AppError::Network(err.to_string())
        }
    }
}

/// Conversion from regex::Error
impl From<regex::Error> for AppError {
    fn from(err: regex::Error) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Conversion from config::ConfigError
impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::Configuration(err.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AppError>;
