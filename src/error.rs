//! Error types and handling for the `VoyageMind` application

use thiserror::Error;

/// Main error type for the `VoyageMind` application
#[derive(Error, Debug)]
pub enum VoyageMindError {
    /// Model output could not be decoded as structured data
    #[error("Parse error: {message}")]
    Parse { message: String },

    /// Model output decoded but lacks the required itinerary structure
    #[error("Schema error: {message}")]
    Schema { message: String },

    /// An outbound network call failed or timed out
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Document emission failed
    #[error("Render error: {message}")]
    Render { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Input validation errors
    #[error("Invalid input: {message}")]
    Validation { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// General application errors
    #[error("Application error: {message}")]
    General { message: String },
}

impl VoyageMindError {
    /// Create a new parse error
    pub fn parse<S: Into<String>>(message: S) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Create a new schema error
    pub fn schema<S: Into<String>>(message: S) -> Self {
        Self::Schema {
            message: message.into(),
        }
    }

    /// Create a new transport error
    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a new render error
    pub fn render<S: Into<String>>(message: S) -> Self {
        Self::Render {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new general error
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self::General {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            VoyageMindError::Parse { .. } | VoyageMindError::Schema { .. } => {
                "The travel assistant returned an unusable plan. A simplified itinerary was used instead.".to_string()
            }
            VoyageMindError::Transport { .. } => {
                "Unable to reach external services. Please check your internet connection."
                    .to_string()
            }
            VoyageMindError::Render { .. } => {
                "The itinerary document could not be fully rendered.".to_string()
            }
            VoyageMindError::Config { .. } => {
                "Configuration error. Please check your config file and API keys.".to_string()
            }
            VoyageMindError::Validation { message } => {
                format!("Invalid input: {message}")
            }
            VoyageMindError::Io { .. } => {
                "File operation failed. Please check file permissions.".to_string()
            }
            VoyageMindError::General { message } => message.clone(),
        }
    }
}
