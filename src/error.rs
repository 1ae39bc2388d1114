//! Error types and handling for the CWA open-data utilities

use thiserror::Error;

/// Main error type for the `cwa-tools` binaries
#[derive(Error, Debug)]
pub enum CwaError {
    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Malformed JSON input (syntax-level)
    #[error("Malformed JSON: {message}")]
    Syntax { message: String },

    /// A document that parsed as JSON but lacks the expected nested keys
    /// or carries the wrong type at one of them
    #[error("Unexpected document shape: {message}")]
    Shape { message: String },

    /// HTTP transport errors
    #[error("Network error: {message}")]
    Network { message: String },

    /// I/O operation errors
    #[error("I/O error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },
}

impl CwaError {
    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new JSON syntax error
    pub fn syntax<S: Into<String>>(message: S) -> Self {
        Self::Syntax {
            message: message.into(),
        }
    }

    /// Create a new document-shape error
    pub fn shape<S: Into<String>>(message: S) -> Self {
        Self::Shape {
            message: message.into(),
        }
    }

    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            CwaError::Config { .. } => {
                "Configuration error. Please check your config file and environment overrides."
                    .to_string()
            }
            CwaError::Syntax { message } => {
                format!("The document is not valid JSON: {message}")
            }
            CwaError::Shape { message } => {
                format!("The document does not have the expected structure: {message}")
            }
            CwaError::Network { .. } => {
                "Unable to reach the CWA open-data service. Please check your internet connection."
                    .to_string()
            }
            CwaError::Io { .. } => {
                "File operation failed. Please check the path and permissions.".to_string()
            }
        }
    }
}

impl From<serde_json::Error> for CwaError {
    fn from(err: serde_json::Error) -> Self {
        match err.classify() {
            // Data errors mean the JSON was well-formed but a required key
            // was absent or had the wrong type.
            serde_json::error::Category::Data => Self::shape(err.to_string()),
            _ => Self::syntax(err.to_string()),
        }
    }
}

impl From<reqwest::Error> for CwaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::syntax(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let config_err = CwaError::config("missing authorization token");
        assert!(matches!(config_err, CwaError::Config { .. }));

        let network_err = CwaError::network("connection refused");
        assert!(matches!(network_err, CwaError::Network { .. }));

        let shape_err = CwaError::shape("missing field `Dataset`");
        assert!(matches!(shape_err, CwaError::Shape { .. }));
    }

    #[test]
    fn test_user_messages() {
        let config_err = CwaError::config("test");
        assert!(config_err.user_message().contains("Configuration error"));

        let network_err = CwaError::network("test");
        assert!(network_err.user_message().contains("Unable to reach"));

        let shape_err = CwaError::shape("missing field `Locations`");
        assert!(shape_err.user_message().contains("missing field `Locations`"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let cwa_err: CwaError = io_err.into();
        assert!(matches!(cwa_err, CwaError::Io { .. }));
    }

    #[test]
    fn test_serde_error_classification() {
        // Bad syntax
        let err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        assert!(matches!(CwaError::from(err), CwaError::Syntax { .. }));

        // Well-formed JSON, wrong shape for the target type
        #[derive(Debug, serde::Deserialize)]
        struct Expected {
            #[allow(dead_code)]
            name: String,
        }
        let err = serde_json::from_str::<Expected>("{\"other\": 1}").unwrap_err();
        assert!(matches!(CwaError::from(err), CwaError::Shape { .. }));
    }
}
