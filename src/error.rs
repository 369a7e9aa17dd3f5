use querylab_core::PlaygroundError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("HTTP {status}: {message}")]
    Http { status: u16, message: String },

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Decode error: {0}")]
    Decode(String),

    #[error("Playground error: {0}")]
    Playground(#[from] PlaygroundError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlError(#[from] toml::de::Error),
}

pub type LabResult<T> = Result<T, LabError>;

impl serde::Serialize for LabError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.collect_str(self)
    }
}

impl From<reqwest::Error> for LabError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            LabError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            LabError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            LabError::Network(err.to_string())
        }
    }
}

impl From<toml::ser::Error> for LabError {
    fn from(err: toml::ser::Error) -> Self {
        LabError::Config(err.to_string())
    }
}

impl LabError {
    /// Whether retrying later could succeed
    pub fn is_transient(&self) -> bool {
        match self {
            LabError::Network(_) => true,
            LabError::Http { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = LabError::Config("missing rowstore.url".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing rowstore.url");

        let err = LabError::Network("connection refused".to_string());
        assert_eq!(err.to_string(), "Network error: connection refused");

        let err = LabError::Http {
            status: 404,
            message: "relation does not exist".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 404: relation does not exist");

        let err = LabError::Auth("invalid credentials".to_string());
        assert_eq!(err.to_string(), "Authentication failed: invalid credentials");

        let err = LabError::NotFound("table 'lessons'".to_string());
        assert_eq!(err.to_string(), "Not found: table 'lessons'");

        let err = LabError::from(PlaygroundError::InvalidName);
        assert_eq!(
            err.to_string(),
            "Playground error: Invalid name: a saved query needs a non-empty name"
        );
    }

    #[test]
    fn test_transient_errors() {
        assert!(LabError::Network("timeout".into()).is_transient());
        assert!(LabError::Http {
            status: 503,
            message: String::new()
        }
        .is_transient());
        assert!(!LabError::Http {
            status: 400,
            message: String::new()
        }
        .is_transient());
        assert!(!LabError::Auth("nope".into()).is_transient());
    }

    #[test]
    fn test_error_debug() {
        let err = LabError::Config("test".to_string());
        let debug = format!("{:?}", err);
        assert!(debug.contains("Config"));
    }

    #[test]
    fn test_lab_result_type() {
        let ok_result: LabResult<i32> = Ok(42);
        assert_eq!(ok_result.unwrap(), 42);

        let err_result: LabResult<i32> = Err(LabError::Decode("test".to_string()));
        assert!(err_result.is_err());
    }
}
