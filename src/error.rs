use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum BootstrapError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Configuration load error: {0}")]
    Figment(#[from] Box<figment::Error>),

    #[error("Secret retrieval error: {0}")]
    Retrieval(String),

    #[error("IAM role provisioning failed: {0}")]
    Provisioning(#[source] SqlxError),

    #[error("IAM connectivity check failed: {0}")]
    Connectivity(#[source] SqlxError),

    #[error("IAM auth token signing failed: {0}")]
    TokenSigning(String),
}

impl From<figment::Error> for BootstrapError {
    fn from(e: figment::Error) -> Self {
        BootstrapError::Figment(Box::new(e))
    }
}

impl From<serde_json::Error> for BootstrapError {
    fn from(e: serde_json::Error) -> Self {
        BootstrapError::Retrieval(format!("malformed secret payload: {e}"))
    }
}
