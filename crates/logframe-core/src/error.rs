use thiserror::Error;

#[derive(Error, Debug)]
pub enum LogframeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config_manager::ConfigError),

    #[error("Unknown domain: {0}")]
    UnknownDomain(String),

    #[error("Invalid graph snapshot: {0}")]
    InvalidSnapshot(String),

    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

pub type Result<T> = std::result::Result<T, LogframeError>;
