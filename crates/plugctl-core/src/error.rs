use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlugError {
    #[error("config file not found: {0}")]
    ConfigNotFound(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("invalid state '{0}': expected 'on' or 'off'")]
    InvalidState(String),

    #[error("email delivery failed: {0}")]
    Email(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlugError>;
