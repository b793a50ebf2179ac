use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    /// A mandatory credential was not provided by any configuration layer.
    #[error("{var} is not set in environment variables")]
    Missing { var: &'static str },

    #[error("Configuration error: {0}")]
    Load(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Short error code string, used as a structured log field.
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::Missing { .. } => "CONFIG_MISSING",
            ConfigError::Load(_) => "CONFIG_LOAD",
            ConfigError::Invalid(_) => "CONFIG_INVALID",
        }
    }
}

pub type Result<T> = std::result::Result<T, ConfigError>;
