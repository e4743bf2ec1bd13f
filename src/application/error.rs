use crate::config::ConfigError;

/// Failures a service operation reports to the HTTP layer.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Bad or missing input; carries the machine-readable code sent to clients.
    #[error("invalid input: {0}")]
    Validation(&'static str),

    #[error("authorization required")]
    Unauthorized,

    #[error("upstream request failed: {0}")]
    Upstream(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("storage failure: {0:#}")]
    Store(anyhow::Error),
}

pub type ServiceResult<T> = std::result::Result<T, ServiceError>;
