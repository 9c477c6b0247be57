//! Error types for swarmctl

use thiserror::Error;

/// Result type for swarmctl operations
pub type Result<T> = std::result::Result<T, SwarmctlError>;

/// swarmctl error types
#[derive(Error, Debug)]
pub enum SwarmctlError {
    /// Wrong number of positional arguments
    #[error("{0}")]
    Args(String),

    #[error("invalid stack name: {0:?}")]
    InvalidStackName(String),

    #[error("bad format of filter (expected name=value): {0}")]
    BadFilter(String),

    #[error("template parsing error: {0}")]
    TemplateParse(String),

    /// Template execution failed against fetched data
    #[error("{0}")]
    Render(String),

    /// Error reported by the remote API, surfaced verbatim
    #[error("{0}")]
    Api(String),

    #[error("Error response from daemon: {0}")]
    Daemon(String),

    #[error("cannot connect to the swarm manager: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
