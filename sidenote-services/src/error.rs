//! Service error taxonomy.
//!
//! Every public service operation either returns a typed result/boolean or
//! raises one of these kinds. Transport errors never escape in any other
//! shape; the panel controller is the only layer that presents them.

/// Error kinds surfaced by the outbound service clients.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Bad user input. Recoverable, shown inline.
    #[error("{0}")]
    Validation(String),
    /// Missing credential or connection settings. Prompts configuration.
    #[error("{0}")]
    Configuration(String),
    /// Non-2xx or malformed response from an external API. The remote
    /// message is carried verbatim when one was supplied.
    #[error("{message}")]
    Remote {
        status: Option<u16>,
        message: String,
    },
    /// The key-value store rejected a write.
    #[error("persistence failed: {0}")]
    Persistence(String),
}

impl From<reqwest::Error> for ServiceError {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
