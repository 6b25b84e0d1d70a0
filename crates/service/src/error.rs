use thiserror::Error;

use shopgauge_core::DomainError;
use shopgauge_db::RepositoryError;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Malformed request input; callers should fix the query and retry.
    #[error(transparent)]
    Domain(#[from] DomainError),
    /// Data-fetch failure from the backing store; not retried internally.
    #[error("data fetch failed: {0}")]
    Repository(#[from] RepositoryError),
    #[error("failed to encode computed view: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ServiceError {
    /// True for errors caused by the request rather than the system.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::Domain(_))
    }
}
