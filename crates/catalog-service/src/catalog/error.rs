use crate::import::ImportError;
use crate::notify::NotifyError;
use crate::queue::QueueError;
use crate::store::StoreError;
use std::time::Duration;

/// Service-level failures, shared by the HTTP handlers and the batch processor.
///
/// Client errors carry the message that is returned verbatim; every other variant is
/// logged in full and surfaced to HTTP clients only as `Internal Server Error`.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("{0}")]
    BadRequest(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] NotifyError),
    #[error(transparent)]
    Queue(#[from] QueueError),
    #[error("{0}")]
    Internal(String),
    #[error("deadline of {0:?} exceeded")]
    DeadlineExceeded(Duration),
}

impl From<ImportError> for CatalogError {
    fn from(e: ImportError) -> Self {
        match e {
            ImportError::MissingName => CatalogError::BadRequest(e.to_string()),
            ImportError::Queue(e) => CatalogError::Queue(e),
            other => CatalogError::Internal(other.to_string()),
        }
    }
}

pub const INTERNAL_SERVER_ERROR: &str = "Internal Server Error";

impl CatalogError {
    pub fn status_code(&self) -> u16 {
        match self {
            CatalogError::BadRequest(_) | CatalogError::Validation(_) => 400,
            CatalogError::NotFound(_) => 404,
            _ => 500,
        }
    }

    /// The message a client is allowed to see.
    pub fn public_message(&self) -> String {
        match self {
            CatalogError::BadRequest(m) | CatalogError::Validation(m) | CatalogError::NotFound(m) => {
                m.clone()
            }
            _ => INTERNAL_SERVER_ERROR.to_string(),
        }
    }

    pub fn is_client_error(&self) -> bool {
        self.status_code() < 500
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_internal_details_are_hidden() {
        let err = CatalogError::Store(StoreError::Request {
            table: "products".to_string(),
            operation: "Scan",
            reason: "AccessDenied".to_string(),
        });
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.public_message(), "Internal Server Error");
        assert!(err.to_string().contains("AccessDenied"));
    }

    #[test]
    fn test_client_errors_keep_message() {
        let err = CatalogError::NotFound("Product not found".to_string());
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.public_message(), "Product not found");
        assert!(err.is_client_error());
        assert!(!CatalogError::DeadlineExceeded(Duration::from_secs(6)).is_client_error());
    }
}
