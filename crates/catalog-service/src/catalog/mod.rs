//! Catalog operations: joined reads, single-product writes and batch ingestion.

pub mod batch;
pub mod error;
pub mod read;
pub mod write;

pub use batch::{BatchOutcome, BatchProcessor, NotificationPolicy, QueuedRecord};
pub use error::CatalogError;
pub use read::{get_by_id, list_available};
pub use write::{create, WriteOptions};
