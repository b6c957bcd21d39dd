//! # Table Messages
//!
//! This module defines the message types exchanged between a `TableClient` and its
//! `TableActor`.

use crate::entity::TableEntity;
use crate::error::TableError;
use tokio::sync::oneshot;

/// Type alias for the one-shot response channel used by table actors.
pub type Response<T> = oneshot::Sender<Result<T, TableError>>;

/// Request sent to a table actor.
///
/// The variants mirror the operations of a key-value table with no transactions:
///
/// - **Put**: keyed upsert. The key comes from [`TableEntity::key`].
/// - **Get**: point lookup by key.
/// - **Scan**: every record, in no particular order.
#[derive(Debug)]
pub enum TableRequest<T: TableEntity> {
    Put {
        item: T,
        respond_to: Response<()>,
    },
    Get {
        key: T::Key,
        respond_to: Response<Option<T>>,
    },
    Scan {
        respond_to: Response<Vec<T>>,
    },
}
