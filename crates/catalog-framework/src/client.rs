//! # Table Client
//!
//! This module defines the generic client for talking to a `TableActor`.

use crate::entity::TableEntity;
use crate::error::TableError;
use crate::message::TableRequest;
use tokio::sync::{mpsc, oneshot};

/// ## TableClient
///
/// A type-safe async handle to a `TableActor<T>`. It forwards Put/Get/Scan requests
/// over a Tokio mpsc channel and receives results via oneshot channels.
///
/// * **Cloneable** – holds only a sender, so cloning is inexpensive.
/// * **Shutdown by drop** – the actor stops once every clone is gone.
#[derive(Clone)]
pub struct TableClient<T: TableEntity> {
    sender: mpsc::Sender<TableRequest<T>>,
}

impl<T: TableEntity> TableClient<T> {
    pub fn new(sender: mpsc::Sender<TableRequest<T>>) -> Self {
        Self { sender }
    }

    pub async fn put(&self, item: T) -> Result<(), TableError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TableRequest::Put { item, respond_to })
            .await
            .map_err(|_| TableError::ActorClosed)?;
        response.await.map_err(|_| TableError::ActorDropped)?
    }

    pub async fn get(&self, key: T::Key) -> Result<Option<T>, TableError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TableRequest::Get { key, respond_to })
            .await
            .map_err(|_| TableError::ActorClosed)?;
        response.await.map_err(|_| TableError::ActorDropped)?
    }

    pub async fn scan(&self) -> Result<Vec<T>, TableError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(TableRequest::Scan { respond_to })
            .await
            .map_err(|_| TableError::ActorClosed)?;
        response.await.map_err(|_| TableError::ActorDropped)?
    }
}
