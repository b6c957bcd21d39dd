use super::config::CatalogConfig;
use super::worker::{QueueWorker, WorkerTick};
use crate::api::ApiContext;
use crate::catalog::{BatchProcessor, CatalogError};
use crate::import::{FileImporter, MemoryObjects, UploadService};
use crate::notify::RecordingSink;
use crate::queue::{MemoryQueue, QueueActor};
use crate::store::{CatalogStore, MemoryStore};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{error, info};

const ACTOR_BUFFER: usize = 32;

/// The catalog wired entirely in-process.
///
/// `CatalogSystem` owns:
/// - the two table actors behind a [`MemoryStore`]
/// - the queue actor behind a [`MemoryQueue`]
/// - a [`RecordingSink`] in place of SNS and a [`MemoryObjects`] bucket in place of S3
///
/// Handlers and workers are built from it on demand and share the same backends, so a
/// product created through [`CatalogSystem::api`] is visible to the batch processor and
/// vice versa.
///
/// # Example
///
/// ```ignore
/// let system = CatalogSystem::new(CatalogConfig::default());
/// let ctx = system.api();
/// let response = api::handle(&ctx, ApiRequest::new("GET", "/products"), None).await;
/// drop(ctx);
/// system.shutdown().await?;
/// ```
pub struct CatalogSystem {
    pub config: CatalogConfig,
    pub store: Arc<MemoryStore>,
    pub queue: MemoryQueue,
    pub notifier: Arc<RecordingSink>,
    pub objects: Arc<MemoryObjects>,
    handles: Vec<JoinHandle<()>>,
}

impl CatalogSystem {
    /// Spawns every actor. Must be called inside a Tokio runtime.
    pub fn new(config: CatalogConfig) -> Self {
        let (store, mut handles) = MemoryStore::spawn(ACTOR_BUFFER);
        let (queue_actor, queue) =
            QueueActor::new("catalog-items", config.queue_settings(), ACTOR_BUFFER);
        handles.push(tokio::spawn(queue_actor.run()));

        Self {
            config,
            store: Arc::new(store),
            queue,
            notifier: Arc::new(RecordingSink::new()),
            objects: Arc::new(MemoryObjects::new()),
            handles,
        }
    }

    pub fn catalog_store(&self) -> Arc<dyn CatalogStore> {
        self.store.clone()
    }

    pub fn uploads(&self) -> UploadService {
        UploadService::new(
            self.objects.clone(),
            self.config.upload_prefix.clone(),
            self.config.upload_expiry(),
        )
    }

    pub fn importer(&self) -> FileImporter {
        FileImporter::new(
            self.objects.clone(),
            Arc::new(self.queue.clone()),
            self.config.upload_prefix.clone(),
        )
    }

    /// Every route enabled, backed by the in-process store and bucket.
    pub fn api(&self) -> ApiContext {
        ApiContext::new(self.config.api_timeout())
            .with_store(self.catalog_store())
            .with_uploads(Arc::new(self.uploads()))
            .with_write_options(self.config.write_options())
    }

    pub fn processor(&self) -> BatchProcessor {
        BatchProcessor::new(self.catalog_store(), self.notifier.clone())
            .with_coercion(self.config.numeric_coercion)
            .with_policy(self.config.notification_policy)
    }

    pub fn worker(&self) -> QueueWorker {
        QueueWorker::new(
            Arc::new(self.queue.clone()),
            Arc::new(self.processor()),
            self.config.batch_timeout(),
        )
    }

    /// Run the worker until no message is ready or leased.
    ///
    /// Messages left un-acked return after the visibility timeout and are retried until
    /// they are dead-lettered, so this always terminates.
    pub async fn drain_queue(&self) -> Result<Vec<WorkerTick>, CatalogError> {
        let worker = self.worker();
        let mut ticks = Vec::new();
        while !self.queue.stats().await?.is_idle() {
            if let Some(tick) = worker.run_once().await? {
                ticks.push(tick);
            }
        }
        Ok(ticks)
    }

    /// Drops the system's own clients and waits for every actor to stop.
    ///
    /// Clients obtained from the system (API contexts, workers, importers) must be
    /// dropped first, or the actors keep running.
    pub async fn shutdown(self) -> Result<(), String> {
        info!("Shutting down catalog system...");

        drop(self.store);
        drop(self.queue);

        for handle in self.handles {
            if let Err(e) = handle.await {
                error!("Actor task failed: {:?}", e);
                return Err(format!("Actor task failed: {:?}", e));
            }
        }

        info!("Catalog system shutdown complete.");
        Ok(())
    }
}
