//! # Queue Actor
//!
//! An in-process stand-in for SQS, built the same way as the table actors: one task
//! owns every message and serves requests sequentially over a channel.
//!
//! Lease bookkeeping uses `tokio::time::Instant`, so tests can drive visibility
//! timeouts with a paused clock.

use super::{Delivery, IngestionQueue, MessageAttributes, QueueError, QueueSettings};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Notify};
use tokio::time::Instant;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

type Response<T> = oneshot::Sender<Result<T, QueueError>>;

#[derive(Debug, Clone)]
struct StoredMessage {
    id: String,
    body: String,
    attributes: MessageAttributes,
    receive_count: u32,
}

struct Lease {
    message: StoredMessage,
    expires_at: Instant,
}

/// Counts of messages by state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub ready: usize,
    pub in_flight: usize,
    pub dead: usize,
}

impl QueueStats {
    /// Nothing left to deliver and nothing awaiting an ack.
    pub fn is_idle(&self) -> bool {
        self.ready == 0 && self.in_flight == 0
    }
}

#[derive(Debug)]
enum QueueRequest {
    Send {
        body: String,
        attributes: MessageAttributes,
        respond_to: Response<String>,
    },
    Poll {
        max: usize,
        respond_to: Response<Vec<Delivery>>,
    },
    Ack {
        receipt: String,
        respond_to: Response<()>,
    },
    Stats {
        respond_to: Response<QueueStats>,
    },
    DeadLetters {
        respond_to: Response<Vec<Delivery>>,
    },
}

/// Owns the ready list, the leases and the dead-letter list.
pub struct QueueActor {
    name: String,
    settings: QueueSettings,
    receiver: mpsc::Receiver<QueueRequest>,
    arrivals: Arc<Notify>,
    ready: VecDeque<StoredMessage>,
    leases: HashMap<String, Lease>,
    dead: Vec<StoredMessage>,
}

impl QueueActor {
    pub fn new(
        name: impl Into<String>,
        settings: QueueSettings,
        buffer_size: usize,
    ) -> (Self, MemoryQueue) {
        let (sender, receiver) = mpsc::channel(buffer_size);
        let arrivals = Arc::new(Notify::new());
        let client = MemoryQueue {
            sender,
            arrivals: arrivals.clone(),
            settings: settings.clone(),
        };
        let actor = Self {
            name: name.into(),
            settings,
            receiver,
            arrivals,
            ready: VecDeque::new(),
            leases: HashMap::new(),
            dead: Vec::new(),
        };
        (actor, client)
    }

    pub async fn run(mut self) {
        info!(queue = %self.name, "Queue started");

        while let Some(request) = self.receiver.recv().await {
            self.reclaim_expired(Instant::now());
            match request {
                QueueRequest::Send {
                    body,
                    attributes,
                    respond_to,
                } => {
                    let id = Uuid::new_v4().to_string();
                    debug!(queue = %self.name, message_id = %id, "Enqueued");
                    self.ready.push_back(StoredMessage {
                        id: id.clone(),
                        body,
                        attributes,
                        receive_count: 0,
                    });
                    self.arrivals.notify_waiters();
                    let _ = respond_to.send(Ok(id));
                }
                QueueRequest::Poll { max, respond_to } => {
                    let deliveries = self.lease(max, Instant::now());
                    let _ = respond_to.send(Ok(deliveries));
                }
                QueueRequest::Ack {
                    receipt,
                    respond_to,
                } => {
                    let result = match self.leases.remove(&receipt) {
                        Some(lease) => {
                            debug!(queue = %self.name, message_id = %lease.message.id, "Acked");
                            Ok(())
                        }
                        None => Err(QueueError::UnknownReceipt(receipt)),
                    };
                    let _ = respond_to.send(result);
                }
                QueueRequest::Stats { respond_to } => {
                    let _ = respond_to.send(Ok(self.stats()));
                }
                QueueRequest::DeadLetters { respond_to } => {
                    let dead = self
                        .dead
                        .iter()
                        .map(|m| Delivery {
                            message_id: m.id.clone(),
                            receipt: String::new(),
                            body: m.body.clone(),
                            receive_count: m.receive_count,
                            attributes: m.attributes.clone(),
                        })
                        .collect();
                    let _ = respond_to.send(Ok(dead));
                }
            }
        }

        let stats = self.stats();
        info!(
            queue = %self.name,
            ready = stats.ready,
            in_flight = stats.in_flight,
            dead = stats.dead,
            "Shutdown"
        );
    }

    fn stats(&self) -> QueueStats {
        QueueStats {
            ready: self.ready.len(),
            in_flight: self.leases.len(),
            dead: self.dead.len(),
        }
    }

    fn lease(&mut self, max: usize, now: Instant) -> Vec<Delivery> {
        let mut deliveries = Vec::new();
        while deliveries.len() < max {
            let Some(mut message) = self.ready.pop_front() else {
                break;
            };
            message.receive_count += 1;
            let receipt = Uuid::new_v4().to_string();
            deliveries.push(Delivery {
                message_id: message.id.clone(),
                receipt: receipt.clone(),
                body: message.body.clone(),
                receive_count: message.receive_count,
                attributes: message.attributes.clone(),
            });
            self.leases.insert(
                receipt,
                Lease {
                    message,
                    expires_at: now + self.settings.visibility_timeout,
                },
            );
        }
        if !deliveries.is_empty() {
            debug!(queue = %self.name, count = deliveries.len(), "Leased");
        }
        deliveries
    }

    fn reclaim_expired(&mut self, now: Instant) {
        let expired: Vec<String> = self
            .leases
            .iter()
            .filter(|(_, lease)| lease.expires_at <= now)
            .map(|(receipt, _)| receipt.clone())
            .collect();

        for receipt in expired {
            let Some(lease) = self.leases.remove(&receipt) else {
                continue;
            };
            let message = lease.message;
            if message.receive_count >= self.settings.max_receive_count {
                warn!(
                    queue = %self.name,
                    message_id = %message.id,
                    receive_count = message.receive_count,
                    "Dead-lettered"
                );
                self.dead.push(message);
            } else {
                debug!(queue = %self.name, message_id = %message.id, "Lease expired, requeued");
                self.ready.push_back(message);
            }
        }
    }
}

/// Cloneable handle to a [`QueueActor`].
#[derive(Clone)]
pub struct MemoryQueue {
    sender: mpsc::Sender<QueueRequest>,
    arrivals: Arc<Notify>,
    settings: QueueSettings,
}

impl MemoryQueue {
    async fn request<T>(
        &self,
        build: impl FnOnce(Response<T>) -> QueueRequest,
    ) -> Result<T, QueueError> {
        let (respond_to, response) = oneshot::channel();
        self.sender
            .send(build(respond_to))
            .await
            .map_err(|_| QueueError::Closed)?;
        response.await.map_err(|_| QueueError::Dropped)?
    }

    async fn poll(&self, max: usize) -> Result<Vec<Delivery>, QueueError> {
        self.request(|respond_to| QueueRequest::Poll { max, respond_to })
            .await
    }

    pub async fn stats(&self) -> Result<QueueStats, QueueError> {
        self.request(|respond_to| QueueRequest::Stats { respond_to })
            .await
    }

    pub async fn dead_letters(&self) -> Result<Vec<Delivery>, QueueError> {
        self.request(|respond_to| QueueRequest::DeadLetters { respond_to })
            .await
    }

    pub fn settings(&self) -> &QueueSettings {
        &self.settings
    }
}

#[async_trait]
impl IngestionQueue for MemoryQueue {
    async fn send_with_attributes(
        &self,
        body: String,
        attributes: MessageAttributes,
    ) -> Result<String, QueueError> {
        self.request(|respond_to| QueueRequest::Send {
            body,
            attributes,
            respond_to,
        })
        .await
    }

    /// Collects messages until a full batch is leased or the batching window closes.
    #[instrument(skip(self))]
    async fn receive(&self) -> Result<Vec<Delivery>, QueueError> {
        let deadline = Instant::now() + self.settings.batching_window;
        let mut batch = Vec::new();

        loop {
            let arrived = self.arrivals.notified();
            batch.extend(self.poll(self.settings.batch_size - batch.len()).await?);
            if batch.len() >= self.settings.batch_size || Instant::now() >= deadline {
                break;
            }
            if tokio::time::timeout_at(deadline, arrived).await.is_err() {
                batch.extend(self.poll(self.settings.batch_size - batch.len()).await?);
                break;
            }
        }

        Ok(batch)
    }

    async fn ack(&self, receipt: &str) -> Result<(), QueueError> {
        let receipt = receipt.to_string();
        self.request(|respond_to| QueueRequest::Ack {
            receipt,
            respond_to,
        })
        .await
    }
}
