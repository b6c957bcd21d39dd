//! Process wiring: configuration, deadlines, AWS clients for the Lambda binaries and
//! the in-process system used by the demo and the tests.

pub mod aws;
pub mod config;
pub mod deadline;
pub mod system;
pub mod worker;

pub use config::{CatalogConfig, ConfigError};
pub use system::CatalogSystem;
pub use worker::{QueueWorker, WorkerTick};
