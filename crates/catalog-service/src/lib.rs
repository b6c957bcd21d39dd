//! # Catalog Service
//!
//! Product catalog reads and writes plus CSV batch ingestion for a storefront.
//!
//! ## Components
//!
//! - **[model]**: Product, Stock, queue records and batch summaries.
//! - **[store]**: The two catalog tables behind [`store::CatalogStore`], on DynamoDB or
//!   on in-process [`TableActor`](catalog_framework::TableActor)s.
//! - **[catalog]**: Joined reads, single-product creation and the batch processor.
//! - **[queue]** / **[notify]**: Ingestion queue (SQS or a local queue actor) and batch
//!   notifications (SNS or a recorder).
//! - **[import]**: Signed CSV uploads and the CSV-to-queue parser.
//! - **[auth]**: Basic-credentials TOKEN authorizer.
//! - **[api]**: API Gateway routing with CORS.
//! - **[runtime]**: Configuration, deadlines and the in-process [`runtime::CatalogSystem`].
//!
//! ## Flow
//!
//! ```text
//! client ──► api ──► catalog ──► store
//! CSV upload ──► import ──► queue ──► catalog::BatchProcessor ──► store
//!                                                  └──► notify
//! ```
//!
//! Every binary under `src/bin` is one Lambda function; `catalog-demo` runs the whole
//! flow in-process.

pub mod api;
pub mod auth;
pub mod catalog;
pub mod import;
pub mod model;
pub mod notify;
pub mod queue;
pub mod runtime;
pub mod store;
