//! # Catalog Framework
//!
//! Building blocks for in-process, actor-backed key-value tables.
//!
//! A production catalog lives in a managed key-value store where every write is a keyed
//! upsert and reads are either point lookups or full scans. This crate gives the same
//! contract an in-process shape so that local runs and tests behave like the real store
//! without any network:
//!
//! 1. **Record Layer** ([`TableEntity`]) - what a row is and how its key is derived.
//! 2. **Runtime Layer** ([`TableActor`]) - one Tokio task per table, owning a `HashMap`.
//! 3. **Interface Layer** ([`TableClient`], [`TableAccess`]) - cheap, cloneable handles.
//!
//! ## Concurrency Model
//!
//! - Each table runs in its own Tokio task.
//! - Requests are processed **sequentially** within a table (no locks).
//! - Puts are upserts, so concurrent writers to one key resolve to last-write-wins.
//! - A table shuts down when its last client is dropped.
//!
//! ## Testing
//!
//! The [`mock`] module provides `MockTable`, a scripted stand-in that hands out real
//! `TableClient`s. Use it to inject failures or to assert that no request was made.
//!
//! ## Observability
//!
//! See [`tracing`] for subscriber setup shared by every binary in the workspace.

pub mod actor;
pub mod client;
pub mod client_trait;
pub mod entity;
pub mod error;
pub mod message;
pub mod mock;
pub mod tracing;

// Re-export core types for convenience
pub use actor::TableActor;
pub use client::TableClient;
pub use client_trait::TableAccess;
pub use entity::TableEntity;
pub use error::TableError;
pub use message::{Response, TableRequest};
