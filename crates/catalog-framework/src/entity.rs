//! # TableEntity Trait
//!
//! The `TableEntity` trait defines the contract that every record type (Product, Stock, …)
//! must implement to be stored by the generic `TableActor`. It names the key type, the
//! record's own error type, and how to derive the key from a record.
//!
//! # Architecture Note
//! A key-value table only needs two things from a record: where it lives (`key`) and
//! whether it may be written at all (`validate`). Everything else (channels, the message
//! loop, last-write-wins semantics) is written *once* in [`TableActor`](crate::TableActor).
//!
//! # Provided Methods (Hooks)
//! - [`TableEntity::validate`] runs before every put. The default accepts everything.

use std::fmt::{Debug, Display};
use std::hash::Hash;

/// Trait that any record must implement to be managed by a `TableActor`.
///
/// The key is derived from the record itself, so a put is always a keyed upsert:
/// writing the same key twice leaves exactly one row holding the latest value.
pub trait TableEntity: Clone + Send + Sync + Debug + 'static {
    /// The primary key (e.g. a product id).
    type Key: Eq + Hash + Clone + Send + Sync + Display + Debug;

    /// The error type returned when a record is rejected.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Extract the primary key from the record.
    fn key(&self) -> Self::Key;

    /// Called before the record is written. Returning an error rejects the put
    /// and leaves the table unchanged.
    fn validate(&self) -> Result<(), Self::Error> {
        Ok(())
    }
}
