//! Catalog records: what is stored, what travels on the queue, and what is announced.

pub mod batch;
pub mod fields;
pub mod product;
pub mod stock;
pub mod summary;

pub use batch::{BatchMessage, NumericCoercion, RecordRejection};
pub use product::{NewProduct, Price, Product, ProductWithStock};
pub use stock::Stock;
pub use summary::{BatchSummary, CreatedProduct};
