//! # Observability & Tracing
//!
//! Initialises structured logging once per binary.
//!
//! - [`setup_tracing`] is the compact, target-less format used for local runs.
//! - [`setup_lambda_tracing`] emits one JSON object per line without timestamps,
//!   because CloudWatch adds the ingestion time itself.
//!
//! Both honour `RUST_LOG`:
//!
//! ```bash
//! RUST_LOG=info cargo run --bin catalog-demo
//! RUST_LOG=catalog_service=debug,catalog_framework=debug cargo run --bin catalog-demo
//! ```
//!
//! With `debug`, table actors log every Put/Get/Scan with the record key, and the
//! batch processor logs each parsed record once at the start of its span.

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false) // table/entity names are carried as fields instead
        .compact()
        .init();
}

pub fn setup_lambda_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_target(false)
        .without_time()
        .json()
        .with_current_span(false)
        .init();
}
