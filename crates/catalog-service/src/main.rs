//! # Catalog Demo
//!
//! Runs the whole catalog in-process:
//! 1. Seeds the products and stock tables.
//! 2. Creates a product through `POST /products`.
//! 3. Requests an upload URL, "uploads" a CSV file and imports it onto the queue.
//! 4. Drains the queue through the batch processor.
//! 5. Lists the catalog and prints the batch notifications.
//!
//! ```bash
//! RUST_LOG=info cargo run --bin catalog-demo
//! ```

use catalog_framework::tracing::setup_tracing;
use catalog_service::api::{self, ApiRequest};
use catalog_service::model::{Price, Product, Stock};
use catalog_service::runtime::{CatalogConfig, CatalogSystem};
use catalog_service::store::CatalogStore;
use tracing::{info, Instrument};

const LOCAL_BUCKET: &str = "local-import";

const UPLOADED_CSV: &str = "\
title,description,price,count
Grey Wool Beanie,Ribbed knit,1299,60
Canvas Tote Bag,Heavy cotton canvas,999,
Striped Socks,,499,120
Broken Row,missing price,,5
";

fn seed_catalog() -> Vec<(Product, u64)> {
    vec![
        (
            Product::new(
                "19befc55-ea39-4ff0-8b63-e3a3c8b94f53",
                "Classic White T-Shirt",
                Price::from_units(1499),
            )
            .with_description("100% cotton, unisex, available in all sizes"),
            50,
        ),
        (
            Product::new(
                "889b35f2-4c60-4265-9ea7-b81ebbbdee39",
                "Blue Denim Jeans",
                Price::from_units(3999),
            )
            .with_description("Slim fit, stretchable, various waist sizes"),
            30,
        ),
        (
            Product::new(
                "f4850e7b-fc3d-40f3-a532-64919cec3e0b",
                "Red Hoodie",
                Price::from_units(2999),
            )
            .with_description("Soft fleece, kangaroo pocket, drawstring hood"),
            25,
        ),
        (
            Product::new(
                "c7630b15-10e5-4244-a003-8dcc2342d0c0",
                "Black Leather Jacket",
                Price::from_units(8999),
            )
            .with_description("Genuine leather, biker style, limited edition"),
            10,
        ),
        (
            Product::new(
                "1169cf53-f439-4130-98d3-395ee35c6dcd",
                "Green Chino Shorts",
                Price::from_units(2499),
            )
            .with_description("Lightweight, breathable, perfect for summer"),
            40,
        ),
    ]
}

#[tokio::main]
async fn main() -> Result<(), String> {
    setup_tracing();

    let config = CatalogConfig::load().map_err(|e| e.to_string())?;
    info!("Starting catalog demo");
    let system = CatalogSystem::new(config);

    async {
        for (product, count) in seed_catalog() {
            let stock = Stock::new(product.id.clone(), count);
            system.store.put_product(product).await?;
            system.store.put_stock(stock).await?;
        }
        Ok::<_, catalog_service::store::StoreError>(())
    }
    .instrument(tracing::info_span!("seed"))
    .await
    .map_err(|e| e.to_string())?;

    let ctx = system.api();

    let created = api::handle(
        &ctx,
        ApiRequest::new("POST", "/products").with_body(
            r#"{"title":"Yellow Raincoat","description":"Waterproof, packable","price":5499}"#,
        ),
        None,
    )
    .instrument(tracing::info_span!("create_product"))
    .await;
    info!(status = created.status, body = %created.body, "POST /products");

    let upload = api::handle(
        &ctx,
        ApiRequest::new("GET", "/import").with_query("name", "products.csv"),
        None,
    )
    .await;
    info!(status = upload.status, body = %upload.body, "GET /import");

    let key = format!("{}products.csv", system.config.upload_prefix);
    system.objects.put_object(LOCAL_BUCKET, &key, UPLOADED_CSV).await;
    let enqueued = system
        .importer()
        .import_object(LOCAL_BUCKET, &key)
        .instrument(tracing::info_span!("import"))
        .await
        .map_err(|e| e.to_string())?;
    info!(enqueued, "CSV rows enqueued");

    let ticks = system
        .drain_queue()
        .instrument(tracing::info_span!("batch_processing"))
        .await
        .map_err(|e| e.to_string())?;
    info!(batches = ticks.len(), "Queue drained");

    let listing = api::handle(&ctx, ApiRequest::new("GET", "/product/available"), None).await;
    let products: Vec<serde_json::Value> =
        serde_json::from_str(&listing.body).map_err(|e| e.to_string())?;
    info!(status = listing.status, count = products.len(), "GET /product/available");
    for product in &products {
        info!(
            title = %product["title"],
            price = %product["price"],
            count = %product["count"],
            "Available"
        );
    }

    for notification in system.notifier.sent().await {
        info!(subject = %notification.subject, "Notification sent");
    }

    drop(ctx);
    system.shutdown().await?;

    info!("Demo completed successfully");
    Ok(())
}
