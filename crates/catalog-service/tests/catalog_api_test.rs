use catalog_framework::mock::MockTable;
use catalog_framework::TableError;
use catalog_service::api::{self, ApiContext, ApiRequest, ApiResponse};
use catalog_service::model::{Price, Product, Stock};
use catalog_service::runtime::{CatalogConfig, CatalogSystem};
use catalog_service::store::{CatalogStore, MemoryStore};
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;

fn body(response: &ApiResponse) -> Value {
    serde_json::from_str(&response.body).expect("response body is JSON")
}

async fn seeded_system() -> CatalogSystem {
    let system = CatalogSystem::new(CatalogConfig::default());
    system
        .store
        .put_product(Product::new("p1", "Red Hoodie", Price::from_units(2999)).with_description("Soft fleece"))
        .await
        .unwrap();
    system
        .store
        .put_product(Product::new("p2", "Blue Mug", Price::parse("12.5").unwrap()))
        .await
        .unwrap();
    system.store.put_stock(Stock::new("p1", 25)).await.unwrap();
    system
}

/// Pre-flight requests succeed on every route, before any routing or validation.
#[tokio::test]
async fn test_options_on_every_route() {
    let system = CatalogSystem::new(CatalogConfig::default());
    let ctx = system.api();

    for path in ["/products", "/product/available", "/products/p1", "/import", "/nowhere"] {
        let response = api::handle(&ctx, ApiRequest::new("OPTIONS", path), None).await;
        assert_eq!(response.status, 200, "{path}");
        assert_eq!(response.body, "", "{path}");
        assert_eq!(response.header("Access-Control-Allow-Origin"), Some("*"));
        assert_eq!(response.header("Access-Control-Allow-Headers"), Some("*"));
        assert!(response.header("Access-Control-Allow-Methods").unwrap().contains("OPTIONS"));
    }
}

/// Both list routes join stock onto products; missing stock reads as 0.
#[tokio::test]
async fn test_list_joins_stock() {
    let system = seeded_system().await;
    let ctx = system.api();

    for path in ["/products", "/product/available"] {
        let response = api::handle(&ctx, ApiRequest::new("GET", path), None).await;
        assert_eq!(response.status, 200);
        assert_eq!(response.header("Content-Type"), Some("application/json"));

        let mut listed = body(&response).as_array().unwrap().clone();
        listed.sort_by_key(|p| p["id"].as_str().unwrap().to_string());
        assert_eq!(
            listed,
            vec![
                json!({"id": "p1", "title": "Red Hoodie", "description": "Soft fleece", "price": 2999, "image": "", "count": 25}),
                json!({"id": "p2", "title": "Blue Mug", "description": "", "price": 12.5, "image": "", "count": 0}),
            ]
        );
    }
}

#[tokio::test]
async fn test_list_empty_catalog() {
    let system = CatalogSystem::new(CatalogConfig::default());
    let response = api::handle(&system.api(), ApiRequest::new("GET", "/products"), None).await;
    assert_eq!(response.status, 200);
    assert_eq!(body(&response), json!([]));
}

#[tokio::test]
async fn test_get_by_id() {
    let system = seeded_system().await;
    let ctx = system.api();

    let found = api::handle(&ctx, ApiRequest::new("GET", "/products/p1"), None).await;
    assert_eq!(found.status, 200);
    assert_eq!(body(&found)["count"], 25);
    assert_eq!(found.header("Access-Control-Allow-Methods"), Some("GET, OPTIONS"));

    let no_stock = api::handle(&ctx, ApiRequest::new("GET", "/products/p2"), None).await;
    assert_eq!(body(&no_stock)["count"], 0);

    let missing = api::handle(&ctx, ApiRequest::new("GET", "/products/nope"), None).await;
    assert_eq!(missing.status, 404);
    assert_eq!(body(&missing), json!({"message": "Product not found"}));

    let empty = api::handle(
        &ctx,
        ApiRequest::new("GET", "/products/x").with_path_param("productId", ""),
        None,
    )
    .await;
    assert_eq!(empty.status, 400);
    assert_eq!(body(&empty), json!({"message": "Product ID is required"}));
}

/// An empty id is rejected before either table is touched.
#[tokio::test]
async fn test_empty_id_never_reaches_the_store() {
    let products = MockTable::<Product>::new();
    let stock = MockTable::<Stock>::new();
    let store = MemoryStore::from_clients(products.client(), stock.client());
    let ctx = ApiContext::new(Duration::from_secs(6)).with_store(Arc::new(store));

    let response = api::handle(
        &ctx,
        ApiRequest::new("GET", "/products/x").with_path_param("productId", ""),
        None,
    )
    .await;
    assert_eq!(response.status, 400);
    assert_eq!(body(&response), json!({"message": "Product ID is required"}));

    products.verify();
    stock.verify();
}

/// A stock row without a product is not enough for a by-id read.
#[tokio::test]
async fn test_orphan_stock_is_not_found() {
    let system = CatalogSystem::new(CatalogConfig::default());
    system.store.put_stock(Stock::new("ghost", 3)).await.unwrap();

    let response = api::handle(&system.api(), ApiRequest::new("GET", "/products/ghost"), None).await;
    assert_eq!(response.status, 404);
}

#[tokio::test]
async fn test_create_product() {
    let system = CatalogSystem::new(CatalogConfig::default());
    let ctx = system.api();

    let response = api::handle(
        &ctx,
        ApiRequest::new("POST", "/products")
            .with_body(r#"{"title":"Yellow Raincoat","price":5499,"description":"Waterproof"}"#),
        None,
    )
    .await;
    assert_eq!(response.status, 201);
    assert_eq!(response.header("Access-Control-Allow-Methods"), Some("POST, OPTIONS"));

    let created = body(&response);
    let id = created["id"].as_str().unwrap();
    assert_eq!(id.len(), 36, "UUID v4 id");
    assert_eq!(created["title"], "Yellow Raincoat");
    assert_eq!(created["price"], 5499);
    assert_eq!(created["image"], "");

    let stored = system.store.get_product(id).await.unwrap().unwrap();
    assert_eq!(stored.description, "Waterproof");
    assert_eq!(system.store.get_stock(id).await.unwrap(), None, "no stock row by default");

    let read_back = api::handle(&ctx, ApiRequest::new("GET", &format!("/products/{id}")), None).await;
    assert_eq!(body(&read_back)["count"], 0);
}

#[tokio::test]
async fn test_create_can_initialise_stock() {
    let config = CatalogConfig {
        init_stock_on_create: true,
        ..CatalogConfig::default()
    };
    let system = CatalogSystem::new(config);

    let response = api::handle(
        &system.api(),
        ApiRequest::new("POST", "/products").with_body(r#"{"title":"Cap","price":"9.5"}"#),
        None,
    )
    .await;
    assert_eq!(response.status, 201);

    let id = body(&response)["id"].as_str().unwrap().to_string();
    assert_eq!(system.store.get_stock(&id).await.unwrap(), Some(Stock::new(id.clone(), 0)));
}

/// Rejected creates never reach the store.
#[tokio::test]
async fn test_create_validation() {
    let system = CatalogSystem::new(CatalogConfig::default());
    let ctx = system.api();

    let cases = [
        (r#"{"price":10}"#, "Title and price are required"),
        (r#"{"title":"","price":10}"#, "Title and price are required"),
        (r#"{"title":"Cap"}"#, "Title and price are required"),
        (r#"{"title":"Cap","price":0}"#, "Title and price are required"),
        (r#"{"title":"Cap","price":null}"#, "Title and price are required"),
        (r#"{"title":"Cap","price":-3}"#, "Price must be a non-negative number"),
        (r#"{"title":"Cap","price":"cheap"}"#, "Price must be a non-negative number"),
        ("{not json", "Invalid JSON body"),
    ];
    for (payload, message) in cases {
        let response = api::handle(&ctx, ApiRequest::new("POST", "/products").with_body(payload), None).await;
        assert_eq!(response.status, 400, "{payload}");
        assert_eq!(body(&response), json!({ "message": message }), "{payload}");
    }

    let missing_body = api::handle(&ctx, ApiRequest::new("POST", "/products"), None).await;
    assert_eq!(missing_body.status, 400);

    assert!(system.store.scan_products().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_unknown_route() {
    let system = CatalogSystem::new(CatalogConfig::default());
    let response = api::handle(&system.api(), ApiRequest::new("DELETE", "/products/p1"), None).await;
    assert_eq!(response.status, 404);
    assert_eq!(body(&response), json!({"message": "Not found"}));
}

#[tokio::test]
async fn test_import_upload_url() {
    let system = CatalogSystem::new(CatalogConfig::default());
    let ctx = system.api();

    let signed = api::handle(
        &ctx,
        ApiRequest::new("GET", "/import").with_query("name", "products.csv"),
        None,
    )
    .await;
    assert_eq!(signed.status, 200);
    let url = body(&signed)["signedUrl"].as_str().unwrap().to_string();
    assert!(url.contains("uploaded/products.csv"));
    assert!(url.contains("text/csv"));
    assert!(url.contains("expires=900"));

    let missing = api::handle(&ctx, ApiRequest::new("GET", "/import"), None).await;
    assert_eq!(missing.status, 400);
    assert_eq!(body(&missing), json!({"message": "Missing required parameter: name"}));
}

/// Routes whose collaborator was not configured are not served.
#[tokio::test]
async fn test_routes_follow_configured_collaborators() {
    let system = CatalogSystem::new(CatalogConfig::default());
    let ctx = ApiContext::new(Duration::from_secs(6)).with_store(system.catalog_store());

    let response = api::handle(
        &ctx,
        ApiRequest::new("GET", "/import").with_query("name", "a.csv"),
        None,
    )
    .await;
    assert_eq!(response.status, 404);
}

/// Store faults surface as a bare 500; details stay in the logs.
#[tokio::test]
async fn test_store_fault_is_internal_error() {
    let mut products = MockTable::<Product>::new();
    let stock = MockTable::<Stock>::new();
    products.expect_scan().return_err(TableError::ActorClosed);
    products.expect_get("p1".to_string()).return_err(TableError::ActorClosed);

    let store = MemoryStore::from_clients(products.client(), stock.client());
    let ctx = ApiContext::new(Duration::from_secs(6)).with_store(Arc::new(store));

    let list = api::handle(&ctx, ApiRequest::new("GET", "/products"), None).await;
    assert_eq!(list.status, 500);
    assert_eq!(body(&list), json!({"message": "Internal Server Error"}));

    let by_id = api::handle(&ctx, ApiRequest::new("GET", "/products/p1"), None).await;
    assert_eq!(by_id.status, 500);

    products.verify();
    stock.verify();
}

/// An expired invocation deadline fails the call instead of waiting on the store.
#[tokio::test]
async fn test_expired_deadline_is_internal_error() {
    let system = seeded_system().await;
    let past = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
        - 1_000;

    let response = api::handle(&system.api(), ApiRequest::new("GET", "/products"), Some(past)).await;
    assert_eq!(response.status, 500);
    assert_eq!(body(&response), json!({"message": "Internal Server Error"}));
}
