//! Route table for the catalog and import endpoints.

use super::{ApiRequest, ApiResponse, METHODS_ANY, METHODS_GET, METHODS_POST};
use crate::catalog::{self, CatalogError, WriteOptions};
use crate::import::UploadService;
use crate::model::NewProduct;
use crate::runtime::deadline::{effective_timeout, with_deadline};
use crate::store::CatalogStore;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, instrument, warn};

/// Collaborators for the HTTP handlers, built once per process.
///
/// A deployment serves only the routes whose collaborator it was given; the others
/// answer 404.
#[derive(Clone)]
pub struct ApiContext {
    pub store: Option<Arc<dyn CatalogStore>>,
    pub uploads: Option<Arc<UploadService>>,
    pub write_options: WriteOptions,
    pub timeout: Duration,
}

impl ApiContext {
    pub fn new(timeout: Duration) -> Self {
        Self {
            store: None,
            uploads: None,
            write_options: WriteOptions::default(),
            timeout,
        }
    }

    pub fn with_store(mut self, store: Arc<dyn CatalogStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_uploads(mut self, uploads: Arc<UploadService>) -> Self {
        self.uploads = Some(uploads);
        self
    }

    pub fn with_write_options(mut self, options: WriteOptions) -> Self {
        self.write_options = options;
        self
    }
}

enum Route<'a> {
    ListProducts,
    ProductById(Option<&'a str>),
    CreateProduct,
    RequestUpload,
    NotFound,
}

fn methods_for(path: &str) -> &'static str {
    match segments(path).as_slice() {
        ["products"] | ["import"] => METHODS_ANY,
        ["product", "available"] | ["products", _] => METHODS_GET,
        _ => METHODS_ANY,
    }
}

fn segments(path: &str) -> Vec<&str> {
    let trimmed = path.strip_prefix('/').unwrap_or(path);
    if trimmed.is_empty() {
        Vec::new()
    } else {
        trimmed.split('/').collect()
    }
}

fn resolve<'a>(request: &'a ApiRequest) -> Route<'a> {
    let method = request.method.to_ascii_uppercase();
    match (method.as_str(), segments(&request.path).as_slice()) {
        ("GET", ["products"]) | ("GET", ["product", "available"]) => Route::ListProducts,
        ("GET", ["products", id]) => {
            let id = request
                .path_params
                .get("productId")
                .map(String::as_str)
                .unwrap_or(*id);
            Route::ProductById(Some(id))
        }
        ("POST", ["products"]) => Route::CreateProduct,
        ("GET", ["import"]) => Route::RequestUpload,
        _ => Route::NotFound,
    }
}

/// Handle one API Gateway request.
///
/// `OPTIONS` is answered before anything else. Every other request runs under the
/// context timeout, shortened to the invocation deadline when one is given.
#[instrument(skip(ctx, request), fields(method = %request.method, path = %request.path))]
pub async fn handle(ctx: &ApiContext, request: ApiRequest, deadline_ms: Option<u64>) -> ApiResponse {
    if request.method.eq_ignore_ascii_case("OPTIONS") {
        return ApiResponse::preflight(methods_for(&request.path));
    }

    let limit = effective_timeout(ctx.timeout, deadline_ms);
    match with_deadline(limit, dispatch(ctx, &request)).await {
        Ok(response) => response,
        Err(e) => {
            let methods = methods_for(&request.path);
            if e.is_client_error() {
                info!(status = e.status_code(), error = %e, "Request rejected");
            } else {
                error!(error = %e, "Request failed");
            }
            ApiResponse::message(e.status_code(), methods, &e.public_message())
        }
    }
}

async fn dispatch(ctx: &ApiContext, request: &ApiRequest) -> Result<ApiResponse, CatalogError> {
    match (resolve(request), ctx.store.as_deref(), ctx.uploads.as_deref()) {
        (Route::ListProducts, Some(store), _) => {
            let products = catalog::list_available(store).await?;
            info!(count = products.len(), "Listed products");
            Ok(ApiResponse::json(200, METHODS_GET, &products))
        }
        (Route::ProductById(id), Some(store), _) => {
            let product = catalog::get_by_id(store, id).await?;
            Ok(ApiResponse::json(200, METHODS_GET, &product))
        }
        (Route::CreateProduct, Some(store), _) => {
            let input = match parse_body(request.body.as_deref()) {
                Some(input) => input,
                None => {
                    warn!("Unparseable request body");
                    return Ok(ApiResponse::message(400, METHODS_POST, "Invalid JSON body"));
                }
            };
            let product = catalog::create(store, input, ctx.write_options).await?;
            Ok(ApiResponse::json(201, METHODS_POST, &product))
        }
        (Route::RequestUpload, _, Some(uploads)) => {
            let name = request.query.get("name").map(String::as_str);
            let signed_url = uploads.request_upload(name).await?;
            Ok(ApiResponse::json(200, METHODS_ANY, &json!({ "signedUrl": signed_url })))
        }
        _ => Err(CatalogError::NotFound("Not found".to_string())),
    }
}

/// A missing body reads as `{}`, so it fails presence validation rather than parsing.
fn parse_body(body: Option<&str>) -> Option<NewProduct> {
    match body.map(str::trim) {
        None | Some("") => Some(NewProduct::default()),
        Some(text) => match serde_json::from_str::<serde_json::Value>(text) {
            Ok(value) if value.is_object() => serde_json::from_value(value).ok(),
            _ => None,
        },
    }
}
