//! Conversions between `lambda_http` and the handler types.

use super::{ApiRequest, ApiResponse};
use lambda_http::{Body, Request, RequestExt, Response};
use std::collections::HashMap;

fn query_map(map: lambda_http::aws_lambda_events::query_map::QueryMap) -> HashMap<String, String> {
    map.iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect()
}

/// The resource path as the client sent it.
///
/// For REST API events the request URI carries the stage (`/prod/products`); the raw
/// path does not, and routing works on the raw path.
fn route_path(request: &Request) -> String {
    let raw = request.raw_http_path().to_string();
    if raw.is_empty() {
        request.uri().path().to_string()
    } else {
        raw
    }
}

impl From<Request> for ApiRequest {
    fn from(request: Request) -> Self {
        let body = match request.body() {
            Body::Empty => None,
            Body::Text(text) => Some(text.clone()),
            Body::Binary(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        };
        Self {
            method: request.method().as_str().to_string(),
            path: route_path(&request),
            path_params: query_map(request.path_parameters()),
            query: query_map(request.query_string_parameters()),
            body,
        }
    }
}

/// Milliseconds-since-epoch deadline of the current invocation, if known.
pub fn invocation_deadline(request: &Request) -> Option<u64> {
    request.lambda_context_ref().map(|context| context.deadline)
}

impl TryFrom<ApiResponse> for Response<Body> {
    type Error = lambda_http::http::Error;

    fn try_from(response: ApiResponse) -> Result<Self, Self::Error> {
        let mut builder = Response::builder().status(response.status);
        for (name, value) in response.headers {
            builder = builder.header(name, value);
        }
        let body = if response.body.is_empty() {
            Body::Empty
        } else {
            Body::Text(response.body)
        };
        builder.body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{self, ApiContext};
    use crate::model::{Price, Product};
    use crate::store::{CatalogStore, MemoryStore};
    use serde_json::json;
    use std::sync::Arc;
    use std::time::Duration;

    fn rest_event(method: &str, path: &str, extra: serde_json::Value) -> Request {
        let mut event = json!({
            "resource": path,
            "path": path,
            "httpMethod": method,
            "headers": {"Host": "abc123.execute-api.eu-west-1.amazonaws.com"},
            "multiValueHeaders": {"Host": ["abc123.execute-api.eu-west-1.amazonaws.com"]},
            "queryStringParameters": null,
            "multiValueQueryStringParameters": null,
            "pathParameters": null,
            "stageVariables": null,
            "requestContext": {
                "accountId": "123456789012",
                "resourceId": "r1",
                "stage": "prod",
                "requestId": "req-1",
                "identity": {"sourceIp": "127.0.0.1"},
                "resourcePath": path,
                "httpMethod": method,
                "apiId": "abc123",
                "path": format!("/prod{path}")
            },
            "body": null,
            "isBase64Encoded": false
        });
        if let (Some(event), Some(extra)) = (event.as_object_mut(), extra.as_object()) {
            for (key, value) in extra {
                event.insert(key.clone(), value.clone());
            }
        }
        lambda_http::request::from_str(&event.to_string()).unwrap()
    }

    #[test]
    fn test_stage_is_not_part_of_the_route() {
        let request = ApiRequest::from(rest_event(
            "GET",
            "/products/p1",
            json!({"pathParameters": {"productId": "p1"}}),
        ));
        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/products/p1");
        assert_eq!(request.path_params.get("productId").map(String::as_str), Some("p1"));
    }

    #[test]
    fn test_query_and_body_are_carried() {
        let request = ApiRequest::from(rest_event(
            "POST",
            "/products",
            json!({
                "queryStringParameters": {"name": "a.csv"},
                "multiValueQueryStringParameters": {"name": ["a.csv"]},
                "body": "{\"title\":\"Cap\"}"
            }),
        ));
        assert_eq!(request.query.get("name").map(String::as_str), Some("a.csv"));
        assert_eq!(request.body.as_deref(), Some("{\"title\":\"Cap\"}"));
    }

    #[tokio::test]
    async fn test_staged_event_reaches_its_route() {
        let (store, _handles) = MemoryStore::spawn(8);
        store
            .put_product(Product::new("p1", "Red Hoodie", Price::from_units(2999)))
            .await
            .unwrap();
        let ctx = ApiContext::new(Duration::from_secs(6)).with_store(Arc::new(store));

        let request = ApiRequest::from(rest_event("GET", "/products", json!({})));
        let response = api::handle(&ctx, request, None).await;

        assert_eq!(response.status, 200);
        let body: serde_json::Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body[0]["id"], "p1");
    }
}
