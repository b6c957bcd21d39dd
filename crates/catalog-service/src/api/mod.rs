//! # HTTP Surface
//!
//! API Gateway proxy handling, independent of the Lambda event types: an [`ApiRequest`]
//! goes in, an [`ApiResponse`] with CORS headers comes out. The `lambda` submodule
//! converts to and from `lambda_http`.

pub mod lambda;
pub mod router;

use serde::Serialize;
use serde_json::json;
use std::collections::HashMap;

pub use router::{handle, ApiContext};

pub const METHODS_GET: &str = "GET, OPTIONS";
pub const METHODS_POST: &str = "POST, OPTIONS";
pub const METHODS_ANY: &str = "GET, POST, OPTIONS";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub path_params: HashMap<String, String>,
    pub query: HashMap<String, String>,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Self::default()
        }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(name.into(), value.into());
        self
    }

    pub fn with_path_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.path_params.insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
}

impl ApiResponse {
    fn with_cors(status: u16, methods: &str, body: String) -> Self {
        Self {
            status,
            headers: vec![
                ("Content-Type", "application/json".to_string()),
                ("Access-Control-Allow-Origin", "*".to_string()),
                ("Access-Control-Allow-Headers", "*".to_string()),
                ("Access-Control-Allow-Methods", methods.to_string()),
            ],
            body,
        }
    }

    /// Pre-flight answer: 200 with an empty body.
    pub fn preflight(methods: &str) -> Self {
        Self::with_cors(200, methods, String::new())
    }

    pub fn json<T: Serialize>(status: u16, methods: &str, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self::with_cors(status, methods, body),
            Err(e) => {
                tracing::error!(error = %e, "Failed to encode response body");
                Self::message(500, methods, crate::catalog::error::INTERNAL_SERVER_ERROR)
            }
        }
    }

    pub fn message(status: u16, methods: &str, message: &str) -> Self {
        Self::with_cors(status, methods, json!({ "message": message }).to_string())
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}
