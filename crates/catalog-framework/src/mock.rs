//! # Mock Tables
//!
//! `MockTable<T>` hands out a real `TableClient<T>` whose requests are answered from a
//! queue of expectations instead of a running `TableActor`. Use it to unit test code
//! that sits *around* a table client: error paths, call ordering, and "no request was
//! made at all".
//!
//! | Feature | MockTable | Real TableActor |
//! |---------|-----------|-----------------|
//! | **State** | None (scripted responses) | Real last-write-wins map |
//! | **Error Injection** | Easy (`return_err`) | Only via `validate` |
//! | **Use Case** | Logic around the client | The table itself or full flows |
//!
//! ```rust
//! use catalog_framework::mock::MockTable;
//! use catalog_framework::{TableEntity, TableError};
//!
//! #[derive(Clone, Debug)]
//! struct Row { id: String }
//! impl TableEntity for Row {
//!     type Key = String;
//!     type Error = std::convert::Infallible;
//!     fn key(&self) -> String { self.id.clone() }
//! }
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut mock = MockTable::<Row>::new();
//!     mock.expect_get("a".to_string()).return_err(TableError::ActorClosed);
//!
//!     let result = mock.client().get("a".to_string()).await;
//!     assert!(matches!(result, Err(TableError::ActorClosed)));
//!     mock.verify();
//! }
//! ```
//!
//! Requests that do not match the next expectation are not answered (the caller sees
//! `TableError::ActorDropped`) and are counted; [`MockTable::verify`] fails if any
//! happened.

use crate::{TableClient, TableEntity, TableError, TableRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::mpsc;

enum Expectation<T: TableEntity> {
    Put {
        response: Result<(), TableError>,
    },
    Get {
        key: T::Key,
        response: Result<Option<T>, TableError>,
    },
    Scan {
        response: Result<Vec<T>, TableError>,
    },
}

struct MockState<T: TableEntity> {
    expectations: VecDeque<Expectation<T>>,
    puts: Vec<T>,
    unexpected: Vec<String>,
}

/// A mock table with expectation tracking.
pub struct MockTable<T: TableEntity> {
    client: TableClient<T>,
    state: Arc<Mutex<MockState<T>>>,
    _handle: tokio::task::JoinHandle<()>,
}

impl<T: TableEntity> MockTable<T> {
    /// Creates a new mock with no expectations.
    pub fn new() -> Self {
        let (sender, mut receiver) = mpsc::channel::<TableRequest<T>>(100);
        let state = Arc::new(Mutex::new(MockState {
            expectations: VecDeque::new(),
            puts: Vec::new(),
            unexpected: Vec::new(),
        }));
        let task_state = state.clone();

        let handle = tokio::spawn(async move {
            while let Some(request) = receiver.recv().await {
                let mut state = task_state.lock().unwrap();
                let expectation = state.expectations.pop_front();

                match (request, expectation) {
                    (TableRequest::Put { item, respond_to }, Some(Expectation::Put { response })) => {
                        if response.is_ok() {
                            state.puts.push(item);
                        }
                        let _ = respond_to.send(response);
                    }
                    (
                        TableRequest::Get { key, respond_to },
                        Some(Expectation::Get {
                            key: expected,
                            response,
                        }),
                    ) => {
                        if key != expected {
                            state
                                .unexpected
                                .push(format!("get({key}) but expected get({expected})"));
                            continue;
                        }
                        let _ = respond_to.send(response);
                    }
                    (TableRequest::Scan { respond_to }, Some(Expectation::Scan { response })) => {
                        let _ = respond_to.send(response);
                    }
                    (request, expectation) => {
                        let got = match &request {
                            TableRequest::Put { item, .. } => format!("put({})", item.key()),
                            TableRequest::Get { key, .. } => format!("get({key})"),
                            TableRequest::Scan { .. } => "scan".to_string(),
                        };
                        state.unexpected.push(got);
                        if let Some(expectation) = expectation {
                            state.expectations.push_front(expectation);
                        }
                    }
                }
            }
        });

        Self {
            client: TableClient::new(sender),
            state,
            _handle: handle,
        }
    }

    /// Returns a client wired to this mock.
    pub fn client(&self) -> TableClient<T> {
        self.client.clone()
    }

    /// Expects a `put` operation.
    pub fn expect_put(&mut self) -> PutExpectationBuilder<T> {
        PutExpectationBuilder {
            state: self.state.clone(),
        }
    }

    /// Expects a `get` operation for `key`.
    pub fn expect_get(&mut self, key: T::Key) -> GetExpectationBuilder<T> {
        GetExpectationBuilder {
            key,
            state: self.state.clone(),
        }
    }

    /// Expects a `scan` operation.
    pub fn expect_scan(&mut self) -> ScanExpectationBuilder<T> {
        ScanExpectationBuilder {
            state: self.state.clone(),
        }
    }

    /// Records accepted by successful `put` expectations, in arrival order.
    pub fn puts(&self) -> Vec<T> {
        self.state.lock().unwrap().puts.clone()
    }

    /// Verifies that every expectation was consumed and nothing unexpected arrived.
    pub fn verify(&self) {
        let state = self.state.lock().unwrap();
        if !state.unexpected.is_empty() {
            panic!("Unexpected table requests: {:?}", state.unexpected);
        }
        if !state.expectations.is_empty() {
            panic!(
                "Not all expectations were met. {} remaining",
                state.expectations.len()
            );
        }
    }
}

impl<T: TableEntity> Default for MockTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for `put` expectations.
pub struct PutExpectationBuilder<T: TableEntity> {
    state: Arc<Mutex<MockState<T>>>,
}

impl<T: TableEntity> PutExpectationBuilder<T> {
    pub fn return_ok(self) {
        self.push(Ok(()));
    }

    pub fn return_err(self, error: TableError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<(), TableError>) {
        let mut state = self.state.lock().unwrap();
        state.expectations.push_back(Expectation::Put { response });
    }
}

/// Builder for `get` expectations.
pub struct GetExpectationBuilder<T: TableEntity> {
    key: T::Key,
    state: Arc<Mutex<MockState<T>>>,
}

impl<T: TableEntity> GetExpectationBuilder<T> {
    pub fn return_ok(self, value: Option<T>) {
        self.push(Ok(value));
    }

    pub fn return_err(self, error: TableError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Option<T>, TableError>) {
        let mut state = self.state.lock().unwrap();
        state.expectations.push_back(Expectation::Get {
            key: self.key,
            response,
        });
    }
}

/// Builder for `scan` expectations.
pub struct ScanExpectationBuilder<T: TableEntity> {
    state: Arc<Mutex<MockState<T>>>,
}

impl<T: TableEntity> ScanExpectationBuilder<T> {
    pub fn return_ok(self, items: Vec<T>) {
        self.push(Ok(items));
    }

    pub fn return_err(self, error: TableError) {
        self.push(Err(error));
    }

    fn push(self, response: Result<Vec<T>, TableError>) {
        let mut state = self.state.lock().unwrap();
        state.expectations.push_back(Expectation::Scan { response });
    }
}
