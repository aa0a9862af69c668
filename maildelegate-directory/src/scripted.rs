//! In-memory [`Transport`] that answers from a closure and records every
//! request, for tests that must not touch the network.

use std::cell::RefCell;

use serde_json::Value;

use crate::error::DirectoryError;
use crate::transport::{ApiResponse, Transport};

/// One request as seen by [`ScriptedTransport`].
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: &'static str,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
}

impl RecordedRequest {
    pub fn query_value(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

type Handler = Box<dyn Fn(&RecordedRequest) -> ApiResponse>;

pub struct ScriptedTransport {
    handler: Handler,
    log: RefCell<Vec<RecordedRequest>>,
}

impl ScriptedTransport {
    pub fn new(handler: impl Fn(&RecordedRequest) -> ApiResponse + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            log: RefCell::new(Vec::new()),
        }
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.log.borrow().clone()
    }

    fn exchange(
        &self,
        method: &'static str,
        path: &str,
        query: &[(&str, String)],
        body: Option<&Value>,
    ) -> ApiResponse {
        let request = RecordedRequest {
            method,
            path: path.to_string(),
            query: query
                .iter()
                .map(|(k, v)| ((*k).to_string(), v.clone()))
                .collect(),
            body: body.cloned(),
        };
        let response = (self.handler)(&request);
        self.log.borrow_mut().push(request);
        response
    }
}

impl Transport for ScriptedTransport {
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ApiResponse, DirectoryError> {
        Ok(self.exchange("GET", path, query, None))
    }

    fn post_json(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &Value,
    ) -> Result<ApiResponse, DirectoryError> {
        Ok(self.exchange("POST", path, query, Some(body)))
    }
}
