//! HTTP boundary.
//!
//! [`Transport`] is the seam between typed API calls and the wire. It deals
//! in paths relative to the configured base endpoint and returns the status
//! plus the decoded JSON body; interpreting either is the client's job.

use serde_json::Value;

use maildelegate_core::Settings;

use crate::error::DirectoryError;

/// Status and JSON body of one API response.
///
/// A body that is empty or not JSON decodes to [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self { status: 200, body }
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            body: Value::Null,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Blocking request/response exchange with the API.
pub trait Transport {
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ApiResponse, DirectoryError>;

    fn post_json(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &Value,
    ) -> Result<ApiResponse, DirectoryError>;
}

/// Production transport over a shared `ureq` agent.
pub struct UreqTransport {
    agent: ureq::Agent,
    base_url: String,
    authorization: String,
}

impl UreqTransport {
    pub fn new(settings: &Settings) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(settings.timeout).build();
        Self {
            agent,
            base_url: settings.api_url.clone(),
            authorization: settings.authorization(),
        }
    }

    fn request(&self, method: &str, path: &str, query: &[(&str, String)]) -> ureq::Request {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self
            .agent
            .request(method, &url)
            .set("Authorization", &self.authorization)
            .set("Content-Type", "application/json");
        for (key, value) in query {
            request = request.query(key, value);
        }
        request
    }
}

impl Transport for UreqTransport {
    fn get(&self, path: &str, query: &[(&str, String)]) -> Result<ApiResponse, DirectoryError> {
        tracing::debug!(path, ?query, "GET");
        let result = self.request("GET", path, query).call();
        into_api_response("GET", path, result)
    }

    fn post_json(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: &Value,
    ) -> Result<ApiResponse, DirectoryError> {
        tracing::debug!(path, ?query, %body, "POST");
        let result = self.request("POST", path, query).send_json(body);
        into_api_response("POST", path, result)
    }
}

fn into_api_response(
    method: &'static str,
    path: &str,
    result: Result<ureq::Response, ureq::Error>,
) -> Result<ApiResponse, DirectoryError> {
    let response = match result {
        Ok(response) => response,
        // Non-2xx statuses still carry a response; the client decides what they mean.
        Err(ureq::Error::Status(_, response)) => response,
        Err(ureq::Error::Transport(transport)) => {
            return Err(DirectoryError::Transport {
                method,
                path: path.to_string(),
                message: transport.to_string(),
            });
        }
    };

    let status = response.status();
    let body = match response.into_string() {
        Ok(text) => serde_json::from_str(&text).unwrap_or(Value::Null),
        Err(err) => {
            tracing::debug!(path, error = %err, "failed to read response body");
            Value::Null
        }
    };
    tracing::debug!(path, status, "response");
    Ok(ApiResponse { status, body })
}
