//! Error types for maildelegate-directory.

use thiserror::Error;

/// All errors that can arise from directory API calls.
#[derive(Debug, Error)]
pub enum DirectoryError {
    /// The API answered with a non-success status.
    #[error(
        "can't connect to org: {method} {path} returned HTTP {status}; \
         check configuration and scope access rights"
    )]
    Connection {
        method: &'static str,
        path: String,
        status: u16,
    },

    /// The request never produced an HTTP response (DNS, refused, timeout).
    #[error("can't connect to org: {method} {path} failed: {message}")]
    Transport {
        method: &'static str,
        path: String,
        message: String,
    },

    /// A successful response lacked an expected field or had the wrong shape.
    #[error("cannot process response from server for {path}: {detail}")]
    MalformedResponse { path: String, detail: String },
}

impl DirectoryError {
    /// Whether the error means the API could not be reached or refused the
    /// request, as opposed to answering with an unexpected body.
    pub fn is_connectivity(&self) -> bool {
        matches!(
            self,
            DirectoryError::Connection { .. } | DirectoryError::Transport { .. }
        )
    }
}
