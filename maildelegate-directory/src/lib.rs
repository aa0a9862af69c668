//! # maildelegate-directory
//!
//! Blocking client for the organization directory and mail-delegation admin API.
//!
//! [`DirectoryClient`] speaks the API over any [`Transport`]; production runs
//! use [`UreqTransport`]. Every paced call is followed by a fixed
//! [`Pacer`] delay to stay under the API's rate limits.

pub mod client;
pub mod error;
pub mod pacer;
#[cfg(any(test, feature = "test-support"))]
pub mod scripted;
pub mod transport;

pub use client::{DirectoryClient, ResourceActor};
pub use error::DirectoryError;
pub use pacer::Pacer;
pub use transport::{ApiResponse, Transport, UreqTransport};
