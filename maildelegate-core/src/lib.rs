//! maildelegate core library: domain types, configuration, errors.
//!
//! - [`types`]: identifiers, rights and delegation records
//! - [`config`]: [`Settings`] loading from YAML plus environment overrides
//! - [`error`]: [`ConfigError`]

pub mod config;
pub mod error;
pub mod types;

pub use config::Settings;
pub use error::ConfigError;
pub use types::{
    DelegationIntent, DelegationKey, DirectoryUser, RemoteDelegationRecord, ResolvedDelegation,
    Right, Rights, TaskId, UserId,
};
