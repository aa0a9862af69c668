//! # maildelegate-sync
//!
//! Reconciles a desired-state delegation CSV against the directory and
//! applies the result.
//!
//! Use [`pipeline::Driver`] for a full apply or query run; the stages
//! ([`csv_io`], [`reconcile`], [`apply`]) are public for callers that need
//! one step on its own.

pub mod apply;
pub mod csv_io;
pub mod error;
pub mod pipeline;
pub mod reconcile;

pub use apply::{ApplyOutcome, ApplyResult};
pub use error::SyncError;
pub use pipeline::{
    ApplyPlan, ApplyReport, AssumeYes, Confirm, Driver, Progress, QueryReport, RunState,
};
pub use reconcile::Resolution;
