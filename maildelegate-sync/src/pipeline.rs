//! Run driver shared by apply and query mode.
//!
//! ```text
//! Idle -> ParametersChecked -> UsersFetched
//!   apply: -> IntentResolved -> DuplicatesChecked -> Confirmed -> Applied
//!                                                 \-> NothingToDo | Aborted (declined)
//!   query: -> SnapshotFetched -> SnapshotWritten
//! any fatal error -> Aborted
//! ```

use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

use maildelegate_core::{
    DelegationIntent, DelegationKey, DirectoryUser, RemoteDelegationRecord, ResolvedDelegation,
};
use maildelegate_directory::{DirectoryClient, Transport};

use crate::apply::{self, ApplyResult};
use crate::csv_io;
use crate::error::SyncError;
use crate::reconcile;

// ---------------------------------------------------------------------------
// States
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    ParametersChecked,
    UsersFetched,
    IntentResolved,
    DuplicatesChecked,
    Confirmed,
    Applied,
    /// No intent resolved; nothing was sent.
    NothingToDo,
    SnapshotFetched,
    SnapshotWritten,
    /// Declined at the prompt, or stopped by a fatal error.
    Aborted,
}

impl RunState {
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            RunState::Applied | RunState::NothingToDo | RunState::SnapshotWritten | RunState::Aborted
        )
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::ParametersChecked => "parameters checked",
            RunState::UsersFetched => "users fetched",
            RunState::IntentResolved => "intent resolved",
            RunState::DuplicatesChecked => "duplicates checked",
            RunState::Confirmed => "confirmed",
            RunState::Applied => "applied",
            RunState::NothingToDo => "nothing to do",
            RunState::SnapshotFetched => "snapshot fetched",
            RunState::SnapshotWritten => "snapshot written",
            RunState::Aborted => "aborted",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Confirmation
// ---------------------------------------------------------------------------

pub const CONFIRM_QUESTION: &str = "Configure mailbox delegation in your organization? (y/n): ";
pub const REPLACE_NOTICE: &str = "Duplicate records will be replaced";

/// What the operator is asked to approve.
#[derive(Debug, Clone, Copy)]
pub struct ApplyPlan<'a> {
    pub resolved: &'a [ResolvedDelegation],
    pub duplicates: &'a BTreeSet<DelegationKey>,
}

impl ApplyPlan<'_> {
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }

    pub fn is_duplicate(&self, delegation: &ResolvedDelegation) -> bool {
        self.duplicates.contains(&delegation.key())
    }

    /// Prompt text; mentions replacement when any edge already exists.
    pub fn message(&self) -> String {
        if self.has_duplicates() {
            format!("{REPLACE_NOTICE}\n{CONFIRM_QUESTION}")
        } else {
            CONFIRM_QUESTION.to_string()
        }
    }
}

/// Yes/no gate between duplicate check and apply.
pub trait Confirm {
    fn confirm(&mut self, plan: &ApplyPlan<'_>) -> Result<bool, SyncError>;
}

/// Approves every plan without asking.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssumeYes;

impl Confirm for AssumeYes {
    fn confirm(&mut self, _plan: &ApplyPlan<'_>) -> Result<bool, SyncError> {
        Ok(true)
    }
}

// ---------------------------------------------------------------------------
// Progress
// ---------------------------------------------------------------------------

/// Per-record events, delivered while the run is in flight.
pub trait Progress {
    /// An intent row whose emails did not both resolve. Called before the
    /// confirmation prompt.
    fn unresolved(&mut self, _intent: &DelegationIntent) {}

    /// One create request has been answered.
    fn applied(&mut self, _result: &ApplyResult) {}
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct ApplyReport {
    pub state: RunState,
    pub user_count: usize,
    pub resolved: Vec<ResolvedDelegation>,
    pub unresolved: Vec<DelegationIntent>,
    pub duplicates: BTreeSet<DelegationKey>,
    /// Empty unless the run reached [`RunState::Applied`].
    pub results: Vec<ApplyResult>,
}

#[derive(Debug, Clone)]
pub struct QueryReport {
    pub state: RunState,
    pub user_count: usize,
    pub records: Vec<RemoteDelegationRecord>,
    pub output: PathBuf,
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

pub struct Driver<'c, T> {
    client: &'c DirectoryClient<T>,
    progress: Option<&'c mut dyn Progress>,
    state: RunState,
}

impl<'c, T: Transport> Driver<'c, T> {
    pub fn new(client: &'c DirectoryClient<T>) -> Self {
        Self {
            client,
            progress: None,
            state: RunState::Idle,
        }
    }

    /// Report unresolved rows and apply outcomes to `progress` as they happen.
    pub fn with_progress(mut self, progress: &'c mut dyn Progress) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Apply mode: read `input`, resolve, check duplicates, confirm, apply.
    ///
    /// The input file is checked before any remote call. Declining the
    /// prompt is not an error; the report ends in [`RunState::Aborted`].
    pub fn run_apply(
        &mut self,
        input: &Path,
        confirm: &mut dyn Confirm,
    ) -> Result<ApplyReport, SyncError> {
        let result = self.apply_steps(input, confirm);
        if result.is_err() {
            self.advance(RunState::Aborted);
        }
        result
    }

    /// Query mode: dump every existing delegation edge to `output`.
    pub fn run_query(&mut self, output: &Path) -> Result<QueryReport, SyncError> {
        let result = self.query_steps(output);
        if result.is_err() {
            self.advance(RunState::Aborted);
        }
        result
    }

    fn apply_steps(
        &mut self,
        input: &Path,
        confirm: &mut dyn Confirm,
    ) -> Result<ApplyReport, SyncError> {
        check_input(input)?;
        tracing::info!(path = %input.display(), "users will be loaded from input file");
        self.advance(RunState::ParametersChecked);

        let users = self.fetch_users()?;

        let intents = csv_io::read_intents(input)?;
        let resolution = reconcile::resolve_intents(&users, intents);
        if let Some(progress) = self.progress.as_deref_mut() {
            for intent in &resolution.unresolved {
                progress.unresolved(intent);
            }
        }
        self.advance(RunState::IntentResolved);

        let duplicates = reconcile::detect_duplicates(self.client, &resolution.resolved)?;
        self.advance(RunState::DuplicatesChecked);

        let mut report = ApplyReport {
            state: self.state,
            user_count: users.len(),
            resolved: resolution.resolved,
            unresolved: resolution.unresolved,
            duplicates,
            results: Vec::new(),
        };

        if report.resolved.is_empty() {
            self.advance(RunState::NothingToDo);
            report.state = self.state;
            return Ok(report);
        }

        let plan = ApplyPlan {
            resolved: &report.resolved,
            duplicates: &report.duplicates,
        };
        if !confirm.confirm(&plan)? {
            tracing::info!("apply declined");
            self.advance(RunState::Aborted);
            report.state = self.state;
            return Ok(report);
        }
        self.advance(RunState::Confirmed);

        let progress = &mut self.progress;
        report.results = apply::apply(self.client, &report.resolved, |result| {
            if let Some(progress) = progress.as_deref_mut() {
                progress.applied(result);
            }
        })?;
        self.advance(RunState::Applied);
        report.state = self.state;
        Ok(report)
    }

    fn query_steps(&mut self, output: &Path) -> Result<QueryReport, SyncError> {
        self.advance(RunState::ParametersChecked);
        let users = self.fetch_users()?;

        let records = reconcile::collect_snapshot(self.client, &users)?;
        self.advance(RunState::SnapshotFetched);

        csv_io::write_snapshot(output, &records)?;
        self.advance(RunState::SnapshotWritten);

        Ok(QueryReport {
            state: self.state,
            user_count: users.len(),
            records,
            output: output.to_path_buf(),
        })
    }

    fn fetch_users(&mut self) -> Result<Vec<DirectoryUser>, SyncError> {
        let pages = self.client.count_pages()?;
        let users = self.client.fetch_all_users(pages)?;
        self.advance(RunState::UsersFetched);
        Ok(users)
    }

    fn advance(&mut self, next: RunState) {
        tracing::debug!(from = %self.state, to = %next, "run state");
        self.state = next;
    }
}

/// Fail with [`SyncError::MissingFile`] unless `input` is an existing file.
pub fn check_input(input: &Path) -> Result<(), SyncError> {
    if input.is_file() {
        Ok(())
    } else {
        Err(SyncError::MissingFile {
            path: input.to_path_buf(),
        })
    }
}
