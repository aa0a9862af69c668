//! Domain types for mailbox delegation.
//!
//! Everything here lives in memory for a single run. The only serialized
//! forms are the API wire bodies and the snapshot CSV, both via serde.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Directory identifier of a user (resource mailbox or actor).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// Server-side task identifier returned when a delegation is created.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TaskId(pub String);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TaskId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Rights
// ---------------------------------------------------------------------------

/// A single delegated capability, in its wire spelling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Right {
    ImapFullAccess,
    SendAs,
    SendOnBehalf,
}

impl Right {
    pub const ALL: [Right; 3] = [Right::ImapFullAccess, Right::SendAs, Right::SendOnBehalf];

    pub fn as_str(self) -> &'static str {
        match self {
            Right::ImapFullAccess => "imap_full_access",
            Right::SendAs => "send_as",
            Right::SendOnBehalf => "send_on_behalf",
        }
    }
}

impl fmt::Display for Right {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Right {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "imap_full_access" => Ok(Right::ImapFullAccess),
            "send_as" => Ok(Right::SendAs),
            "send_on_behalf" => Ok(Right::SendOnBehalf),
            other => Err(format!("unknown right '{other}'")),
        }
    }
}

/// The boolean form of a rights set.
///
/// [`Rights::to_list`] always yields rights in the order
/// `imap_full_access`, `send_as`, `send_on_behalf`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rights {
    pub imap_full_access: bool,
    pub send_as: bool,
    pub send_on_behalf: bool,
}

impl Rights {
    pub fn new(imap_full_access: bool, send_as: bool, send_on_behalf: bool) -> Self {
        Self {
            imap_full_access,
            send_as,
            send_on_behalf,
        }
    }

    pub fn contains(&self, right: Right) -> bool {
        match right {
            Right::ImapFullAccess => self.imap_full_access,
            Right::SendAs => self.send_as,
            Right::SendOnBehalf => self.send_on_behalf,
        }
    }

    pub fn insert(&mut self, right: Right) {
        match right {
            Right::ImapFullAccess => self.imap_full_access = true,
            Right::SendAs => self.send_as = true,
            Right::SendOnBehalf => self.send_on_behalf = true,
        }
    }

    /// List form sent verbatim to the server.
    pub fn to_list(&self) -> Vec<Right> {
        Right::ALL
            .into_iter()
            .filter(|right| self.contains(*right))
            .collect()
    }

    /// Re-derive the boolean form from the server's list of right names.
    /// Names this tool does not know are ignored.
    pub fn from_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut rights = Rights::default();
        for right in names.into_iter().filter_map(|name| name.parse().ok()) {
            rights.insert(right);
        }
        rights
    }
}

impl fmt::Display for Rights {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} | {} | {}",
            self.imap_full_access, self.send_as, self.send_on_behalf
        )
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A user as listed by the directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DirectoryUser {
    pub id: UserId,
    pub email: String,
}

/// A desired delegation edge, one per intent CSV data row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DelegationIntent {
    pub resource_email: String,
    pub actor_email: String,
    pub rights: Rights,
}

/// The `(resource, actor)` pair identifying a delegation edge.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DelegationKey {
    pub resource_id: UserId,
    pub actor_id: UserId,
}

/// An intent whose emails were both found in the directory.
///
/// Both ids are non-empty; the reconciler never builds one otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDelegation {
    pub intent: DelegationIntent,
    pub resource_id: UserId,
    pub actor_id: UserId,
}

impl ResolvedDelegation {
    pub fn key(&self) -> DelegationKey {
        DelegationKey {
            resource_id: self.resource_id.clone(),
            actor_id: self.actor_id.clone(),
        }
    }
}

impl fmt::Display for ResolvedDelegation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} ({}) -> {} ({})",
            self.intent.resource_email, self.resource_id, self.intent.actor_email, self.actor_id
        )
    }
}

/// One existing server-side delegation edge, as exported by query mode.
///
/// Field names double as the snapshot CSV header.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDelegationRecord {
    pub resource_id: UserId,
    pub resource_email: String,
    pub actor_id: UserId,
    pub actor_email: String,
    pub imap_full_access: bool,
    pub send_as: bool,
    pub send_on_behalf: bool,
}

impl RemoteDelegationRecord {
    pub fn rights(&self) -> Rights {
        Rights::new(self.imap_full_access, self.send_as, self.send_on_behalf)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
