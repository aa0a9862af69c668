//! Joining intents and remote state against the fetched directory.

use std::collections::{BTreeSet, HashMap};

use maildelegate_core::{
    DelegationIntent, DelegationKey, DirectoryUser, RemoteDelegationRecord, ResolvedDelegation,
    UserId,
};
use maildelegate_directory::{DirectoryClient, Transport};

use crate::error::SyncError;

/// Outcome of [`resolve_intents`]. Both lists keep input row order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Resolution {
    pub resolved: Vec<ResolvedDelegation>,
    pub unresolved: Vec<DelegationIntent>,
}

/// Email to id lookup over the fetched directory.
///
/// When two users share an email the later one in listing order wins.
/// Users with an empty email or id are not indexed.
struct EmailIndex<'a> {
    ids: HashMap<&'a str, &'a UserId>,
}

impl<'a> EmailIndex<'a> {
    fn new(users: &'a [DirectoryUser]) -> Self {
        let mut ids = HashMap::with_capacity(users.len());
        for user in users {
            if user.email.is_empty() || user.id.is_empty() {
                continue;
            }
            if let Some(previous) = ids.insert(user.email.as_str(), &user.id) {
                tracing::debug!(email = %user.email, %previous, id = %user.id, "duplicate email in directory");
            }
        }
        Self { ids }
    }

    fn id_of(&self, email: &str) -> Option<&'a UserId> {
        self.ids.get(email).copied()
    }
}

/// Resolve each intent's resource and actor emails to directory ids.
///
/// An intent resolves only when both emails are found; the rest are
/// returned in [`Resolution::unresolved`] and logged.
pub fn resolve_intents(users: &[DirectoryUser], intents: Vec<DelegationIntent>) -> Resolution {
    let index = EmailIndex::new(users);
    let mut resolution = Resolution::default();

    for intent in intents {
        match (
            index.id_of(&intent.resource_email),
            index.id_of(&intent.actor_email),
        ) {
            (Some(resource_id), Some(actor_id)) => {
                resolution.resolved.push(ResolvedDelegation {
                    resource_id: resource_id.clone(),
                    actor_id: actor_id.clone(),
                    intent,
                });
            }
            _ => {
                tracing::warn!(
                    resource = %intent.resource_email,
                    actor = %intent.actor_email,
                    "no user id found for record; skipping"
                );
                resolution.unresolved.push(intent);
            }
        }
    }

    tracing::info!(
        resolved = resolution.resolved.len(),
        unresolved = resolution.unresolved.len(),
        "records ready to process"
    );
    resolution
}

/// Flag resolved entries whose `(resource, actor)` edge already exists.
///
/// Issues one actor lookup per entry. Flagged entries stay in the apply
/// set; re-applying replaces the existing edge.
pub fn detect_duplicates<T: Transport>(
    client: &DirectoryClient<T>,
    resolved: &[ResolvedDelegation],
) -> Result<BTreeSet<DelegationKey>, SyncError> {
    let mut duplicates = BTreeSet::new();
    for delegation in resolved {
        let existing = client.fetch_actor_delegations(&delegation.actor_id)?;
        if existing.contains(&delegation.resource_id) {
            tracing::warn!(record = %delegation, "found existing record");
            duplicates.insert(delegation.key());
        }
    }
    Ok(duplicates)
}

/// Fetch every resource's actors and flatten them into snapshot records.
///
/// Actor emails are looked up in `users` (first listing match); an actor
/// outside the listing gets an empty email.
pub fn collect_snapshot<T: Transport>(
    client: &DirectoryClient<T>,
    users: &[DirectoryUser],
) -> Result<Vec<RemoteDelegationRecord>, SyncError> {
    let emails: HashMap<&UserId, &str> = users
        .iter()
        .rev()
        .map(|user| (&user.id, user.email.as_str()))
        .collect();

    let mut records = Vec::new();
    for user in users {
        for actor in client.fetch_resource_delegations(&user.id)? {
            let actor_email = emails.get(&actor.actor_id).copied().unwrap_or_default();
            tracing::debug!(
                resource = %user.email,
                actor = %actor_email,
                rights = ?actor.rights.to_list(),
                "delegation edge"
            );
            records.push(RemoteDelegationRecord {
                resource_id: user.id.clone(),
                resource_email: user.email.clone(),
                actor_id: actor.actor_id,
                actor_email: actor_email.to_string(),
                imap_full_access: actor.rights.imap_full_access,
                send_as: actor.rights.send_as,
                send_on_behalf: actor.rights.send_on_behalf,
            });
        }
    }
    tracing::info!(count = records.len(), "collected delegation records");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use maildelegate_core::Rights;

    use super::*;

    fn user(id: &str, email: &str) -> DirectoryUser {
        DirectoryUser {
            id: UserId::from(id),
            email: email.to_string(),
        }
    }

    fn intent(resource: &str, actor: &str) -> DelegationIntent {
        DelegationIntent {
            resource_email: resource.to_string(),
            actor_email: actor.to_string(),
            rights: Rights::new(true, false, false),
        }
    }

    #[test]
    fn resolves_when_both_emails_found() {
        let users = [user("1", "shared@x"), user("2", "alice@x")];
        let resolution = resolve_intents(&users, vec![intent("shared@x", "alice@x")]);
        assert_eq!(resolution.resolved.len(), 1);
        assert_eq!(resolution.resolved[0].resource_id, UserId::from("1"));
        assert_eq!(resolution.resolved[0].actor_id, UserId::from("2"));
        assert!(resolution.unresolved.is_empty());
    }

    #[test]
    fn resource_and_actor_may_be_same_user() {
        let users = [user("1", "me@x")];
        let resolution = resolve_intents(&users, vec![intent("me@x", "me@x")]);
        assert_eq!(resolution.resolved[0].key().resource_id, resolution.resolved[0].key().actor_id);
    }

    #[test]
    fn later_duplicate_email_wins() {
        let users = [user("1", "dup@x"), user("2", "alice@x"), user("3", "dup@x")];
        let resolution = resolve_intents(&users, vec![intent("dup@x", "alice@x")]);
        assert_eq!(resolution.resolved[0].resource_id, UserId::from("3"));
    }

    #[test]
    fn email_match_is_exact() {
        let users = [user("1", "Shared@x"), user("2", "alice@x")];
        let resolution = resolve_intents(&users, vec![intent("shared@x", "alice@x")]);
        assert!(resolution.resolved.is_empty());
        assert_eq!(resolution.unresolved.len(), 1);
    }

    #[test]
    fn user_with_empty_id_never_resolves() {
        let users = [user("", "shared@x"), user("2", "alice@x")];
        let resolution = resolve_intents(&users, vec![intent("shared@x", "alice@x")]);
        assert_eq!(resolution.unresolved.len(), 1);
    }
}
