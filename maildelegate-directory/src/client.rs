//! Typed calls against the directory and delegation endpoints.
//!
//! | call                           | endpoint                                              |
//! |--------------------------------|-------------------------------------------------------|
//! | `count_pages` / users page     | `GET  /directory/v1/org/{org}/users?page=&perPage=`   |
//! | `fetch_actor_delegations`      | `GET  /admin/v1/org/{org}/mail/delegated/{id}/resources` |
//! | `fetch_resource_delegations`   | `GET  /admin/v1/org/{org}/mail/delegated/{id}/actors` |
//! | `create_delegation`            | `POST /admin/v1/org/{org}/mail/delegated?resourceId=&actorId=` |

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;

use maildelegate_core::{DirectoryUser, Rights, Settings, TaskId, UserId};

use crate::error::DirectoryError;
use crate::pacer::Pacer;
use crate::transport::{ApiResponse, Transport, UreqTransport};

/// One actor holding rights on a resource mailbox.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceActor {
    pub actor_id: UserId,
    pub rights: Rights,
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct PageCount {
    pages: u32,
}

#[derive(Deserialize)]
struct UsersPage {
    users: Vec<WireUser>,
}

#[derive(Deserialize)]
struct WireUser {
    id: String,
    email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ActorResources {
    resources: Vec<WireResource>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResource {
    resource_id: String,
}

#[derive(Deserialize)]
struct ResourceActors {
    actors: Vec<WireActor>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireActor {
    actor_id: String,
    #[serde(default)]
    rights: Vec<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreatedTask {
    task_id: String,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

pub struct DirectoryClient<T> {
    transport: T,
    org_id: String,
    per_page: u32,
    pacer: Pacer,
}

impl DirectoryClient<UreqTransport> {
    /// Production client: `ureq` transport, configured page size and delay.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            UreqTransport::new(settings),
            settings.org_id.clone(),
            settings.per_page,
            Pacer::new(settings.request_delay),
        )
    }
}

impl<T: Transport> DirectoryClient<T> {
    pub fn new(transport: T, org_id: impl Into<String>, per_page: u32, pacer: Pacer) -> Self {
        Self {
            transport,
            org_id: org_id.into(),
            per_page,
            pacer,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Request page 1 of the user listing and return the total page count.
    pub fn count_pages(&self) -> Result<u32, DirectoryError> {
        tracing::info!(org_id = %self.org_id, "counting users pages");
        let path = self.users_path();
        let response = self.transport.get(&path, &self.page_query(1))?;
        let count: PageCount = decode("GET", &path, response)?;
        tracing::info!(pages = count.pages, "users pages in response");
        Ok(count.pages)
    }

    /// Fetch a single page of the user listing.
    pub fn fetch_users_page(&self, page: u32) -> Result<Vec<DirectoryUser>, DirectoryError> {
        tracing::debug!(page, "fetching users page");
        let path = self.users_path();
        let response = self.transport.get(&path, &self.page_query(page))?;
        let page: UsersPage = decode("GET", &path, response)?;
        Ok(page
            .users
            .into_iter()
            .map(|user| DirectoryUser {
                id: UserId(user.id),
                email: user.email,
            })
            .collect())
    }

    /// Fetch pages `1..=page_count` in order, pausing after each one.
    pub fn fetch_all_users(&self, page_count: u32) -> Result<Vec<DirectoryUser>, DirectoryError> {
        let mut users = Vec::new();
        for page in 1..=page_count {
            users.extend(self.fetch_users_page(page)?);
            self.pacer.pause();
        }
        tracing::info!(count = users.len(), "total fetched users");
        Ok(users)
    }

    /// Resource mailboxes the actor currently has delegated access to.
    pub fn fetch_actor_delegations(&self, actor_id: &UserId) -> Result<Vec<UserId>, DirectoryError> {
        let path = self.delegated_path(actor_id, "resources");
        let response = self.transport.get(&path, &[]);
        self.pacer.pause();
        let resources: ActorResources = decode("GET", &path, response?)?;
        Ok(resources
            .resources
            .into_iter()
            .map(|r| UserId(r.resource_id))
            .collect())
    }

    /// Actors currently holding rights on the resource mailbox.
    pub fn fetch_resource_delegations(
        &self,
        resource_id: &UserId,
    ) -> Result<Vec<ResourceActor>, DirectoryError> {
        let path = self.delegated_path(resource_id, "actors");
        let response = self.transport.get(&path, &[]);
        self.pacer.pause();
        let actors: ResourceActors = decode("GET", &path, response?)?;
        Ok(actors
            .actors
            .into_iter()
            .map(|actor| ResourceActor {
                rights: Rights::from_names(actor.rights.iter().map(String::as_str)),
                actor_id: UserId(actor.actor_id),
            })
            .collect())
    }

    /// Create or replace the delegation edge `resource -> actor` with `rights`.
    pub fn create_delegation(
        &self,
        resource_id: &UserId,
        actor_id: &UserId,
        rights: &Rights,
    ) -> Result<TaskId, DirectoryError> {
        let path = format!("/admin/v1/org/{}/mail/delegated", self.org_id);
        let query = [
            ("resourceId", resource_id.0.clone()),
            ("actorId", actor_id.0.clone()),
        ];
        let body = json!({ "rights": rights.to_list() });
        let response = self.transport.post_json(&path, &query, &body);
        self.pacer.pause();
        let created: CreatedTask = decode("POST", &path, response?)?;
        Ok(TaskId(created.task_id))
    }

    fn users_path(&self) -> String {
        format!("/directory/v1/org/{}/users", self.org_id)
    }

    fn page_query(&self, page: u32) -> [(&'static str, String); 2] {
        [("page", page.to_string()), ("perPage", self.per_page.to_string())]
    }

    fn delegated_path(&self, user_id: &UserId, edge: &str) -> String {
        format!("/admin/v1/org/{}/mail/delegated/{}/{}", self.org_id, user_id, edge)
    }
}

/// Check for a 200 status, then decode the body into `D`.
fn decode<D: DeserializeOwned>(
    method: &'static str,
    path: &str,
    response: ApiResponse,
) -> Result<D, DirectoryError> {
    if !response.is_ok() {
        return Err(DirectoryError::Connection {
            method,
            path: path.to_string(),
            status: response.status,
        });
    }
    serde_json::from_value(response.body).map_err(|e| DirectoryError::MalformedResponse {
        path: path.to_string(),
        detail: e.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
