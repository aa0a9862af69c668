//! In-memory stand-in for the directory API, served through `ScriptedTransport`.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use maildelegate_directory::scripted::{RecordedRequest, ScriptedTransport};
use maildelegate_directory::{ApiResponse, DirectoryClient, Pacer};
use serde_json::{json, Value};

pub const ORG: &str = "42";

/// Directory state plus failure switches.
#[derive(Debug, Clone)]
pub struct FakeApi {
    /// `(id, email)` in listing order.
    pub users: Vec<(String, String)>,
    pub per_page: usize,
    /// actor id -> resource ids it can access.
    pub actor_resources: HashMap<String, Vec<String>>,
    /// resource id -> `(actor id, rights)`.
    pub resource_actors: HashMap<String, Vec<(String, Vec<String>)>>,
    pub users_status: u16,
    /// actor ids whose create call answers 200 without a task id.
    pub create_without_task: HashSet<String>,
    /// actor id -> status answered by its create call.
    pub create_status: HashMap<String, u16>,
}

impl Default for FakeApi {
    fn default() -> Self {
        Self {
            users: Vec::new(),
            per_page: 2,
            actor_resources: HashMap::new(),
            resource_actors: HashMap::new(),
            users_status: 200,
            create_without_task: HashSet::new(),
            create_status: HashMap::new(),
        }
    }
}

impl FakeApi {
    pub fn with_users(users: &[(&str, &str)]) -> Self {
        Self {
            users: users
                .iter()
                .map(|(id, email)| (id.to_string(), email.to_string()))
                .collect(),
            ..Self::default()
        }
    }

    pub fn edge(mut self, resource: &str, actor: &str, rights: &[&str]) -> Self {
        self.actor_resources
            .entry(actor.to_string())
            .or_default()
            .push(resource.to_string());
        self.resource_actors
            .entry(resource.to_string())
            .or_default()
            .push((actor.to_string(), rights.iter().map(|r| r.to_string()).collect()));
        self
    }

    pub fn into_client(self) -> DirectoryClient<ScriptedTransport> {
        let per_page = self.per_page as u32;
        DirectoryClient::new(
            ScriptedTransport::new(move |req| self.respond(req)),
            ORG,
            per_page,
            Pacer::disabled(),
        )
    }

    fn respond(&self, req: &RecordedRequest) -> ApiResponse {
        let segments: Vec<&str> = req.path.trim_matches('/').split('/').collect();
        match (req.method, segments.as_slice()) {
            ("GET", ["directory", "v1", "org", _, "users"]) => self.users_page(req),
            ("GET", ["admin", "v1", "org", _, "mail", "delegated", actor, "resources"]) => {
                let resources: Vec<Value> = self
                    .actor_resources
                    .get(*actor)
                    .into_iter()
                    .flatten()
                    .map(|id| json!({ "resourceId": id }))
                    .collect();
                ApiResponse::ok(json!({ "resources": resources }))
            }
            ("GET", ["admin", "v1", "org", _, "mail", "delegated", resource, "actors"]) => {
                let actors: Vec<Value> = self
                    .resource_actors
                    .get(*resource)
                    .into_iter()
                    .flatten()
                    .map(|(id, rights)| json!({ "actorId": id, "rights": rights }))
                    .collect();
                ApiResponse::ok(json!({ "actors": actors }))
            }
            ("POST", ["admin", "v1", "org", _, "mail", "delegated"]) => {
                let actor = req.query_value("actorId").unwrap_or_default();
                if let Some(status) = self.create_status.get(actor) {
                    return ApiResponse::status(*status);
                }
                if self.create_without_task.contains(actor) {
                    return ApiResponse::ok(json!({ "status": "queued" }));
                }
                ApiResponse::ok(json!({ "taskId": format!("task-{actor}") }))
            }
            _ => ApiResponse::status(404),
        }
    }

    fn users_page(&self, req: &RecordedRequest) -> ApiResponse {
        if self.users_status != 200 {
            return ApiResponse::status(self.users_status);
        }
        let page: usize = req
            .query_value("page")
            .and_then(|p| p.parse().ok())
            .unwrap_or(1);
        let pages = self.users.len().div_ceil(self.per_page).max(1);
        let users: Vec<Value> = self
            .users
            .iter()
            .skip((page - 1) * self.per_page)
            .take(self.per_page)
            .map(|(id, email)| json!({ "id": id, "email": email }))
            .collect();
        ApiResponse::ok(json!({ "page": page, "pages": pages, "users": users }))
    }
}

pub fn write_intents(dir: &Path, rows: &[&str]) -> PathBuf {
    let path = dir.join("delegate_in.csv");
    let mut content = String::from("resource,actor,imap_full_access,send_as,send_on_behalf\n");
    for row in rows {
        content.push_str(row);
        content.push('\n');
    }
    std::fs::write(&path, content).expect("write intents");
    path
}

pub fn posts(client: &DirectoryClient<ScriptedTransport>) -> Vec<RecordedRequest> {
    client
        .transport()
        .requests()
        .into_iter()
        .filter(|r| r.method == "POST")
        .collect()
}
