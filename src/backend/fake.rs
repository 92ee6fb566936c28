//! Recording in-memory stand-in for the HR backend, used by tests.

use super::{Backend, BackendRequest, BackendResponse, Body, Method, MultipartForm};
use crate::errors::ConsoleError;
use crate::session::store::Credential;
use async_trait::async_trait;
use serde_json::{Map, Value, json};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub const DOWNLOAD_BYTES: &[u8] = b"%PDF-1.4 fake";

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub body: Body,
    pub token: Option<String>,
}

#[derive(Default)]
struct State {
    collections: HashMap<String, Vec<Value>>,
    wrapped: HashSet<String>,
    fixtures: HashMap<String, Value>,
    failures: HashMap<(String, String), u16>,
    requests: Vec<RecordedRequest>,
    next_id: u64,
    offline: bool,
}

pub struct InMemoryBackend {
    state: Mutex<State>,
}

impl InMemoryBackend {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State {
                next_id: 1,
                ..State::default()
            }),
        }
    }

    /// Seeds a collection. Ids already present in `records` are kept.
    pub fn with(self, resource: &str, records: Vec<Value>) -> Self {
        {
            let mut state = self.state.lock().unwrap();
            let max_id = records
                .iter()
                .filter_map(|r| r.get("id").and_then(Value::as_u64))
                .max()
                .unwrap_or(0);
            state.next_id = state.next_id.max(max_id + 1);
            state.collections.insert(resource.to_string(), records);
        }
        self
    }

    /// Serves `resource` as `{"data": [...]}` instead of a bare array.
    pub fn wrapped(self, resource: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .wrapped
            .insert(resource.to_string());
        self
    }

    pub fn fixture(self, path: &str, value: Value) -> Self {
        self.state
            .lock()
            .unwrap()
            .fixtures
            .insert(path.to_string(), value);
        self
    }

    pub fn fail(&self, method: Method, path: &str, status: u16) {
        self.state
            .lock()
            .unwrap()
            .failures
            .insert((method.to_string(), path.to_string()), status);
    }

    pub fn go_offline(&self) {
        self.state.lock().unwrap().offline = true;
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state.lock().unwrap().requests.clone()
    }

    pub fn clear_requests(&self) {
        self.state.lock().unwrap().requests.clear();
    }

    /// Number of recorded requests with this method and path (query ignored).
    pub fn count(&self, method: Method, path: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .requests
            .iter()
            .filter(|r| r.method == method && strip_query(&r.path).0 == path)
            .count()
    }

    pub fn records(&self, resource: &str) -> Vec<Value> {
        self.state
            .lock()
            .unwrap()
            .collections
            .get(resource)
            .cloned()
            .unwrap_or_default()
    }
}

fn strip_query(path: &str) -> (&str, Option<&str>) {
    match path.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (path, None),
    }
}

fn respond(status: u16, value: Value) -> BackendResponse {
    BackendResponse {
        status,
        content_type: Some("application/json".to_string()),
        body: serde_json::to_vec(&value).unwrap(),
    }
}

fn not_found() -> BackendResponse {
    respond(404, json!({ "message": "Record not found" }))
}

fn body_object(body: &Body) -> Map<String, Value> {
    match body {
        Body::Json(Value::Object(map)) => map.clone(),
        Body::Multipart(form) => multipart_object(form),
        _ => Map::new(),
    }
}

fn multipart_object(form: &MultipartForm) -> Map<String, Value> {
    let mut map: Map<String, Value> = form
        .fields
        .iter()
        .filter(|(key, _)| key != "_method")
        .map(|(key, value)| (key.clone(), Value::String(value.clone())))
        .collect();
    if let Some(file) = &form.file {
        map.insert("file_name".into(), json!(file.file_name));
        map.insert("file_size".into(), json!(file.bytes.len()));
    }
    map
}

impl State {
    fn route(
        &mut self,
        method: Method,
        path: &str,
        query: Option<&str>,
        body: &Body,
    ) -> BackendResponse {
        if method == Method::Get {
            if let Some(value) = self.fixtures.get(path) {
                return respond(200, value.clone());
            }
        }

        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        match (method, segments.as_slice()) {
            (Method::Post, ["login"]) => {
                let creds = body_object(body);
                let password = creds.get("password").and_then(Value::as_str);
                let email = creds.get("email").and_then(Value::as_str).unwrap_or_default();
                if password == Some("secret") {
                    let token = format!("token-for-{email}");
                    respond(200, json!({ "token": token, "user": { "email": email } }))
                } else {
                    respond(401, json!({ "message": "Invalid credentials" }))
                }
            }
            (Method::Get, [resource]) => {
                let items = self
                    .collections
                    .get(*resource)
                    .cloned()
                    .unwrap_or_default();
                let items = Value::Array(items);
                if self.wrapped.contains(*resource) {
                    respond(200, json!({ "data": items }))
                } else {
                    respond(200, items)
                }
            }
            (Method::Post, [resource]) => {
                let mut record = body_object(body);
                let id = self.next_id;
                self.next_id += 1;
                record.insert("id".into(), json!(id));
                if *resource == "leaves" {
                    record.insert("status".into(), json!("pending"));
                }
                let record = Value::Object(record);
                self.collections
                    .entry(resource.to_string())
                    .or_default()
                    .push(record.clone());
                respond(201, record)
            }
            (Method::Get, [resource, id]) => match self.find(resource, id) {
                Some(index) => respond(200, self.collections[*resource][index].clone()),
                None => not_found(),
            },
            (Method::Put, [resource, id]) => self.merge(resource, id, body),
            (Method::Post, [resource, id]) if query == Some("_method=PUT") => {
                self.merge(resource, id, body)
            }
            (Method::Delete, [resource, id]) => match self.find(resource, id) {
                Some(index) => {
                    if let Some(items) = self.collections.get_mut(*resource) {
                        items.remove(index);
                    }
                    respond(200, json!({ "message": "Deleted" }))
                }
                None => not_found(),
            },
            (Method::Post, ["leaves", id, action @ ("approve" | "reject")]) => {
                let status = if *action == "approve" { "approved" } else { "rejected" };
                let mut patch = body_object(body);
                patch.insert("status".into(), json!(status));
                self.merge("leaves", id, &Body::Json(Value::Object(patch)))
            }
            (Method::Get, ["documents", id, "download"]) => match self.find("documents", id) {
                Some(_) => BackendResponse {
                    status: 200,
                    content_type: Some("application/pdf".to_string()),
                    body: DOWNLOAD_BYTES.to_vec(),
                },
                None => not_found(),
            },
            _ => not_found(),
        }
    }

    fn find(&self, resource: &str, id: &str) -> Option<usize> {
        let id: u64 = id.parse().ok()?;
        self.collections
            .get(resource)?
            .iter()
            .position(|r| r.get("id").and_then(Value::as_u64) == Some(id))
    }

    fn merge(&mut self, resource: &str, id: &str, body: &Body) -> BackendResponse {
        let Some(index) = self.find(resource, id) else {
            return not_found();
        };
        let patch = body_object(body);
        let Some(items) = self.collections.get_mut(resource) else {
            return not_found();
        };
        if let Value::Object(record) = &mut items[index] {
            for (key, value) in patch {
                if key != "id" {
                    record.insert(key, value);
                }
            }
        }
        respond(200, items[index].clone())
    }
}

#[async_trait]
impl Backend for InMemoryBackend {
    async fn send(
        &self,
        credential: Option<&Credential>,
        request: BackendRequest,
    ) -> Result<BackendResponse, ConsoleError> {
        let mut state = self.state.lock().unwrap();
        state.requests.push(RecordedRequest {
            method: request.method,
            path: request.path.clone(),
            body: request.body.clone(),
            token: credential.map(|c| c.token.clone()),
        });

        if state.offline {
            return Err(ConsoleError::Transport("connection refused".to_string()));
        }

        let (path, query) = strip_query(&request.path);
        if let Some(status) = state
            .failures
            .get(&(request.method.to_string(), path.to_string()))
        {
            return Ok(respond(*status, json!({ "message": format!("Injected failure {status}") })));
        }

        Ok(state.route(request.method, path, query, &request.body))
    }
}
