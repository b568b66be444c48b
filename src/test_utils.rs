// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking Kubernetes API responses.

use crate::kit::CrdDescriptor;
use http::{header, Request, Response};
use http_body_util::BodyExt;
use k8s_openapi::apiextensions_apiserver::pkg::apis::apiextensions::v1::{
    CustomResourceDefinitionCondition, CustomResourceDefinitionStatus,
};
use kube::client::Body;
use kube::Client;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;
use tower::Service;

pub const CRD_COLLECTION_PATH: &str = "/apis/apiextensions.k8s.io/v1/customresourcedefinitions";

/// A request seen by [`MockService`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub content_type: Option<String>,
    pub body: String,
}

/// A mock HTTP service that returns predefined responses based on request paths.
///
/// Registering several responses for the same method and path queues them;
/// each request takes the next one and the last response repeats forever.
#[derive(Clone)]
pub struct MockService {
    responses: Arc<Mutex<HashMap<(String, String), VecDeque<(u16, String)>>>>,
    delays: Arc<Mutex<HashMap<(String, String), Duration>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            delays: Arc::new(Mutex::new(HashMap::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for GET requests matching the exact path
    pub fn on_get(self, path: &str, status: u16, body: &str) -> Self {
        self.push("GET", path, status, body);
        self
    }

    /// Add a response for POST requests matching the exact path
    pub fn on_post(self, path: &str, status: u16, body: &str) -> Self {
        self.push("POST", path, status, body);
        self
    }

    /// Hold every response for a method and exact path for `delay`
    pub fn with_delay(self, method: &str, path: &str, delay: Duration) -> Self {
        self.delays
            .lock()
            .unwrap()
            .insert((method.to_string(), path.to_string()), delay);
        self
    }

    /// Build a kube Client from this mock service
    pub fn into_client(self) -> Client {
        Client::new(self, "default")
    }

    /// All requests received so far, in arrival order
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests received for a method and exact path
    pub fn requests_to(&self, method: &str, path: &str) -> Vec<RecordedRequest> {
        self.requests()
            .into_iter()
            .filter(|r| r.method == method && r.path == path)
            .collect()
    }

    fn push(&self, method: &str, path: &str, status: u16, body: &str) {
        self.responses
            .lock()
            .unwrap()
            .entry((method.to_string(), path.to_string()))
            .or_default()
            .push_back((status, body.to_string()));
    }

    fn find_response(&self, method: &str, path: &str) -> Option<(u16, String)> {
        let mut responses = self.responses.lock().unwrap();

        // Try exact match first, then prefix match for paths like /api/v1/namespaces/foo
        let key = responses
            .keys()
            .find(|(m, p)| m == method && p == path)
            .or_else(|| {
                responses
                    .keys()
                    .find(|(m, p)| m == method && path.starts_with(p.as_str()))
            })
            .cloned()?;

        let queue = responses.get_mut(&key)?;
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let this = self.clone();

        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let method = parts.method.to_string();
            let path = parts.uri.path().to_string();
            let content_type = parts
                .headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            let bytes = body.collect().await?.to_bytes();

            this.requests.lock().unwrap().push(RecordedRequest {
                method: method.clone(),
                path: path.clone(),
                content_type,
                body: String::from_utf8_lossy(&bytes).into_owned(),
            });

            let delay = this
                .delays
                .lock()
                .unwrap()
                .get(&(method.clone(), path.clone()))
                .copied();
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }

            let (status, body) = this
                .find_response(&method, &path)
                .unwrap_or_else(|| (404, not_found_json("resource", &path)));

            Ok(Response::builder()
                .status(status)
                .header("content-type", "application/json")
                .body(Body::from(body.into_bytes()))
                .unwrap())
        })
    }
}

/// Path of a single CRD on the extension API
pub fn crd_path(name: &str) -> String {
    format!("{}/{}", CRD_COLLECTION_PATH, name)
}

/// Create a mock CRD JSON response with the given `(type, status, reason)` conditions
pub fn crd_json(descriptor: &CrdDescriptor, conditions: &[(&str, &str, Option<&str>)]) -> String {
    let mut crd = descriptor.to_definition();
    crd.status = Some(CustomResourceDefinitionStatus {
        conditions: Some(
            conditions
                .iter()
                .map(|(type_, status, reason)| CustomResourceDefinitionCondition {
                    type_: type_.to_string(),
                    status: status.to_string(),
                    reason: reason.map(str::to_string),
                    ..Default::default()
                })
                .collect(),
        ),
        ..Default::default()
    });
    serde_json::to_string(&crd).unwrap()
}

/// Create a 409 already exists response
pub fn already_exists_json(name: &str) -> String {
    status_json(
        409,
        "AlreadyExists",
        &format!(
            "customresourcedefinitions.apiextensions.k8s.io \"{}\" already exists",
            name
        ),
    )
}

/// Create a 404 not found response
pub fn not_found_json(resource: &str, name: &str) -> String {
    status_json(404, "NotFound", &format!("{} \"{}\" not found", resource, name))
}

/// Create a failure Status response
pub fn status_json(code: u16, reason: &str, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": "Failure",
        "message": message,
        "reason": reason,
        "code": code
    })
    .to_string()
}
