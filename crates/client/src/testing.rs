//! Scripted [`Network`] double for worker tests.

use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use pawcache_core::Error;
use reqwest::{Method, StatusCode};
use tokio::sync::watch;

use crate::fetch::{FetchRequest, FetchResponse, Network, ResponseType};

#[derive(Clone)]
struct Route {
    status: StatusCode,
    body: Bytes,
    response_type: ResponseType,
}

/// Serves canned responses by URL; unknown URLs answer 404.
pub(crate) struct ScriptedNetwork {
    routes: Mutex<HashMap<String, Route>>,
    unreachable: Mutex<HashSet<String>>,
    rejected_bodies: Mutex<Vec<String>>,
    offline: AtomicBool,
    gate: watch::Sender<bool>,
    calls: Mutex<Vec<(Method, String, Option<Bytes>)>>,
}

impl ScriptedNetwork {
    pub(crate) fn new() -> Self {
        Self {
            routes: Mutex::new(HashMap::new()),
            unreachable: Mutex::new(HashSet::new()),
            rejected_bodies: Mutex::new(Vec::new()),
            offline: AtomicBool::new(false),
            gate: watch::Sender::new(true),
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn respond(&self, url: &str, status: u16, body: &str) {
        self.respond_typed(url, status, body, ResponseType::Basic);
    }

    pub(crate) fn respond_typed(&self, url: &str, status: u16, body: &str, response_type: ResponseType) {
        let route = Route {
            status: StatusCode::from_u16(status).unwrap(),
            body: Bytes::copy_from_slice(body.as_bytes()),
            response_type,
        };
        self.routes.lock().unwrap().insert(url.to_string(), route);
    }

    /// Fail transport for one URL.
    pub(crate) fn unreachable(&self, url: &str) {
        self.unreachable.lock().unwrap().insert(url.to_string());
    }

    /// Answer 500 to any request whose body contains `needle`.
    pub(crate) fn reject_body_containing(&self, needle: &str) {
        self.rejected_bodies.lock().unwrap().push(needle.to_string());
    }

    pub(crate) fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Park every fetch until [`ScriptedNetwork::release`].
    pub(crate) fn hold(&self) {
        self.gate.send_replace(false);
    }

    pub(crate) fn release(&self) {
        self.gate.send_replace(true);
    }

    pub(crate) fn calls(&self) -> Vec<(Method, String)> {
        self.calls.lock().unwrap().iter().map(|(m, u, _)| (m.clone(), u.clone())).collect()
    }

    pub(crate) fn posted_bodies(&self) -> Vec<serde_json::Value> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _, _)| *m == Method::POST)
            .filter_map(|(_, _, body)| body.as_ref().and_then(|b| serde_json::from_slice(b).ok()))
            .collect()
    }
}

#[async_trait]
impl Network for ScriptedNetwork {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, Error> {
        let mut gate = self.gate.subscribe();
        let _ = gate.wait_for(|open| *open).await;

        let url = request.url.to_string();
        self.calls
            .lock()
            .unwrap()
            .push((request.method.clone(), url.clone(), request.body.clone()));

        if self.offline.load(Ordering::SeqCst) || self.unreachable.lock().unwrap().contains(&url) {
            return Err(Error::Network(format!("failed to fetch {url}: connection refused")));
        }

        if let Some(body) = &request.body {
            let text = String::from_utf8_lossy(body);
            if self.rejected_bodies.lock().unwrap().iter().any(|n| text.contains(n.as_str())) {
                return Ok(FetchResponse::new(request.url.clone(), StatusCode::INTERNAL_SERVER_ERROR, ""));
            }
        }

        let route = self.routes.lock().unwrap().get(&url).cloned();
        Ok(match route {
            Some(route) => {
                let mut response = FetchResponse::new(request.url.clone(), route.status, route.body);
                response.response_type = route.response_type;
                response
            }
            None => FetchResponse::new(request.url.clone(), StatusCode::NOT_FOUND, ""),
        })
    }
}
