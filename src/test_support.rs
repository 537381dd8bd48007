//! Test support utilities shared across unit and integration tests.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use reqwest::Method;
use serde_json::{Value, json};

use crate::config::OvhConfig;
use crate::ovhcloud::{ApiError, ApiFuture, OvhApi, Params, expand_path};

type Route = (Method, String);

/// Records a single request made through [`ScriptedApi`].
#[derive(Clone, Debug, PartialEq)]
pub struct ApiInvocation {
    /// HTTP method.
    pub method: Method,
    /// Path after placeholder substitution.
    pub path: String,
    /// Parameters left after substitution (query or body fields).
    pub params: Params,
}

#[derive(Debug, Default)]
struct Script {
    queued: HashMap<Route, VecDeque<Result<Value, ApiError>>>,
    fallback: HashMap<Route, Result<Value, ApiError>>,
    invocations: Vec<ApiInvocation>,
}

impl Script {
    fn next(&mut self, route: &Route) -> Result<Value, ApiError> {
        if let Some(response) = self.queued.get_mut(route).and_then(VecDeque::pop_front) {
            return response;
        }
        self.fallback.get(route).cloned().unwrap_or_else(|| {
            Err(ApiError::transport(
                &route.0,
                &route.1,
                "no scripted response available",
            ))
        })
    }
}

/// Scripted [`OvhApi`] that answers per method and expanded path.
///
/// Queued responses are consumed in FIFO order; once a route's queue is
/// empty its fallback response (if any) is returned for every further call.
#[derive(Clone, Debug, Default)]
pub struct ScriptedApi {
    script: Arc<Mutex<Script>>,
}

impl ScriptedApi {
    /// Creates an API double with no scripted responses.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Queues a JSON response for one call.
    pub fn push_json(&self, method: Method, path: &str, value: Value) {
        self.lock()
            .queued
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(Ok(value));
    }

    /// Queues an HTTP failure for one call.
    pub fn push_failure(&self, method: Method, path: &str, status: u16, body: &str) {
        let error = ApiError::from_response(&method, path, status, body.to_owned());
        self.lock()
            .queued
            .entry((method, path.to_owned()))
            .or_default()
            .push_back(Err(error));
    }

    /// Answers every unqueued call on the route with `value`.
    pub fn always_json(&self, method: Method, path: &str, value: Value) {
        self.lock()
            .fallback
            .insert((method, path.to_owned()), Ok(value));
    }

    /// Returns a snapshot of all invocations recorded so far.
    #[must_use]
    pub fn invocations(&self) -> Vec<ApiInvocation> {
        self.lock().invocations.clone()
    }

    /// Counts invocations of one route.
    #[must_use]
    pub fn calls(&self, method: &Method, path: &str) -> usize {
        self.lock()
            .invocations
            .iter()
            .filter(|call| call.method == *method && call.path == path)
            .count()
    }
}

impl OvhApi for ScriptedApi {
    fn request<'a>(
        &'a self,
        method: Method,
        path: &'a str,
        mut params: Params,
    ) -> ApiFuture<'a, Value> {
        Box::pin(async move {
            let expanded = expand_path(&method, path, &mut params)?;
            let response = {
                let mut script = self.lock();
                script.invocations.push(ApiInvocation {
                    method: method.clone(),
                    path: expanded.clone(),
                    params,
                });
                script.next(&(method, expanded))
            };
            // Suspend once, as a network round trip would.
            tokio::task::yield_now().await;
            response
        })
    }
}

/// Returns a valid configuration for project `svc` in region `GRA7`.
#[must_use]
pub fn sample_config(pool: &str) -> OvhConfig {
    OvhConfig {
        endpoint: String::from("ovh-eu"),
        application_key: String::from("app-key"),
        application_secret: String::from("app-secret"),
        consumer_key: String::from("consumer-key"),
        service_id: String::from("svc"),
        region: String::from("GRA7"),
        name: pool.to_owned(),
        flavor: String::from("b2-7"),
        snapshot: String::from("pool-image"),
        ssh_key: String::from("deploy"),
        max_running_instances: None,
        instance_port: Some(8080),
    }
}

/// Produces an instance payload as returned by the list endpoint.
#[must_use]
pub fn instance_json(id: &str, status: &str, name: &str, ips: &[&str]) -> Value {
    let addresses = ips
        .iter()
        .map(|ip| json!({"ip": ip, "type": "public", "version": 4}))
        .collect::<Vec<_>>();
    json!({
        "id": id,
        "name": name,
        "status": status,
        "region": "GRA7",
        "ipAddresses": addresses
    })
}

/// Produces a list-instances payload from `(id, status, name)` triples, each
/// given one address derived from its position.
#[must_use]
pub fn instances_json(instances: &[(&str, &str, &str)]) -> Value {
    Value::Array(
        instances
            .iter()
            .zip(1_u8..)
            .map(|((id, status, name), octet)| {
                instance_json(id, status, name, &[format!("51.0.0.{octet}").as_str()])
            })
            .collect(),
    )
}

/// Produces a flavor, snapshot, or SSH key list payload.
#[must_use]
pub fn named_json(resources: &[(&str, &str)]) -> Value {
    Value::Array(
        resources
            .iter()
            .map(|(id, name)| json!({"id": id, "name": name, "region": "GRA7"}))
            .collect(),
    )
}
