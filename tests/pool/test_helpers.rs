//! Shared fixtures and helpers for pool BDD scenarios.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ovhcloud_provider::test_support::{ScriptedApi, instance_json, sample_config};
use ovhcloud_provider::{InstanceModel, OvhCloudError, OvhCloudProvider, OvhConfig, RawInstance};
use reqwest::Method;
use rstest::fixture;
use serde_json::Value;

pub const INSTANCES: &str = "/cloud/project/svc/instance";

#[derive(Clone, Debug)]
pub enum PoolOutcome {
    Listed(Vec<InstanceModel<RawInstance>>),
    Created,
    Failed(OvhCloudError),
}

#[derive(Debug)]
pub struct PoolState {
    pub config: OvhConfig,
    /// `(id, name, vendor status)` triples the project lists.
    pub instances: Vec<(String, String, String)>,
    pub outcome: Option<PoolOutcome>,
}

#[derive(Clone, Debug)]
pub struct PoolContext {
    pub api: ScriptedApi,
    state: Arc<Mutex<PoolState>>,
}

impl PoolContext {
    pub fn state(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Scripts the project listing and builds a provider over the scripted
    /// API.
    pub fn provider(&self) -> OvhCloudProvider<ScriptedApi> {
        let state = self.state();
        let listing = state
            .instances
            .iter()
            .map(|(id, name, status)| instance_json(id, status, name, &["51.0.0.1"]))
            .collect::<Vec<_>>();
        self.api
            .always_json(Method::GET, INSTANCES, Value::Array(listing));
        OvhCloudProvider::with_api(state.config.clone(), self.api.clone())
            .unwrap_or_else(|err| panic!("pool configuration should be valid: {err}"))
    }
}

#[fixture]
pub fn pool_context() -> PoolContext {
    PoolContext {
        api: ScriptedApi::new(),
        state: Arc::new(Mutex::new(PoolState {
            config: sample_config("pool-a"),
            instances: Vec::new(),
            outcome: None,
        })),
    }
}
