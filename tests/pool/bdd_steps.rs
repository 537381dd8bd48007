//! BDD step definitions for OVHcloud pool behaviour.

use ovhcloud_provider::{ErrorKind, InstanceProvider};
use reqwest::Method;
use rstest_bdd_macros::{given, then, when};
use tokio::runtime::Runtime;

use super::test_helpers::{INSTANCES, PoolContext, PoolOutcome};

#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error("assertion failed: {0}")]
    Assertion(String),
}

#[given("an OVHcloud pool named \"{pool}\"")]
fn pool_named(pool_context: &PoolContext, pool: String) {
    pool_context.state().config.name = pool.trim().to_owned();
}

#[given("the running-instance cap is {max:u32}")]
fn running_instance_cap(pool_context: &PoolContext, max: u32) {
    pool_context.state().config.max_running_instances = Some(max);
}

#[given("the project holds instance \"{id}\" named \"{name}\" in state \"{status}\"")]
fn project_holds_instance(pool_context: &PoolContext, id: String, name: String, status: String) {
    pool_context.state().instances.push((id, name, status));
}

#[given("the project runs {count:u32} pool instances")]
fn project_runs_pool_instances(pool_context: &PoolContext, count: u32) {
    let mut state = pool_context.state();
    let pool = state.config.name.clone();
    for index in 0..count {
        state.instances.push((
            format!("running-{index}"),
            format!("{pool}-{index}"),
            String::from("ACTIVE"),
        ));
    }
}

#[when("I list the pool's instances")]
fn list_instances(pool_context: &PoolContext) -> Result<(), StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let provider = pool_context.provider();
    let outcome = match runtime.block_on(provider.get_models()) {
        Ok(models) => PoolOutcome::Listed(models),
        Err(err) => PoolOutcome::Failed(err),
    };
    pool_context.state().outcome = Some(outcome);
    Ok(())
}

#[when("I request {count:u32} new instances")]
fn request_instances(pool_context: &PoolContext, count: u32) -> Result<(), StepError> {
    let runtime = Runtime::new().map_err(|err| StepError::Assertion(err.to_string()))?;
    let provider = pool_context.provider();
    let outcome = match runtime.block_on(provider.create_instances(count as usize)) {
        Ok(()) => PoolOutcome::Created,
        Err(err) => PoolOutcome::Failed(err),
    };
    pool_context.state().outcome = Some(outcome);
    Ok(())
}

#[then("the listing holds {count:u32} instance")]
fn listing_holds(pool_context: &PoolContext, count: u32) -> Result<(), StepError> {
    let state = pool_context.state();
    let Some(PoolOutcome::Listed(models)) = state.outcome.as_ref() else {
        return Err(StepError::Assertion(format!(
            "expected a listing, got {:?}",
            state.outcome
        )));
    };
    if models.len() == count as usize {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected {count} instance(s), got {models:?}"
        )))
    }
}

#[then("the listing reports instance \"{id}\" as \"{status}\"")]
fn listing_reports(pool_context: &PoolContext, id: String, status: String) -> Result<(), StepError> {
    let state = pool_context.state();
    let Some(PoolOutcome::Listed(models)) = state.outcome.as_ref() else {
        return Err(StepError::Assertion(format!(
            "expected a listing, got {:?}",
            state.outcome
        )));
    };
    let model = models
        .iter()
        .find(|model| model.id == id.trim())
        .ok_or_else(|| StepError::Assertion(format!("instance {id} missing from {models:?}")))?;
    if model.status.as_str() != status.trim() {
        return Err(StepError::Assertion(format!(
            "expected {id} to be {status}, got {}",
            model.status
        )));
    }
    if model.address.is_none() {
        return Err(StepError::Assertion(format!("instance {id} has no address")));
    }
    Ok(())
}

#[then("the request fails with a capacity error")]
fn fails_with_capacity_error(pool_context: &PoolContext) -> Result<(), StepError> {
    let state = pool_context.state();
    match state.outcome.as_ref() {
        Some(PoolOutcome::Failed(err)) if err.kind() == ErrorKind::CapacityExceeded => Ok(()),
        other => Err(StepError::Assertion(format!(
            "expected a capacity error, got {other:?}"
        ))),
    }
}

#[then("no instance creation reaches OVHcloud")]
fn no_creation_requests(pool_context: &PoolContext) -> Result<(), StepError> {
    let posts = pool_context.api.calls(&Method::POST, INSTANCES);
    if posts == 0 {
        Ok(())
    } else {
        Err(StepError::Assertion(format!(
            "expected no creation requests, saw {posts}"
        )))
    }
}
