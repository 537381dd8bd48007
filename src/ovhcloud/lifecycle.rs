//! Creation and deletion fan-outs.

use futures::future::join_all;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::provider::InstanceModel;

use super::error::{BatchFailure, BatchOperation, SlotFailure};
use super::resources::ResolvedResources;
use super::types::{CreatedInstance, RawInstance};
use super::{
    ApiError, INSTANCE_PATH, INSTANCES_PATH, OvhApi, OvhCloudError, OvhCloudProvider, Params,
};

/// Result of one request in a fan-out: the targeted instance (if known up
/// front) and, on success, the id of the affected instance when the vendor
/// reported one.
type SlotOutcome = (Option<String>, Result<Option<String>, ApiError>);

/// Fails when creating `requested` more instances would exceed `max`.
pub(super) fn check_capacity(
    max: Option<u32>,
    current: usize,
    requested: usize,
) -> Result<(), OvhCloudError> {
    let Some(limit) = max else {
        return Ok(());
    };
    let allowed = usize::try_from(limit).unwrap_or(usize::MAX);
    if current.saturating_add(requested) > allowed {
        return Err(OvhCloudError::CapacityExceeded {
            current,
            requested,
            max: limit,
        });
    }
    Ok(())
}

/// Folds per-slot outcomes into a single result, reporting completed and
/// failed slots when anything failed.
pub(super) fn settle(
    operation: BatchOperation,
    outcomes: Vec<SlotOutcome>,
) -> Result<(), OvhCloudError> {
    let attempted = outcomes.len();
    let mut completed = Vec::new();
    let mut failures = Vec::new();
    for (slot, (instance_id, outcome)) in outcomes.into_iter().enumerate() {
        match outcome {
            Ok(id) => completed.push(id),
            Err(error) => {
                warn!(%operation, slot, error = %error, "OVHcloud batch request failed");
                failures.push(SlotFailure {
                    slot,
                    instance_id,
                    error,
                });
            }
        }
    }

    if failures.is_empty() {
        return Ok(());
    }
    Err(BatchFailure {
        operation,
        attempted,
        completed,
        failures,
    }
    .into())
}

impl<A: OvhApi> OvhCloudProvider<A> {
    /// Counts the project's instances in the region that are not being
    /// deleted, regardless of pool.
    ///
    /// # Errors
    ///
    /// Returns [`OvhCloudError::VendorRequest`] when the listing fails.
    pub async fn running_count(&self) -> Result<usize, OvhCloudError> {
        let instances = self.describe_instances().await?;
        Ok(instances
            .iter()
            .filter(|instance| !instance.status.is_deleting())
            .count())
    }

    pub(super) fn create_params(&self, resources: &ResolvedResources) -> Params {
        let mut params = self.regional_params();
        params.insert(
            String::from("flavorId"),
            Value::from(resources.flavor_id.as_str()),
        );
        params.insert(
            String::from("imageId"),
            Value::from(resources.snapshot_id.as_str()),
        );
        params.insert(
            String::from("name"),
            Value::from(self.config.name.as_str()),
        );
        params.insert(
            String::from("sshKeyId"),
            Value::from(resources.ssh_key_id.as_str()),
        );
        params
    }

    async fn create_one(&self, resources: &ResolvedResources) -> SlotOutcome {
        let outcome = self
            .api
            .request(Method::POST, INSTANCES_PATH, self.create_params(resources))
            .await
            .map(|value| {
                serde_json::from_value::<CreatedInstance>(value).map_or_else(
                    |err| {
                        warn!(error = %err, "OVHcloud accepted a creation without a readable id");
                        None
                    },
                    |created| Some(created.id),
                )
            });
        (None, outcome)
    }

    /// Creates `count` instances named after the pool.
    ///
    /// The capacity check uses a listing taken before any creation and is
    /// not re-checked afterwards, so concurrent external creations can still
    /// push the project over the cap.
    pub(super) async fn create_batch(&self, count: usize) -> Result<(), OvhCloudError> {
        let current = self.running_count().await?;
        check_capacity(self.config.max_running_instances, current, count)?;
        if count == 0 {
            debug!(current, "no OVHcloud instances requested");
            return Ok(());
        }

        let resources = self.resolved_resources().await?;
        info!(
            count,
            current,
            pool = %self.config.name,
            flavor_id = %resources.flavor_id,
            "creating OVHcloud instances"
        );
        let outcomes = join_all((0..count).map(|_| self.create_one(resources))).await;
        settle(BatchOperation::Create, outcomes)
    }

    pub(super) async fn delete_one(&self, instance_id: &str) -> Result<(), ApiError> {
        let mut params = self.service_params();
        params.insert(String::from("instanceId"), Value::from(instance_id));
        debug!(instance_id, "deleting OVHcloud instance");
        self.api
            .request(Method::DELETE, INSTANCE_PATH, params)
            .await
            .map(|_| ())
    }

    pub(super) async fn delete_batch(
        &self,
        models: &[InstanceModel<RawInstance>],
    ) -> Result<(), OvhCloudError> {
        if models.is_empty() {
            return Ok(());
        }

        info!(count = models.len(), "deleting OVHcloud instances");
        let outcomes = join_all(models.iter().map(|model| async move {
            let id = model.provider_opts.id.clone();
            let outcome = self.delete_one(&id).await.map(|()| Some(id.clone()));
            (Some(id), outcome)
        }))
        .await;
        settle(BatchOperation::Delete, outcomes)
    }
}
