//! Listing pipeline: describe, summarise, filter, map.

use reqwest::Method;
use tracing::{debug, warn};

use crate::provider::{InstanceAddress, InstanceModel, InstanceStatus};

use super::types::{InstanceSummary, RawInstance, VendorStatus};
use super::{INSTANCES_PATH, OvhApi, OvhCloudError, OvhCloudProvider, PROVIDER_NAME};

/// Translates a vendor status into the contract's status.
///
/// Statuses other than `ACTIVE`, `BUILD` and `ERROR` are reported as
/// [`InstanceStatus::Error`] and logged.
#[must_use]
pub fn map_status(status: &VendorStatus, instance_id: &str) -> InstanceStatus {
    match status {
        VendorStatus::Active => InstanceStatus::Started,
        VendorStatus::Build => InstanceStatus::Starting,
        VendorStatus::Error => InstanceStatus::Error,
        other => {
            warn!(
                instance_id,
                status = %other,
                "unexpected OVHcloud instance status, reporting ERROR"
            );
            InstanceStatus::Error
        }
    }
}

pub(super) fn to_model(
    summary: InstanceSummary,
    raw: RawInstance,
    port: u16,
) -> InstanceModel<RawInstance> {
    InstanceModel {
        status: map_status(&summary.status, &summary.id),
        address: summary
            .ip
            .map(|hostname| InstanceAddress { hostname, port }),
        id: summary.id,
        provider_name: PROVIDER_NAME.to_owned(),
        provider_opts: raw,
    }
}

/// Keeps the pool's live instances and maps them to models, preserving
/// vendor order.
pub(super) fn pool_models(
    instances: Vec<RawInstance>,
    prefix: &str,
    port: u16,
) -> Vec<InstanceModel<RawInstance>> {
    instances
        .into_iter()
        .map(|raw| (InstanceSummary::from(&raw), raw))
        .filter(|(summary, _)| !summary.status.is_deleting())
        .filter(|(summary, _)| summary.name.starts_with(prefix))
        .map(|(summary, raw)| to_model(summary, raw, port))
        .collect()
}

impl<A: OvhApi> OvhCloudProvider<A> {
    /// Fetches every instance of the project in the configured region.
    ///
    /// # Errors
    ///
    /// Returns [`OvhCloudError::VendorRequest`] when the call fails or the
    /// response cannot be decoded.
    pub async fn describe_instances(&self) -> Result<Vec<RawInstance>, OvhCloudError> {
        let value = self
            .api
            .request(Method::GET, INSTANCES_PATH, self.regional_params())
            .await?;
        Ok(self.decode(&Method::GET, INSTANCES_PATH, value)?)
    }

    /// Lists the pool's instances, excluding those being deleted.
    ///
    /// # Errors
    ///
    /// Returns [`OvhCloudError::VendorRequest`] when the vendor call fails;
    /// no partial result is returned.
    pub async fn list_instances(&self) -> Result<Vec<InstanceModel<RawInstance>>, OvhCloudError> {
        let instances = self.describe_instances().await?;
        let described = instances.len();
        let models = pool_models(instances, &self.config.name, self.port);
        debug!(
            described,
            kept = models.len(),
            pool = %self.config.name,
            "listed OVHcloud instances"
        );
        Ok(models)
    }
}
