//! OVHcloud Public Cloud implementation of the instance provider contract.

mod client;
mod error;
mod lifecycle;
mod listing;
mod resources;
mod types;

use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::OnceCell;

use crate::config::OvhConfig;
use crate::provider::{InstanceModel, InstanceProvider, ProviderFuture};

pub use client::{ApiError, ApiFuture, HttpOvhApi, OvhApi, Params, expand_path, sign};
pub use error::{BatchFailure, BatchOperation, ErrorKind, OvhCloudError, SlotFailure};
pub use listing::map_status;
pub use resources::ResolvedResources;
pub use types::{
    InstanceSummary, IpAddress, NamedResource, RawInstance, ResourceKind, VendorStatus,
};

/// Name reported in [`InstanceModel::provider_name`].
pub const PROVIDER_NAME: &str = "ovhcloud";

const INSTANCES_PATH: &str = "/cloud/project/{serviceName}/instance";
const INSTANCE_PATH: &str = "/cloud/project/{serviceName}/instance/{instanceId}";

/// Provider that manages a pool of instances in one OVHcloud project and
/// region.
pub struct OvhCloudProvider<A = HttpOvhApi> {
    api: A,
    config: OvhConfig,
    port: u16,
    resources: OnceCell<ResolvedResources>,
}

impl OvhCloudProvider<HttpOvhApi> {
    /// Constructs a provider talking to the endpoint named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`OvhCloudError::Config`] when the configuration fails
    /// validation or the HTTP client cannot be built.
    pub fn new(config: OvhConfig) -> Result<Self, OvhCloudError> {
        config.validate()?;
        let api = HttpOvhApi::from_config(&config)?;
        Self::with_api(config, api)
    }
}

impl<A: OvhApi> OvhCloudProvider<A> {
    /// Constructs a provider over an arbitrary [`OvhApi`] implementation.
    ///
    /// # Errors
    ///
    /// Returns [`OvhCloudError::Config`] when the configuration fails
    /// validation.
    pub fn with_api(config: OvhConfig, api: A) -> Result<Self, OvhCloudError> {
        config.validate()?;
        let port = config.port()?;
        Ok(Self {
            api,
            config,
            port,
            resources: OnceCell::new(),
        })
    }

    /// Returns the configuration the provider was built with.
    #[must_use]
    pub const fn config(&self) -> &OvhConfig {
        &self.config
    }

    /// Returns the underlying API client.
    #[must_use]
    pub const fn api(&self) -> &A {
        &self.api
    }

    fn service_params(&self) -> Params {
        let mut params = Params::new();
        params.insert(
            String::from("serviceName"),
            Value::from(self.config.service_id.as_str()),
        );
        params
    }

    fn regional_params(&self) -> Params {
        let mut params = self.service_params();
        params.insert(
            String::from("region"),
            Value::from(self.config.region.as_str()),
        );
        params
    }

    /// Decodes a response body. Failures report the expanded request path.
    fn decode<T: DeserializeOwned>(
        &self,
        method: &Method,
        template: &str,
        value: Value,
    ) -> Result<T, ApiError> {
        serde_json::from_value(value).map_err(|err| {
            let path = expand_path(method, template, &mut self.service_params())
                .unwrap_or_else(|_| template.to_owned());
            ApiError::transport(method, &path, format!("unexpected response shape: {err}"))
        })
    }
}

impl<A: OvhApi> InstanceProvider for OvhCloudProvider<A> {
    type Error = OvhCloudError;
    type Opts = RawInstance;

    fn get_models(&self) -> ProviderFuture<'_, Vec<InstanceModel<RawInstance>>, OvhCloudError> {
        Box::pin(self.list_instances())
    }

    fn create_instances(&self, count: usize) -> ProviderFuture<'_, (), OvhCloudError> {
        Box::pin(self.create_batch(count))
    }

    fn delete_instance<'a>(
        &'a self,
        model: &'a InstanceModel<RawInstance>,
    ) -> ProviderFuture<'a, (), OvhCloudError> {
        Box::pin(async move {
            self.delete_one(&model.provider_opts.id).await?;
            Ok(())
        })
    }

    fn delete_instances<'a>(
        &'a self,
        models: &'a [InstanceModel<RawInstance>],
    ) -> ProviderFuture<'a, (), OvhCloudError> {
        Box::pin(self.delete_batch(models))
    }
}

#[cfg(test)]
mod tests;
