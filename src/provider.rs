//! Provider abstraction consumed by the fleet manager.
//!
//! Every cloud vendor integration exposes the same five lifecycle operations
//! and reports instances through the provider-agnostic [`InstanceModel`].

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use thiserror::Error;

/// Lifecycle state of an instance as seen by the fleet manager.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum InstanceStatus {
    /// The instance is running and can accept traffic.
    Started,
    /// The instance is still booting.
    Starting,
    /// The instance failed or is in a state the provider cannot interpret.
    Error,
}

impl InstanceStatus {
    /// Returns the canonical upper-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Started => "STARTED",
            Self::Starting => "STARTING",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Network location at which an instance serves the pool's workload.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct InstanceAddress {
    /// IP address or host name of the instance.
    pub hostname: String,
    /// TCP port the workload listens on.
    pub port: u16,
}

/// Provider-agnostic view of a single instance.
///
/// `provider_opts` keeps the vendor payload the model was built from so the
/// provider can recover its own identifiers when the fleet manager hands the
/// model back (for example on deletion).
#[derive(Clone, Debug, PartialEq)]
pub struct InstanceModel<O> {
    /// Vendor identifier of the instance.
    pub id: String,
    /// Name of the provider that produced the model.
    pub provider_name: String,
    /// Translated lifecycle state.
    pub status: InstanceStatus,
    /// Address when the instance exposes at least one IP.
    pub address: Option<InstanceAddress>,
    /// Raw vendor payload.
    pub provider_opts: O,
}

impl<O> InstanceModel<O> {
    /// Reports whether the instance can be reached.
    #[must_use]
    pub const fn has_address(&self) -> bool {
        self.address.is_some()
    }
}

/// Errors raised by the contract itself, independent of any vendor.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ProviderError {
    /// Raised when an operation is not offered by a provider.
    #[error("unsupported method: {0}")]
    Unsupported(String),
}

/// Future returned by provider operations.
pub type ProviderFuture<'a, T, E> = Pin<Box<dyn Future<Output = Result<T, E>> + Send + 'a>>;

/// Interface implemented by every cloud vendor integration.
///
/// The fleet manager owns scheduling, polling and retries; providers perform
/// a single attempt per call and report failures as-is.
pub trait InstanceProvider {
    /// Provider specific error type. It must absorb contract-level errors
    /// such as [`ProviderError::Unsupported`].
    type Error: std::error::Error + From<ProviderError> + Send + Sync + 'static;
    /// Vendor payload carried in [`InstanceModel::provider_opts`].
    type Opts: Clone + Send + Sync;

    /// Lists the instances belonging to the configured pool, excluding those
    /// already being torn down.
    fn get_models(&self) -> ProviderFuture<'_, Vec<InstanceModel<Self::Opts>>, Self::Error>;

    /// Requests `count` new instances. Callers re-list to observe them.
    fn create_instances(&self, count: usize) -> ProviderFuture<'_, (), Self::Error>;

    /// Starts a stopped instance.
    ///
    /// Providers that cannot start instances keep this default, which fails
    /// with [`ProviderError::Unsupported`].
    fn start_instance<'a>(
        &'a self,
        model: &'a InstanceModel<Self::Opts>,
    ) -> ProviderFuture<'a, (), Self::Error> {
        let _ = model;
        let error: Self::Error = ProviderError::Unsupported(String::from("start_instance")).into();
        Box::pin(std::future::ready(Err::<(), Self::Error>(error)))
    }

    /// Deletes a single instance.
    fn delete_instance<'a>(
        &'a self,
        model: &'a InstanceModel<Self::Opts>,
    ) -> ProviderFuture<'a, (), Self::Error>;

    /// Deletes every instance in `models`.
    fn delete_instances<'a>(
        &'a self,
        models: &'a [InstanceModel<Self::Opts>],
    ) -> ProviderFuture<'a, (), Self::Error>;
}
