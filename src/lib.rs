//! OVHcloud instance provider for pool autoscaling.
//!
//! The crate exposes a provider abstraction used by a fleet manager to list,
//! create, and delete the instances of a named pool, and an OVHcloud Public
//! Cloud implementation that translates vendor statuses and addresses into a
//! provider-agnostic model.

pub mod config;
pub mod ovhcloud;
pub mod provider;
pub mod test_support;

pub use config::{ConfigError, OvhConfig};
pub use ovhcloud::{
    ApiError, BatchFailure, BatchOperation, ErrorKind, HttpOvhApi, OvhApi, OvhCloudError,
    OvhCloudProvider, RawInstance, ResolvedResources, VendorStatus,
};
pub use provider::{
    InstanceAddress, InstanceModel, InstanceProvider, InstanceStatus, ProviderError,
    ProviderFuture,
};
