//! Error types for the OVHcloud provider.

use std::fmt;

use thiserror::Error;

use crate::config::ConfigError;
use crate::provider::ProviderError;

use super::client::ApiError;
use super::types::ResourceKind;

/// Coarse classification of [`OvhCloudError`] so callers can branch on the
/// failure class without matching every variant.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ErrorKind {
    /// Missing or unusable configuration.
    Configuration,
    /// The running-instance cap would be exceeded.
    CapacityExceeded,
    /// A named flavor, snapshot, or SSH key does not exist.
    ResourceNotFound,
    /// The vendor API rejected or failed a request.
    VendorRequest,
    /// The operation is not offered by this provider.
    UnsupportedOperation,
}

/// Fan-out operation reported by a [`BatchFailure`].
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum BatchOperation {
    /// Instance creation.
    Create,
    /// Instance deletion.
    Delete,
}

impl fmt::Display for BatchOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Create => "create",
            Self::Delete => "delete",
        })
    }
}

/// A single failed request inside a batch.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SlotFailure {
    /// Position of the request within the batch.
    pub slot: usize,
    /// Instance targeted by the request, when known (deletions only).
    pub instance_id: Option<String>,
    /// Vendor failure for this slot.
    pub error: ApiError,
}

/// Outcome of a batch in which at least one request failed.
///
/// Completed requests are not rolled back; `completed` has one entry per
/// successful request so the caller can reconcile by re-listing.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BatchFailure {
    /// Operation performed by the batch.
    pub operation: BatchOperation,
    /// Number of requests issued.
    pub attempted: usize,
    /// Instance id affected by each successful request, or `None` when the
    /// vendor accepted a creation without returning a readable id.
    pub completed: Vec<Option<String>>,
    /// Requests that failed.
    pub failures: Vec<SlotFailure>,
}

impl fmt::Display for BatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} batch: {} of {} requests failed ({} completed)",
            self.operation,
            self.failures.len(),
            self.attempted,
            self.completed.len()
        )?;
        if let Some(first) = self.failures.first() {
            write!(f, "; first failure: {}", first.error)?;
        }
        Ok(())
    }
}

/// Errors raised by the OVHcloud provider.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum OvhCloudError {
    /// Raised when the configuration is incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Raised when creating the requested instances would breach the cap.
    #[error(
        "cannot create {requested} instance(s): {current} running, limit is {max}"
    )]
    CapacityExceeded {
        /// Non-terminating instances currently in the project.
        current: usize,
        /// Instances requested by the caller.
        requested: usize,
        /// Configured cap.
        max: u32,
    },
    /// Raised when a flavor, snapshot, or SSH key cannot be found by name.
    #[error("{kind} '{name}' not found by name in region {region}")]
    ResourceNotFound {
        /// Kind of resource being resolved.
        kind: ResourceKind,
        /// Name that was looked up.
        name: String,
        /// Region used for the lookup.
        region: String,
    },
    /// Wrapper for vendor API failures.
    #[error("vendor request failed: {0}")]
    VendorRequest(#[from] ApiError),
    /// Raised when the caller invokes an operation the provider lacks.
    #[error("unsupported method: {operation}")]
    UnsupportedOperation {
        /// Name of the rejected operation.
        operation: String,
    },
    /// Raised when some requests of a create or delete fan-out failed.
    #[error("{0}")]
    Batch(Box<BatchFailure>),
}

impl OvhCloudError {
    /// Classifies the error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Config(_) => ErrorKind::Configuration,
            Self::CapacityExceeded { .. } => ErrorKind::CapacityExceeded,
            Self::ResourceNotFound { .. } => ErrorKind::ResourceNotFound,
            Self::VendorRequest(_) | Self::Batch(_) => ErrorKind::VendorRequest,
            Self::UnsupportedOperation { .. } => ErrorKind::UnsupportedOperation,
        }
    }

    /// Returns the batch report when the error came from a fan-out.
    #[must_use]
    pub fn batch(&self) -> Option<&BatchFailure> {
        match self {
            Self::Batch(report) => Some(report),
            _ => None,
        }
    }
}

impl From<ProviderError> for OvhCloudError {
    fn from(value: ProviderError) -> Self {
        match value {
            ProviderError::Unsupported(operation) => Self::UnsupportedOperation { operation },
        }
    }
}

impl From<BatchFailure> for OvhCloudError {
    fn from(value: BatchFailure) -> Self {
        Self::Batch(Box::new(value))
    }
}
