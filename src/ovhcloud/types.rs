//! Wire types for the OVHcloud Public Cloud API.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Instance status as reported by the vendor.
#[derive(Clone, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(from = "String", into = "String")]
pub enum VendorStatus {
    /// Running.
    Active,
    /// Being built.
    Build,
    /// Being torn down.
    Deleting,
    /// Failed.
    Error,
    /// Any status this crate does not interpret.
    Other(String),
}

impl VendorStatus {
    /// Returns the vendor's spelling of the status.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Active => "ACTIVE",
            Self::Build => "BUILD",
            Self::Deleting => "DELETING",
            Self::Error => "ERROR",
            Self::Other(raw) => raw.as_str(),
        }
    }

    /// Reports whether the instance is being torn down.
    #[must_use]
    pub const fn is_deleting(&self) -> bool {
        matches!(self, Self::Deleting)
    }
}

impl From<String> for VendorStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "ACTIVE" => Self::Active,
            "BUILD" => Self::Build,
            "DELETING" => Self::Deleting,
            "ERROR" => Self::Error,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for VendorStatus {
    fn from(value: &str) -> Self {
        Self::from(value.to_owned())
    }
}

impl From<VendorStatus> for String {
    fn from(value: VendorStatus) -> Self {
        match value {
            VendorStatus::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for VendorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// IP address attached to an instance.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IpAddress {
    /// Address literal.
    pub ip: String,
    /// `public` or `private`.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// IP version (4 or 6).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u8>,
    /// Remaining vendor fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Instance exactly as returned by the list endpoint.
///
/// Fields the crate does not use are kept in `extra` so the whole payload
/// travels with the model.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawInstance {
    /// Vendor instance id.
    pub id: String,
    /// Instance name.
    pub name: String,
    /// Vendor status.
    pub status: VendorStatus,
    /// Addresses in vendor order.
    #[serde(default)]
    pub ip_addresses: Vec<IpAddress>,
    /// Remaining vendor fields.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Flattened view of a [`RawInstance`] used by the listing pipeline.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct InstanceSummary {
    /// Vendor instance id.
    pub id: String,
    /// Vendor status.
    pub status: VendorStatus,
    /// Instance name.
    pub name: String,
    /// First address, if any.
    pub ip: Option<String>,
}

impl From<&RawInstance> for InstanceSummary {
    fn from(raw: &RawInstance) -> Self {
        Self {
            id: raw.id.clone(),
            status: raw.status.clone(),
            name: raw.name.clone(),
            ip: raw.ip_addresses.first().map(|address| address.ip.clone()),
        }
    }
}

/// Kind of named resource resolved before creating instances.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ResourceKind {
    /// Hardware flavor.
    Flavor,
    /// Boot snapshot.
    Snapshot,
    /// SSH key.
    SshKey,
}

impl ResourceKind {
    /// Path template of the list endpoint for this resource.
    #[must_use]
    pub const fn list_path(self) -> &'static str {
        match self {
            Self::Flavor => "/cloud/project/{serviceName}/flavor",
            Self::Snapshot => "/cloud/project/{serviceName}/snapshot",
            Self::SshKey => "/cloud/project/{serviceName}/sshkey",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Flavor => "flavor",
            Self::Snapshot => "snapshot",
            Self::SshKey => "ssh key",
        })
    }
}

/// Id/name pair shared by flavors, snapshots, and SSH keys.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub struct NamedResource {
    /// Vendor id.
    pub id: String,
    /// Human readable name.
    pub name: String,
}

/// Instance returned by the creation endpoint; only the id is needed.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq)]
pub(crate) struct CreatedInstance {
    pub(crate) id: String,
}
