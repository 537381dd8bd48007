//! Name-to-id resolution for flavors, snapshots, and SSH keys.

use reqwest::Method;
use tracing::debug;

use super::types::{NamedResource, ResourceKind};
use super::{OvhApi, OvhCloudError, OvhCloudProvider};

/// Vendor ids backing the configured flavor, snapshot, and SSH key names.
///
/// Resolved on the first creation request and kept for the lifetime of the
/// provider; renames on the vendor side are not picked up.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedResources {
    /// Flavor id.
    pub flavor_id: String,
    /// Snapshot id, sent as the image id.
    pub snapshot_id: String,
    /// SSH key id.
    pub ssh_key_id: String,
}

/// Returns the id of the first resource whose name matches exactly.
pub(super) fn find_by_name<'a>(items: &'a [NamedResource], name: &str) -> Option<&'a str> {
    items
        .iter()
        .find(|item| item.name == name)
        .map(|item| item.id.as_str())
}

impl<A: OvhApi> OvhCloudProvider<A> {
    /// Returns the resolved resource ids, looking them up on first use.
    ///
    /// The three lookups run concurrently. Concurrent callers wait on the
    /// same initialisation; a failed lookup leaves the cache empty.
    ///
    /// # Errors
    ///
    /// Returns [`OvhCloudError::ResourceNotFound`] when a name has no match
    /// and [`OvhCloudError::VendorRequest`] when a lookup fails.
    pub async fn resolved_resources(&self) -> Result<&ResolvedResources, OvhCloudError> {
        self.resources
            .get_or_try_init(|| async {
                let (flavor_id, snapshot_id, ssh_key_id) = tokio::try_join!(
                    self.resolve_by_name(ResourceKind::Flavor, &self.config.flavor),
                    self.resolve_by_name(ResourceKind::Snapshot, &self.config.snapshot),
                    self.resolve_by_name(ResourceKind::SshKey, &self.config.ssh_key),
                )?;
                debug!(
                    flavor_id = %flavor_id,
                    snapshot_id = %snapshot_id,
                    ssh_key_id = %ssh_key_id,
                    "resolved OVHcloud resources"
                );
                Ok::<ResolvedResources, OvhCloudError>(ResolvedResources {
                    flavor_id,
                    snapshot_id,
                    ssh_key_id,
                })
            })
            .await
    }

    async fn resolve_by_name(
        &self,
        kind: ResourceKind,
        name: &str,
    ) -> Result<String, OvhCloudError> {
        let path = kind.list_path();
        let value = self
            .api
            .request(Method::GET, path, self.regional_params())
            .await?;
        let items: Vec<NamedResource> = self.decode(&Method::GET, path, value)?;
        find_by_name(&items, name)
            .map(str::to_owned)
            .ok_or_else(|| OvhCloudError::ResourceNotFound {
                kind,
                name: name.to_owned(),
                region: self.config.region.clone(),
            })
    }
}
