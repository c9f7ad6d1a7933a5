//! Container store collaborator.

use async_trait::async_trait;

use crate::error::StorageResult;
use crate::types::ContainerRef;

/// The store that owns the data containers (spectra) and their cache.
///
/// The sample-data store only needs two things from it: resolving a sample ID
/// to its container, and evicting that container's cached view after its
/// sample data changed.
#[async_trait]
pub trait ContainerStore: Send + Sync {
    /// Resolves a container by sample ID and, if given, format.
    async fn load(&self, sample_id: &str, format: Option<&str>)
    -> StorageResult<Option<ContainerRef>>;

    /// Evicts the cached view of the container with the given internal ID.
    ///
    /// Must be idempotent.
    async fn evict_cache(&self, auto_id: i64);
}
