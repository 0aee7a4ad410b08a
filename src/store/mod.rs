//! Package persistence with optimistic concurrency
//!
//! Writers load a snapshot, compute the next state, and hand both back to
//! [`PackageStore::compare_and_swap`]. A write only lands if the stored
//! version still matches the snapshot the writer started from.

pub mod file;
pub mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::{CarryLinkError, Result};
use crate::package::Package;
use crate::types::PackageId;

/// Storage collaborator for packages
pub trait PackageStore: Send + Sync {
    /// Store a newly posted package
    fn insert(&self, package: Package) -> Result<()>;

    /// Load the latest snapshot of a package
    fn load(&self, id: &PackageId) -> Result<Package>;

    /// Replace `current` with `next` if nobody else wrote in between
    fn compare_and_swap(&self, current: &Package, next: Package) -> Result<()>;

    /// All packages, newest first
    fn list(&self) -> Result<Vec<Package>>;
}

/// Check a compare-and-swap against the stored snapshot
pub(crate) fn check_swap(stored: &Package, current: &Package, next: &Package) -> Result<()> {
    if next.id != current.id {
        return Err(CarryLinkError::StateCorruption(format!(
            "cannot replace package {} with {}",
            current.id, next.id
        )));
    }
    if next.traveler_id.is_some() != next.status.has_traveler() {
        return Err(CarryLinkError::StateCorruption(format!(
            "package {} is {} but traveler is {}",
            next.id,
            next.status,
            if next.traveler_id.is_some() { "set" } else { "unset" }
        )));
    }
    if stored.version != current.version || next.version <= current.version {
        return Err(CarryLinkError::ConcurrentModification {
            package_id: current.id.0.clone(),
            expected: current.version,
            found: stored.version,
        });
    }
    Ok(())
}

pub(crate) fn newest_first(packages: &mut [Package]) {
    packages.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}
