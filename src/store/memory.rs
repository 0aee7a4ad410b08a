//! In-process package store

use crate::error::{CarryLinkError, Result};
use crate::package::Package;
use crate::types::PackageId;
use std::collections::HashMap;
use std::sync::RwLock;

use super::{check_swap, newest_first, PackageStore};

/// Package store backed by a `HashMap` behind a lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    packages: RwLock<HashMap<PackageId, Package>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: T) -> CarryLinkError {
    CarryLinkError::StateCorruption("package store lock poisoned".to_string())
}

impl PackageStore for MemoryStore {
    fn insert(&self, package: Package) -> Result<()> {
        let mut packages = self.packages.write().map_err(poisoned)?;
        if packages.contains_key(&package.id) {
            return Err(CarryLinkError::PackageAlreadyExists(package.id.0.clone()));
        }
        packages.insert(package.id.clone(), package);
        Ok(())
    }

    fn load(&self, id: &PackageId) -> Result<Package> {
        let packages = self.packages.read().map_err(poisoned)?;
        packages
            .get(id)
            .cloned()
            .ok_or_else(|| CarryLinkError::PackageNotFound(id.0.clone()))
    }

    fn compare_and_swap(&self, current: &Package, next: Package) -> Result<()> {
        let mut packages = self.packages.write().map_err(poisoned)?;
        let stored = packages
            .get_mut(&current.id)
            .ok_or_else(|| CarryLinkError::PackageNotFound(current.id.0.clone()))?;

        check_swap(stored, current, &next)?;
        *stored = next;
        Ok(())
    }

    fn list(&self) -> Result<Vec<Package>> {
        let packages = self.packages.read().map_err(poisoned)?;
        let mut all: Vec<Package> = packages.values().cloned().collect();
        newest_first(&mut all);
        Ok(all)
    }
}
