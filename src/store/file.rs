//! JSON file package store used by the CLI

use crate::error::{CarryLinkError, Result};
use crate::package::Package;
use crate::types::PackageId;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::ffi::OsString;
use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};

use super::{check_swap, newest_first, PackageStore};

/// On-disk document layout
#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    packages: Vec<Package>,
}

/// Package store persisted as a single JSON document
///
/// Each operation reads the whole file and every write replaces it through a
/// temporary file and rename. Operations hold an OS lock on a sidecar
/// `<path>.lock` file: shared for reads, exclusive for read-check-write, so
/// separate processes on the same path see each other's swaps.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    lock_path: PathBuf,
    tmp_path: PathBuf,
}

/// Held OS lock, released on drop
struct FileLock(File);

impl Drop for FileLock {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.0);
    }
}

fn sidecar(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            lock_path: sidecar(&path, ".lock"),
            tmp_path: sidecar(&path, ".tmp"),
            path,
        }
    }

    fn open_lock(&self) -> Result<File> {
        Ok(OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.lock_path)?)
    }

    fn shared(&self) -> Result<FileLock> {
        let file = self.open_lock()?;
        FileExt::lock_shared(&file)?;
        Ok(FileLock(file))
    }

    fn exclusive(&self) -> Result<FileLock> {
        let file = self.open_lock()?;
        FileExt::lock_exclusive(&file)?;
        Ok(FileLock(file))
    }

    fn read(&self) -> Result<StoreFile> {
        if !self.path.exists() {
            return Ok(StoreFile::default());
        }
        let raw = fs::read_to_string(&self.path)?;
        if raw.trim().is_empty() {
            return Ok(StoreFile::default());
        }
        serde_json::from_str(&raw).map_err(|err| {
            if err.is_data() {
                CarryLinkError::StateCorruption(format!("{}: {err}", self.path.display()))
            } else {
                CarryLinkError::Json(err)
            }
        })
    }

    fn write(&self, file: &StoreFile) -> Result<()> {
        let serialized = serde_json::to_string_pretty(file)?;
        fs::write(&self.tmp_path, serialized)?;
        fs::rename(&self.tmp_path, &self.path)?;
        tracing::debug!(path = %self.path.display(), packages = file.packages.len(), "store written");
        Ok(())
    }
}

impl PackageStore for JsonFileStore {
    fn insert(&self, package: Package) -> Result<()> {
        let _lock = self.exclusive()?;
        let mut file = self.read()?;
        if file.packages.iter().any(|p| p.id == package.id) {
            return Err(CarryLinkError::PackageAlreadyExists(package.id.0.clone()));
        }
        file.packages.push(package);
        self.write(&file)
    }

    fn load(&self, id: &PackageId) -> Result<Package> {
        let _lock = self.shared()?;
        self.read()?
            .packages
            .into_iter()
            .find(|p| &p.id == id)
            .ok_or_else(|| CarryLinkError::PackageNotFound(id.0.clone()))
    }

    fn compare_and_swap(&self, current: &Package, next: Package) -> Result<()> {
        let _lock = self.exclusive()?;
        let mut file = self.read()?;
        let stored = file
            .packages
            .iter_mut()
            .find(|p| p.id == current.id)
            .ok_or_else(|| CarryLinkError::PackageNotFound(current.id.0.clone()))?;

        check_swap(stored, current, &next)?;
        *stored = next;
        self.write(&file)
    }

    fn list(&self) -> Result<Vec<Package>> {
        let _lock = self.shared()?;
        let mut packages = self.read()?.packages;
        newest_first(&mut packages);
        Ok(packages)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::negotiation::NegotiationEngine;
    use crate::package::NewPackage;
    use crate::types::{PackageSize, Party};
    use rand::RngCore;
    use std::sync::{Arc, Barrier};
    use std::thread;
    use std::time::SystemTime;

    fn temp_path() -> PathBuf {
        let mut bytes = [0u8; 8];
        rand::thread_rng().fill_bytes(&mut bytes);
        std::env::temp_dir().join(format!("carrylink_{}.json", hex::encode(bytes)))
    }

    fn cleanup(path: &Path) {
        let _ = fs::remove_file(path);
        let _ = fs::remove_file(sidecar(path, ".lock"));
    }

    fn package() -> Package {
        Package::post(
            NewPackage {
                sender: Party::new("S", "Sade"),
                origin_city: "Kano".to_string(),
                destination_city: "Kaduna".to_string(),
                size: PackageSize::Small,
                weight_kg: 0.5,
                description: "Phone charger".to_string(),
                image_ref: Some("charger.png".to_string()),
                proposed_price: 3000.0,
            },
            SystemTime::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_missing_file_is_empty() {
        let store = JsonFileStore::new(temp_path());
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_persists_across_instances() {
        let path = temp_path();
        let pkg = package();

        let store = JsonFileStore::new(&path);
        store.insert(pkg.clone()).unwrap();

        let next = NegotiationEngine::new()
            .submit_offer(&pkg, &Party::new("T", "Tunde"), 2500.0)
            .unwrap();
        store.compare_and_swap(&pkg, next.clone()).unwrap();

        let reopened = JsonFileStore::new(&path);
        assert_eq!(reopened.load(&pkg.id).unwrap(), next);
        assert_eq!(reopened.list().unwrap().len(), 1);

        // the original snapshot is now stale
        let again = NegotiationEngine::new()
            .submit_offer(&pkg, &Party::new("T2", "Uche"), 2000.0)
            .unwrap();
        assert!(matches!(
            reopened.compare_and_swap(&pkg, again),
            Err(CarryLinkError::ConcurrentModification { .. })
        ));

        cleanup(&path);
    }

    #[test]
    fn test_independent_handles_reject_double_write() {
        let path = temp_path();
        let rounds = 50;

        for _ in 0..rounds {
            let pkg = package();
            JsonFileStore::new(&path).insert(pkg.clone()).unwrap();

            let barrier = Arc::new(Barrier::new(2));
            let handles: Vec<_> = [("T1", "Tobi", 2500.0), ("T2", "Uche", 2400.0)]
                .into_iter()
                .map(|(id, name, price)| {
                    let barrier = Arc::clone(&barrier);
                    let path = path.clone();
                    let pkg = pkg.clone();
                    thread::spawn(move || {
                        // each writer has its own handle, as separate CLI processes do
                        let store = JsonFileStore::new(&path);
                        let snapshot = store.load(&pkg.id).unwrap();
                        let next = NegotiationEngine::new()
                            .submit_offer(&snapshot, &Party::new(id, name), price)
                            .unwrap();
                        barrier.wait();
                        store.compare_and_swap(&snapshot, next)
                    })
                })
                .collect();

            let results: Vec<Result<()>> =
                handles.into_iter().map(|h| h.join().unwrap()).collect();
            let wins = results.iter().filter(|r| r.is_ok()).count();
            assert_eq!(wins, 1, "exactly one writer may win: {:?}", results);
            assert!(results.iter().any(|r| matches!(
                r,
                Err(CarryLinkError::ConcurrentModification { .. })
            )));

            let stored = JsonFileStore::new(&path).load(&pkg.id).unwrap();
            assert_eq!(stored.version, 1);
            assert_eq!(stored.negotiation.unwrap().offers().len(), 2);
        }

        cleanup(&path);
    }

    #[test]
    fn test_inconsistent_negotiation_is_corruption() {
        let path = temp_path();
        let pkg = NegotiationEngine::new()
            .submit_offer(&package(), &Party::new("T", "Tunde"), 2500.0)
            .unwrap();

        let mut doc = serde_json::json!({ "packages": [pkg] });
        doc["packages"][0]["negotiation"]["offers"] = serde_json::json!([]);
        fs::write(&path, doc.to_string()).unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(
            store.load(&pkg.id),
            Err(CarryLinkError::StateCorruption(_))
        ));

        cleanup(&path);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let path = temp_path();
        fs::write(&path, "{not json").unwrap();

        let store = JsonFileStore::new(&path);
        assert!(matches!(store.list(), Err(CarryLinkError::Json(_))));

        cleanup(&path);
    }
}
