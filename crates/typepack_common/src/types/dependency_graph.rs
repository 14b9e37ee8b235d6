use std::{
  fmt,
  sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use arcstr::ArcStr;
use rustc_hash::FxHashMap;
use typepack_utils::indexmap::{FxIndexMap, FxIndexSet};

pub type SharedDependencyGraph = Arc<DependencyGraph>;

/// Per-entrypoint sets of files reachable through relative imports.
///
/// Written by the resolve plugin during a build pass, read by the dts plugin and the watcher
/// once the pass has ended. Every file also has exactly one owning entrypoint, the first one
/// whose resolution discovered it. Imports found *in* a file are credited to its owner.
#[derive(Debug, Default)]
pub struct DependencyGraph {
  inner: RwLock<GraphInner>,
}

#[derive(Debug, Default)]
struct GraphInner {
  entries: FxIndexMap<ArcStr, FxIndexSet<ArcStr>>,
  owners: FxHashMap<ArcStr, ArcStr>,
}

/// The importer of a resolution event has no owning entrypoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnownedImporter(pub ArcStr);

impl fmt::Display for UnownedImporter {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "importer {:?} is not owned by any entrypoint", self.0.as_str())
  }
}

impl std::error::Error for UnownedImporter {}

impl DependencyGraph {
  fn read(&self) -> RwLockReadGuard<'_, GraphInner> {
    self.inner.read().unwrap_or_else(PoisonError::into_inner)
  }

  fn write(&self) -> RwLockWriteGuard<'_, GraphInner> {
    self.inner.write().unwrap_or_else(PoisonError::into_inner)
  }

  /// Drops everything recorded so far and seeds every entry as its own set and owner.
  pub fn reset<I: IntoIterator<Item = ArcStr>>(&self, entries: I) {
    let mut inner = self.write();
    inner.entries.clear();
    inner.owners.clear();
    for entry in entries {
      inner.owners.insert(entry.clone(), entry.clone());
      inner.entries.entry(entry.clone()).or_default().insert(entry);
    }
  }

  /// Credits `dependency` to the owner of `importer`.
  ///
  /// Returns `true` when `dependency` had no owner yet and now inherits the importer's.
  pub fn add_dependency(
    &self,
    importer: &str,
    dependency: ArcStr,
  ) -> Result<bool, UnownedImporter> {
    let mut inner = self.write();
    let Some(owner) = inner.owners.get(importer).cloned() else {
      return Err(UnownedImporter(importer.into()));
    };
    inner.entries.entry(owner.clone()).or_default().insert(dependency.clone());
    match inner.owners.entry(dependency) {
      std::collections::hash_map::Entry::Occupied(_) => Ok(false),
      std::collections::hash_map::Entry::Vacant(vacant) => {
        vacant.insert(owner);
        Ok(true)
      }
    }
  }

  pub fn entries(&self) -> Vec<ArcStr> {
    self.read().entries.keys().cloned().collect()
  }

  pub fn dependencies(&self, entry: &str) -> Option<Vec<ArcStr>> {
    self.read().entries.get(entry).map(|files| files.iter().cloned().collect())
  }

  pub fn owner(&self, file: &str) -> Option<ArcStr> {
    self.read().owners.get(file).cloned()
  }

  /// Whether `file` belongs to any entrypoint's set.
  pub fn contains(&self, file: &str) -> bool {
    self.read().owners.contains_key(file)
  }

  /// Union of every entrypoint's set, in discovery order.
  pub fn files(&self) -> FxIndexSet<ArcStr> {
    self.read().entries.values().flatten().cloned().collect()
  }

  pub fn is_empty(&self) -> bool {
    self.read().entries.is_empty()
  }
}
