//! Per-module "does this package exist" cache.
//!
//! Each module owns at most one [`PackageSet`]: every package declared by an
//! indexed source file in the module's content scope, closed under parents.
//! The set is tagged with the module's modification count observed before
//! the scan and is only served while that count is unchanged. Recomputation
//! happens lazily, on the first read after the counter moves.

use crate::config::CacheConfig;
use crate::error::Result;
use crate::services::ResolutionServices;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use declscope_api::{
    ApiResult, FileKind, IndexQuery, ModificationTracker, ModuleId, QualifiedName, ScopeProvider,
};
use rayon::prelude::*;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Immutable snapshot of the packages visible to one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSet {
    module: ModuleId,
    tag: u64,
    names: HashSet<QualifiedName>,
}

impl PackageSet {
    pub fn empty(module: ModuleId, tag: u64) -> Self {
        Self {
            module,
            tag,
            names: HashSet::new(),
        }
    }

    /// Build a set from declared packages, adding every ancestor including
    /// the root.
    pub fn from_packages(
        module: ModuleId,
        tag: u64,
        packages: impl IntoIterator<Item = QualifiedName>,
    ) -> Self {
        let mut names = HashSet::new();
        for package in packages {
            for ancestor in package.ancestors() {
                // An ancestor already present has its whole chain present too.
                if !names.insert(ancestor) {
                    break;
                }
            }
        }
        Self { module, tag, names }
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    /// Modification count observed before the scan that produced this set.
    pub fn tag(&self) -> u64 {
        self.tag
    }

    pub fn contains(&self, name: &QualifiedName) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn sorted(&self) -> Vec<QualifiedName> {
        let mut names: Vec<_> = self.names.iter().cloned().collect();
        names.sort();
        names
    }

    /// Direct sub-packages of `name`, sorted.
    pub fn children_of(&self, name: &QualifiedName) -> Vec<QualifiedName> {
        let mut children: Vec<_> = self
            .names
            .iter()
            .filter(|candidate| candidate.parent().as_ref() == Some(name))
            .cloned()
            .collect();
        children.sort();
        children
    }
}

struct CachedEntry {
    set: Arc<PackageSet>,
    /// Access sequence number of the last publish or hit.
    last_used: AtomicU64,
}

#[derive(Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    recomputations: AtomicU64,
    empty_scope_short_circuits: AtomicU64,
    evictions: AtomicU64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub recomputations: u64,
    pub empty_scope_short_circuits: u64,
    pub evictions: u64,
    pub cached_modules: usize,
}

pub struct PackageExistenceCache {
    scopes: Arc<dyn ScopeProvider>,
    index: Arc<dyn IndexQuery>,
    trackers: Arc<dyn ModificationTracker>,
    config: CacheConfig,
    entries: DashMap<ModuleId, CachedEntry>,
    access_seq: AtomicU64,
    counters: Counters,
}

impl PackageExistenceCache {
    pub fn new(services: &ResolutionServices, config: CacheConfig) -> Self {
        Self {
            scopes: Arc::clone(&services.scopes),
            index: Arc::clone(&services.index),
            trackers: Arc::clone(&services.trackers),
            config,
            entries: DashMap::new(),
            access_seq: AtomicU64::new(0),
            counters: Counters::default(),
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Whether any indexed source file visible to `module` declares `name`
    /// or a package nested under it.
    pub fn exists(&self, module: ModuleId, name: &QualifiedName) -> Result<bool> {
        Ok(self.packages(module)?.contains(name))
    }

    /// The current package set for `module`, recomputed if the module changed
    /// since it was last computed.
    pub fn packages(&self, module: ModuleId) -> Result<Arc<PackageSet>> {
        let current = self.trackers.modification_count(module);

        if let Some(entry) = self.entries.get(&module) {
            if entry.set.tag == current {
                entry.last_used.store(self.next_access(), Ordering::Relaxed);
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                tracing::trace!("Package set hit for {} at {}", module, current);
                return Ok(Arc::clone(&entry.set));
            }
        }

        self.counters.misses.fetch_add(1, Ordering::Relaxed);
        let set = Arc::new(self.compute(module, current)?);
        self.publish(module, Arc::clone(&set));
        Ok(set)
    }

    /// Direct sub-packages of `name` visible to `module`.
    pub fn sub_packages(&self, module: ModuleId, name: &QualifiedName) -> Result<Vec<QualifiedName>> {
        Ok(self.packages(module)?.children_of(name))
    }

    /// Recompute from the index without reading or publishing the cached
    /// entry.
    pub fn compute_fresh(&self, module: ModuleId) -> Result<PackageSet> {
        let tag = self.trackers.modification_count(module);
        self.compute(module, tag)
    }

    pub fn exists_fresh(&self, module: ModuleId, name: &QualifiedName) -> Result<bool> {
        Ok(self.compute_fresh(module)?.contains(name))
    }

    /// Cached entry for `module`, stale or not, without recomputation.
    pub fn peek(&self, module: ModuleId) -> Option<Arc<PackageSet>> {
        self.entries.get(&module).map(|entry| Arc::clone(&entry.set))
    }

    pub fn cached_tag(&self, module: ModuleId) -> Option<u64> {
        self.entries.get(&module).map(|entry| entry.set.tag)
    }

    /// Forget a module that no longer exists.
    pub fn dispose_module(&self, module: ModuleId) -> bool {
        let removed = self.entries.remove(&module).is_some();
        if removed {
            tracing::debug!("Disposed package set of {}", module);
        }
        removed
    }

    /// Drop the least recently used entries until at most `keep` remain.
    pub fn trim(&self, keep: usize) -> usize {
        let mut evicted = 0;
        while self.entries.len() > keep {
            let oldest = self
                .entries
                .iter()
                .min_by_key(|entry| entry.value().last_used.load(Ordering::Relaxed))
                .map(|entry| *entry.key());
            match oldest {
                Some(module) => {
                    if self.entries.remove(&module).is_some() {
                        evicted += 1;
                    }
                }
                None => break,
            }
        }
        if evicted > 0 {
            self.counters
                .evictions
                .fetch_add(evicted as u64, Ordering::Relaxed);
        }
        evicted
    }

    /// Release every cached set. Later reads recompute.
    pub fn on_memory_pressure(&self) -> usize {
        let evicted = self.entries.len();
        self.entries.clear();
        if evicted > 0 {
            self.counters
                .evictions
                .fetch_add(evicted as u64, Ordering::Relaxed);
            tracing::warn!("Dropped {} package sets under memory pressure", evicted);
        }
        evicted
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            recomputations: self.counters.recomputations.load(Ordering::Relaxed),
            empty_scope_short_circuits: self
                .counters
                .empty_scope_short_circuits
                .load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            cached_modules: self.entries.len(),
        }
    }

    /// Scan the index. `tag` must be read before the scan starts so that an
    /// edit landing mid-scan leaves the result already stale.
    fn compute(&self, module: ModuleId, tag: u64) -> Result<PackageSet> {
        let scope = self.scopes.content_scope(module)?;
        if scope.is_empty() {
            self.counters
                .empty_scope_short_circuits
                .fetch_add(1, Ordering::Relaxed);
            tracing::trace!("Empty content scope for {}", module);
            return Ok(PackageSet::empty(module, tag));
        }

        self.counters.recomputations.fetch_add(1, Ordering::Relaxed);
        let files = self.index.files(FileKind::Source, &scope)?;

        let packages: Vec<QualifiedName> = if self.config.parallel_scan {
            files
                .par_iter()
                .map(|file| self.index.package_of(file))
                .collect::<ApiResult<_>>()?
        } else {
            files
                .iter()
                .map(|file| self.index.package_of(file))
                .collect::<ApiResult<_>>()?
        };

        let set = PackageSet::from_packages(module, tag, packages);
        tracing::debug!(
            "Computed {} packages from {} files for {} at {}",
            set.len(),
            files.len(),
            module,
            tag
        );
        Ok(set)
    }

    fn next_access(&self) -> u64 {
        self.access_seq.fetch_add(1, Ordering::Relaxed)
    }

    /// Racing publishers are fine: an entry is never replaced by one with an
    /// older tag, and among equal tags the last write wins.
    fn publish(&self, module: ModuleId, set: Arc<PackageSet>) {
        let last_used = AtomicU64::new(self.next_access());
        match self.entries.entry(module) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().set.tag <= set.tag {
                    occupied.insert(CachedEntry { set, last_used });
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CachedEntry { set, last_used });
            }
        }

        let capacity = self.config.max_modules.max(1);
        if self.entries.len() > capacity {
            let evicted = self.trim(capacity);
            tracing::debug!("Evicted {} package sets over capacity {}", evicted, capacity);
        }
    }
}
