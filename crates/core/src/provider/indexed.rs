use super::{DeclarationProvider, ProviderKind};
use crate::cache::PackageExistenceCache;
use crate::error::Result;
use crate::services::ResolutionServices;
use dashmap::DashMap;
use declscope_api::{
    ContentScope, Declaration, IndexQuery, ModificationTracker, ModuleId, QualifiedName,
    ScopeProvider,
};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Declarations of one package, read from the index on first use.
pub struct IndexedDeclarationProvider {
    package: QualifiedName,
    scope: ContentScope,
    index: Arc<dyn IndexQuery>,
    declarations: OnceCell<Arc<[Declaration]>>,
}

impl IndexedDeclarationProvider {
    pub fn new(package: QualifiedName, scope: ContentScope, index: Arc<dyn IndexQuery>) -> Self {
        Self {
            package,
            scope,
            index,
            declarations: OnceCell::new(),
        }
    }

    pub fn scope(&self) -> &ContentScope {
        &self.scope
    }

    /// Whether the index has been queried yet.
    pub fn is_loaded(&self) -> bool {
        self.declarations.get().is_some()
    }

    fn load(&self) -> Result<&Arc<[Declaration]>> {
        // Failures are not memoized; the next call asks the index again.
        self.declarations.get_or_try_init(|| {
            let found = self.index.declarations_in(&self.package, &self.scope)?;
            tracing::trace!("Loaded {} indexed declarations of {}", found.len(), self.package);
            Ok(Arc::from(found))
        })
    }
}

impl fmt::Debug for IndexedDeclarationProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IndexedDeclarationProvider")
            .field("package", &self.package)
            .field("scope", &self.scope.token())
            .field("loaded", &self.is_loaded())
            .finish()
    }
}

impl DeclarationProvider for IndexedDeclarationProvider {
    fn package(&self) -> &QualifiedName {
        &self.package
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Indexed
    }

    fn declarations(&self) -> Result<Vec<Declaration>> {
        Ok(self.load()?.to_vec())
    }
}

/// Hands out indexed providers for one module, gated by the existence cache.
pub struct IndexedProviders {
    module: ModuleId,
    scopes: Arc<dyn ScopeProvider>,
    index: Arc<dyn IndexQuery>,
    trackers: Arc<dyn ModificationTracker>,
    existence: Arc<PackageExistenceCache>,
    /// Providers built so far, tagged with the modification count they were
    /// built under.
    built: DashMap<QualifiedName, (u64, Arc<IndexedDeclarationProvider>)>,
    created: AtomicU64,
}

impl IndexedProviders {
    pub fn new(
        module: ModuleId,
        services: &ResolutionServices,
        existence: Arc<PackageExistenceCache>,
    ) -> Self {
        Self {
            module,
            scopes: Arc::clone(&services.scopes),
            index: Arc::clone(&services.index),
            trackers: Arc::clone(&services.trackers),
            existence,
            built: DashMap::new(),
            created: AtomicU64::new(0),
        }
    }

    /// `None` when no indexed file declares `package` or a package under it.
    /// No provider object is built in that case.
    pub fn provider_for(
        &self,
        package: &QualifiedName,
    ) -> Result<Option<Arc<IndexedDeclarationProvider>>> {
        if !self.existence.exists(self.module, package)? {
            tracing::trace!("No indexed package {} in {}", package, self.module);
            self.built.remove(package);
            return Ok(None);
        }

        let tag = self.trackers.modification_count(self.module);
        let cached = self
            .built
            .get(package)
            .map(|entry| (entry.0, Arc::clone(&entry.1)));
        match cached {
            Some((built_under, provider)) if built_under == tag => return Ok(Some(provider)),
            // The count moved, so every entry built before it is stale too.
            Some(_) => self.prune_stale(tag),
            None => {}
        }

        let scope = self.scopes.content_scope(self.module)?;
        let provider = Arc::new(IndexedDeclarationProvider::new(
            package.clone(),
            scope,
            Arc::clone(&self.index),
        ));
        self.built
            .insert(package.clone(), (tag, Arc::clone(&provider)));
        self.created.fetch_add(1, Ordering::Relaxed);
        Ok(Some(provider))
    }

    /// Drop providers built under a modification count other than `tag`.
    fn prune_stale(&self, tag: u64) {
        let before = self.built.len();
        self.built.retain(|_, (built_under, _)| *built_under == tag);
        tracing::trace!(
            "Pruned {} stale indexed providers of {}",
            before.saturating_sub(self.built.len()),
            self.module
        );
    }

    /// Forget every provider, loaded declarations included.
    pub fn clear(&self) -> usize {
        let dropped = self.built.len();
        self.built.clear();
        dropped
    }

    /// Providers currently held for reuse.
    pub fn cached_providers(&self) -> usize {
        self.built.len()
    }

    /// Number of provider objects built, cache reuse excluded.
    pub fn providers_created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}
