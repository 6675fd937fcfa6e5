//! Entry point for package and class member resolution.

use crate::cache::PackageExistenceCache;
use crate::diagnostics::{DiagnosticReport, DiagnosticReporter};
use crate::error::{DeclscopeError, Result};
use crate::provider::{
    CombinedDeclarationProvider, DeclarationProvider, EagerSourceSet, IndexedProviders,
};
use crate::services::ResolutionServices;
use declscope_api::{
    ClassLikeInfo, ClassMemberDeclarationProvider, ContentScope, ModuleId, QualifiedName,
    SourceUnit,
};
use std::sync::Arc;

pub struct DeclarationProviderFactory {
    module: ModuleId,
    services: ResolutionServices,
    sources: EagerSourceSet,
    indexed: IndexedProviders,
    existence: Arc<PackageExistenceCache>,
    scope: ContentScope,
    reporter: DiagnosticReporter,
    on_creation: DiagnosticReport,
}

impl DeclarationProviderFactory {
    /// Build a factory for `module`.
    ///
    /// `source_units` must not overlap with the files in the module's indexed
    /// scope. Nothing checks this: a unit present in both is reported twice.
    pub fn new(
        module: ModuleId,
        source_units: impl IntoIterator<Item = SourceUnit>,
        services: ResolutionServices,
        existence: Arc<PackageExistenceCache>,
    ) -> Result<Self> {
        let sources = EagerSourceSet::new(source_units);
        let scope = services.scopes.content_scope(module)?;
        let indexed = IndexedProviders::new(module, &services, Arc::clone(&existence));
        let reporter = DiagnosticReporter::new(
            module,
            sources.clone(),
            Arc::clone(&existence),
            Arc::clone(&services.trackers),
            scope.token(),
        );
        let on_creation = reporter.snapshot_on_creation();

        tracing::debug!(
            "Declaration factory for {} with {} source units over {} indexed files",
            module,
            sources.len(),
            scope.len()
        );

        Ok(Self {
            module,
            services,
            sources,
            indexed,
            existence,
            scope,
            reporter,
            on_creation,
        })
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn source_units(&self) -> &EagerSourceSet {
        &self.sources
    }

    /// Scope snapshot taken at construction.
    pub fn scope(&self) -> &ContentScope {
        &self.scope
    }

    /// Index-side existence only. Packages known solely from source units
    /// answer `false` here.
    pub fn package_exists(&self, name: &QualifiedName) -> Result<bool> {
        self.existence.exists(self.module, name)
    }

    pub fn sub_packages(&self, name: &QualifiedName) -> Result<Vec<QualifiedName>> {
        self.existence.sub_packages(self.module, name)
    }

    /// Declarations visible directly in package `name`, or `None` when
    /// neither source knows it.
    ///
    /// The eager side is not gated by the existence cache, so a package only
    /// declared by source units still resolves.
    pub fn provider_for_package(
        &self,
        name: &QualifiedName,
    ) -> Result<Option<Arc<dyn DeclarationProvider>>> {
        let eager = self
            .sources
            .provider_for(name)
            .map(|p| Arc::new(p) as Arc<dyn DeclarationProvider>);
        let indexed = self
            .indexed
            .provider_for(name)?
            .map(|p| p as Arc<dyn DeclarationProvider>);

        let provider = match (indexed, eager) {
            (None, None) => None,
            (Some(only), None) | (None, Some(only)) => Some(only),
            (Some(indexed), Some(eager)) => {
                let combined =
                    CombinedDeclarationProvider::new(name.clone(), vec![indexed, eager]);
                Some(Arc::new(combined) as Arc<dyn DeclarationProvider>)
            }
        };
        Ok(provider)
    }

    pub fn provider_for_class_like(
        &self,
        info: &ClassLikeInfo,
    ) -> Arc<dyn ClassMemberDeclarationProvider> {
        self.services.class_members.provider_for(info)
    }

    /// Provider for the package of a known source unit. A unit whose package
    /// resolves to nothing means the cache and the index have drifted apart;
    /// that is reported, never papered over.
    pub fn provider_for_source_unit(
        &self,
        unit: &SourceUnit,
    ) -> Result<Arc<dyn DeclarationProvider>> {
        match self.provider_for_package(&unit.package)? {
            Some(provider) => Ok(provider),
            None => Err(self.missing_package_fragment(&unit.package)),
        }
    }

    /// Like [`Self::provider_for_package`], but absence is a fault.
    pub fn require_provider_for_package(
        &self,
        name: &QualifiedName,
    ) -> Result<Arc<dyn DeclarationProvider>> {
        self.provider_for_package(name)?
            .ok_or_else(|| self.missing_package_fragment(name))
    }

    pub fn creation_report(&self) -> &DiagnosticReport {
        &self.on_creation
    }

    pub fn report(&self, failing_package: &QualifiedName) -> DiagnosticReport {
        self.reporter.report(failing_package)
    }

    /// Indexed provider objects built so far.
    pub fn indexed_providers_created(&self) -> u64 {
        self.indexed.providers_created()
    }

    /// Indexed providers currently held for reuse.
    pub fn indexed_providers_cached(&self) -> usize {
        self.indexed.cached_providers()
    }

    /// Release the shared package sets and this factory's indexed providers.
    /// Returns how many of each were dropped.
    pub fn on_memory_pressure(&self) -> (usize, usize) {
        let sets = self.existence.on_memory_pressure();
        let providers = self.indexed.clear();
        if providers > 0 {
            tracing::warn!(
                "Dropped {} indexed providers of {} under memory pressure",
                providers,
                self.module
            );
        }
        (sets, providers)
    }

    fn missing_package_fragment(&self, package: &QualifiedName) -> DeclscopeError {
        let on_failure = self.reporter.report(package);
        tracing::error!(
            "Missing package fragment for {} in {}: cached={:?} fresh={:?} tracker={} (was {} on creation)",
            package,
            self.module,
            on_failure.cached_existence,
            on_failure.fresh_existence,
            on_failure.tracker_value,
            self.on_creation.tracker_value
        );
        DeclscopeError::MissingPackageFragment {
            package: package.clone(),
            on_creation: Box::new(self.on_creation.clone()),
            on_failure: Box::new(on_failure),
        }
    }
}
