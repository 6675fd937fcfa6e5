use crate::manifest::{LoadedWorkspace, WorkspaceManifest};
use declscope_api::{ClassLikeInfo, ModuleId, QualifiedName};
use declscope_core::{
    CacheConfig, DeclarationProviderFactory, PackageExistenceCache, ResolutionServices,
};
use std::path::Path;
use std::sync::Arc;

/// Everything needed to answer queries about one module of a manifest.
pub struct Session {
    pub cache: Arc<PackageExistenceCache>,
    pub factory: DeclarationProviderFactory,
    pub module: ModuleId,
    classes: Vec<ClassLikeInfo>,
}

impl Session {
    pub fn open(manifest: &Path, module_name: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let loaded = WorkspaceManifest::read(manifest)?.load();
        let module = loaded.module(module_name)?;
        let units = loaded.source_units(module_name);
        let LoadedWorkspace { index, manifest } = loaded;

        let services = ResolutionServices::from_backend(Arc::new(index));
        let cache = Arc::new(PackageExistenceCache::new(&services, CacheConfig::from_env()?));
        let factory = DeclarationProviderFactory::new(module, units, services, Arc::clone(&cache))?;

        Ok(Self {
            cache,
            factory,
            module,
            classes: manifest.classes,
        })
    }

    pub fn class(&self, fq_name: &QualifiedName) -> Option<&ClassLikeInfo> {
        self.classes.iter().find(|c| &c.fq_name == fq_name)
    }
}
