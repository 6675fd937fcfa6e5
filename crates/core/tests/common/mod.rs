#![allow(dead_code)]

use declscope_api::{
    DeclarationKind, DeclarationStub, ModificationTracker, ModuleId, QualifiedName, SourceUnit,
    SourceUnitId,
};
use declscope_core::index::InMemoryIndex;
use declscope_core::{CacheConfig, PackageExistenceCache, ResolutionServices};
use std::sync::Arc;

pub fn name(text: &str) -> QualifiedName {
    QualifiedName::parse(text).unwrap()
}

pub fn class(name: &str) -> DeclarationStub {
    DeclarationStub::new(name, DeclarationKind::Class)
}

pub fn function(name: &str) -> DeclarationStub {
    DeclarationStub::new(name, DeclarationKind::Function)
}

pub fn source_unit(id: u32, package: &str, declarations: Vec<DeclarationStub>) -> SourceUnit {
    SourceUnit {
        id: SourceUnitId(id),
        display_name: format!("Scratch{id}.kt"),
        is_physical: id % 2 == 0,
        modification_stamp: 100 + id as u64,
        package: name(package),
        declarations,
    }
}

pub struct Fixture {
    pub index: Arc<InMemoryIndex>,
    pub services: ResolutionServices,
    pub cache: Arc<PackageExistenceCache>,
}

impl Fixture {
    pub fn tracker(&self, module: ModuleId) -> u64 {
        self.index.modification_count(module)
    }
}

pub fn fixture() -> Fixture {
    fixture_with(CacheConfig::default())
}

pub fn fixture_with(config: CacheConfig) -> Fixture {
    let index = Arc::new(InMemoryIndex::new());
    let services = ResolutionServices::from_backend(index.clone());
    let cache = Arc::new(PackageExistenceCache::new(&services, config));
    Fixture {
        index,
        services,
        cache,
    }
}

pub fn names(decls: &[declscope_api::Declaration]) -> Vec<String> {
    decls.iter().map(|d| d.name.to_string()).collect()
}
