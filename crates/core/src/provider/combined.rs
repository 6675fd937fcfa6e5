use super::{DeclarationProvider, ProviderKind};
use crate::error::Result;
use declscope_api::{Declaration, QualifiedName};
use std::sync::Arc;

/// Union of several providers for the same package.
///
/// Iteration follows component order. Nothing is de-duplicated: a unit that
/// is both indexed and passed in eagerly shows up twice, so callers must keep
/// the two sources disjoint.
#[derive(Debug)]
pub struct CombinedDeclarationProvider {
    package: QualifiedName,
    providers: Vec<Arc<dyn DeclarationProvider>>,
}

impl CombinedDeclarationProvider {
    pub fn new(package: QualifiedName, providers: Vec<Arc<dyn DeclarationProvider>>) -> Self {
        debug_assert!(providers.iter().all(|p| p.package() == &package));
        Self { package, providers }
    }

    pub fn providers(&self) -> &[Arc<dyn DeclarationProvider>] {
        &self.providers
    }
}

impl DeclarationProvider for CombinedDeclarationProvider {
    fn package(&self) -> &QualifiedName {
        &self.package
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Combined
    }

    fn component_kinds(&self) -> Vec<ProviderKind> {
        self.providers
            .iter()
            .flat_map(|p| p.component_kinds())
            .collect()
    }

    fn declarations(&self) -> Result<Vec<Declaration>> {
        let mut all = Vec::new();
        for provider in &self.providers {
            all.extend(provider.declarations()?);
        }
        Ok(all)
    }

    fn first_named(&self, name: &str) -> Result<Option<Declaration>> {
        for provider in &self.providers {
            if let Some(found) = provider.first_named(name)? {
                return Ok(Some(found));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::EagerSourceSet;
    use declscope_api::{DeclarationKind, DeclarationStub, SourceUnit, SourceUnitId};

    fn unit(id: u32, package: &str, decl: &str, kind: DeclarationKind) -> SourceUnit {
        SourceUnit {
            id: SourceUnitId(id),
            display_name: format!("U{id}.kt"),
            is_physical: false,
            modification_stamp: 0,
            package: QualifiedName::parse(package).unwrap(),
            declarations: vec![DeclarationStub::new(decl, kind)],
        }
    }

    #[test]
    fn test_union_in_component_order() {
        let p = QualifiedName::parse("p").unwrap();
        let first = EagerSourceSet::new(vec![unit(0, "p", "A", DeclarationKind::Class)]);
        let second = EagerSourceSet::new(vec![unit(1, "p", "B", DeclarationKind::Function)]);

        let combined = CombinedDeclarationProvider::new(
            p.clone(),
            vec![
                Arc::new(first.provider_for(&p).unwrap()) as Arc<dyn DeclarationProvider>,
                Arc::new(second.provider_for(&p).unwrap()) as Arc<dyn DeclarationProvider>,
            ],
        );

        let names: Vec<_> = combined
            .declarations()
            .unwrap()
            .into_iter()
            .map(|d| d.name.to_string())
            .collect();
        assert_eq!(names, vec!["A", "B"]);
        assert_eq!(combined.providers().len(), 2);
        assert_eq!(combined.classes_named("A").unwrap().len(), 1);
        assert_eq!(combined.members_named("B").unwrap().len(), 1);
        assert!(combined.members_named("A").unwrap().is_empty());
    }

    #[test]
    fn test_first_named_prefers_earlier_component() {
        let p = QualifiedName::parse("p").unwrap();
        let first = EagerSourceSet::new(vec![unit(0, "p", "Dup", DeclarationKind::Class)]);
        let second = EagerSourceSet::new(vec![unit(1, "p", "Dup", DeclarationKind::Class)]);

        let combined = CombinedDeclarationProvider::new(
            p.clone(),
            vec![
                Arc::new(first.provider_for(&p).unwrap()) as Arc<dyn DeclarationProvider>,
                Arc::new(second.provider_for(&p).unwrap()) as Arc<dyn DeclarationProvider>,
            ],
        );

        let found = combined.first_named("Dup").unwrap().unwrap();
        assert_eq!(
            found.origin,
            declscope_api::DeclarationOrigin::Source(SourceUnitId(0))
        );
        assert_eq!(combined.declarations().unwrap().len(), 2);
        assert!(combined.first_named("Missing").unwrap().is_none());
    }
}
