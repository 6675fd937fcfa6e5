use super::{DeclarationProvider, ProviderKind};
use crate::error::Result;
use declscope_api::{Declaration, DeclarationOrigin, QualifiedName, SourceUnit};
use std::sync::Arc;

/// The fixed collection of source units handed to a factory.
#[derive(Debug, Clone, Default)]
pub struct EagerSourceSet {
    units: Arc<[SourceUnit]>,
}

impl EagerSourceSet {
    pub fn new(units: impl IntoIterator<Item = SourceUnit>) -> Self {
        Self {
            units: units.into_iter().collect(),
        }
    }

    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Units declaring exactly `package`. Sub-packages do not match.
    pub fn units_in(&self, package: &QualifiedName) -> Vec<&SourceUnit> {
        self.units
            .iter()
            .filter(|unit| &unit.package == package)
            .collect()
    }

    pub fn contains_package(&self, package: &QualifiedName) -> bool {
        self.units.iter().any(|unit| &unit.package == package)
    }

    /// `None` when no unit declares `package`.
    pub fn provider_for(&self, package: &QualifiedName) -> Option<EagerDeclarationProvider> {
        let units: Vec<SourceUnit> = self.units_in(package).into_iter().cloned().collect();
        if units.is_empty() {
            return None;
        }
        Some(EagerDeclarationProvider {
            package: package.clone(),
            units,
        })
    }
}

#[derive(Debug)]
pub struct EagerDeclarationProvider {
    package: QualifiedName,
    units: Vec<SourceUnit>,
}

impl EagerDeclarationProvider {
    pub fn units(&self) -> &[SourceUnit] {
        &self.units
    }
}

impl DeclarationProvider for EagerDeclarationProvider {
    fn package(&self) -> &QualifiedName {
        &self.package
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Eager
    }

    fn declarations(&self) -> Result<Vec<Declaration>> {
        Ok(self
            .units
            .iter()
            .flat_map(|unit| {
                unit.declarations.iter().map(|stub| {
                    Declaration::from_stub(
                        stub,
                        self.package.clone(),
                        DeclarationOrigin::Source(unit.id),
                    )
                })
            })
            .collect())
    }
}
