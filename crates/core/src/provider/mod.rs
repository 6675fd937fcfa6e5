//! Package declaration providers.
//!
//! A provider answers "what is declared directly in this package" from one
//! source: the eager set of not-yet-indexed units, the search index, or an
//! ordered combination of both.

pub mod class;
pub mod combined;
pub mod eager;
pub mod indexed;

use crate::error::Result;
use declscope_api::{Declaration, QualifiedName};
use serde::Serialize;
use std::fmt::Debug;

pub use class::{ParsedClassMemberFactory, ParsedClassMemberProvider};
pub use combined::CombinedDeclarationProvider;
pub use eager::{EagerDeclarationProvider, EagerSourceSet};
pub use indexed::{IndexedDeclarationProvider, IndexedProviders};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    Eager,
    Indexed,
    Combined,
}

pub trait DeclarationProvider: Send + Sync + Debug {
    fn package(&self) -> &QualifiedName;

    fn kind(&self) -> ProviderKind;

    /// Every top-level declaration of the package, in provider order.
    fn declarations(&self) -> Result<Vec<Declaration>>;

    /// Kinds of the leaf providers, in iteration order.
    fn component_kinds(&self) -> Vec<ProviderKind> {
        vec![self.kind()]
    }

    fn classes_named(&self, name: &str) -> Result<Vec<Declaration>> {
        Ok(self
            .declarations()?
            .into_iter()
            .filter(|decl| decl.kind.is_class_like() && decl.name == name)
            .collect())
    }

    /// Functions, properties and type aliases named `name`.
    fn members_named(&self, name: &str) -> Result<Vec<Declaration>> {
        Ok(self
            .declarations()?
            .into_iter()
            .filter(|decl| !decl.kind.is_class_like() && decl.name == name)
            .collect())
    }

    /// First declaration named `name`. Combined providers stop at the first
    /// component that has one.
    fn first_named(&self, name: &str) -> Result<Option<Declaration>> {
        Ok(self
            .declarations()?
            .into_iter()
            .find(|decl| decl.name == name))
    }
}
