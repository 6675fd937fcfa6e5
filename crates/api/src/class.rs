use crate::models::{ClassLikeInfo, Declaration, QualifiedName};
use std::fmt::Debug;
use std::sync::Arc;

/// Members of a single class-like declaration.
///
/// Backed by the parsed representation of that class, so there is exactly
/// one provider per class and nothing to merge.
pub trait ClassMemberDeclarationProvider: Send + Sync + Debug {
    fn owner(&self) -> &QualifiedName;

    fn members(&self) -> Vec<Declaration>;

    fn members_named(&self, name: &str) -> Vec<Declaration> {
        self.members()
            .into_iter()
            .filter(|decl| decl.name == name)
            .collect()
    }

    /// Nested class-like declarations.
    fn nested_classes(&self) -> Vec<Declaration> {
        self.members()
            .into_iter()
            .filter(|decl| decl.kind.is_class_like())
            .collect()
    }
}

/// Builds the class-member provider for a class.
pub trait ClassMemberProviderFactory: Send + Sync {
    fn provider_for(&self, info: &ClassLikeInfo) -> Arc<dyn ClassMemberDeclarationProvider>;
}
