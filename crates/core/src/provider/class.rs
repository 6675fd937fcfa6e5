use declscope_api::{
    ClassLikeInfo, ClassMemberDeclarationProvider, ClassMemberProviderFactory, Declaration,
    DeclarationOrigin, QualifiedName,
};
use std::sync::Arc;

/// Members read straight from a class's parsed representation.
#[derive(Debug)]
pub struct ParsedClassMemberProvider {
    owner: QualifiedName,
    members: Vec<Declaration>,
}

impl ParsedClassMemberProvider {
    pub fn new(info: &ClassLikeInfo) -> Self {
        let members = info
            .members
            .iter()
            .map(|stub| Declaration::from_stub(stub, info.fq_name.clone(), DeclarationOrigin::Parsed))
            .collect();
        Self {
            owner: info.fq_name.clone(),
            members,
        }
    }
}

impl ClassMemberDeclarationProvider for ParsedClassMemberProvider {
    fn owner(&self) -> &QualifiedName {
        &self.owner
    }

    fn members(&self) -> Vec<Declaration> {
        self.members.clone()
    }
}

/// Default class-member capability.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParsedClassMemberFactory;

impl ClassMemberProviderFactory for ParsedClassMemberFactory {
    fn provider_for(&self, info: &ClassLikeInfo) -> Arc<dyn ClassMemberDeclarationProvider> {
        Arc::new(ParsedClassMemberProvider::new(info))
    }
}
