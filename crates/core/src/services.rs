use crate::provider::class::ParsedClassMemberFactory;
use declscope_api::{ClassMemberProviderFactory, IndexQuery, ModificationTracker, ScopeProvider};
use std::sync::Arc;

/// The external capabilities the resolution core runs against.
#[derive(Clone)]
pub struct ResolutionServices {
    pub scopes: Arc<dyn ScopeProvider>,
    pub index: Arc<dyn IndexQuery>,
    pub trackers: Arc<dyn ModificationTracker>,
    pub class_members: Arc<dyn ClassMemberProviderFactory>,
}

impl ResolutionServices {
    pub fn new(
        scopes: Arc<dyn ScopeProvider>,
        index: Arc<dyn IndexQuery>,
        trackers: Arc<dyn ModificationTracker>,
    ) -> Self {
        Self {
            scopes,
            index,
            trackers,
            class_members: Arc::new(ParsedClassMemberFactory),
        }
    }

    /// All three index-side capabilities served by one backend.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: ScopeProvider + IndexQuery + ModificationTracker + 'static,
    {
        Self::new(backend.clone(), backend.clone(), backend)
    }

    pub fn with_class_members(mut self, factory: Arc<dyn ClassMemberProviderFactory>) -> Self {
        self.class_members = factory;
        self
    }
}
