pub mod class;
pub mod error;
pub mod index;
pub mod models;

// Re-export commonly used types
pub use class::{ClassMemberDeclarationProvider, ClassMemberProviderFactory};
pub use error::{ApiError, ApiResult};
pub use index::{IndexQuery, ModificationTracker, ScopeProvider};
pub use models::*;
