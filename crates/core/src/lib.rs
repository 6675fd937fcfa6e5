pub mod cache;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod factory;
pub mod index;
pub mod logging;
pub mod provider;
pub mod services;

pub use cache::{CacheStats, PackageExistenceCache, PackageSet};
pub use config::CacheConfig;
pub use diagnostics::{DiagnosticReport, DiagnosticReporter, ExistenceProbe, ReportPhase};
pub use error::{DeclscopeError, Result};
pub use factory::DeclarationProviderFactory;
pub use provider::{DeclarationProvider, ProviderKind};
pub use services::ResolutionServices;
