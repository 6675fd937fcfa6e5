use crate::diagnostics::DiagnosticReport;
use declscope_api::{ApiError, QualifiedName};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeclscopeError {
    /// Collaborator failure, passed through untouched.
    #[error("Index error: {0}")]
    Index(#[from] ApiError),
    /// A source unit's package resolved to no provider at all. The existence
    /// cache and the index disagree about what is visible.
    #[error("Missing package fragment for `{package}` (scope {})", .on_failure.scope)]
    MissingPackageFragment {
        package: QualifiedName,
        on_creation: Box<DiagnosticReport>,
        on_failure: Box<DiagnosticReport>,
    },
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DeclscopeError>;
