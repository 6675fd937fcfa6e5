use crate::error::ApiResult;
use crate::models::{
    ContentScope, Declaration, FileHandle, FileKind, ModuleId, QualifiedName,
};

// ============================================================================
// Collaborator capabilities consumed by the resolution core
// ============================================================================

/// Module topology: which indexed files a module can see.
pub trait ScopeProvider: Send + Sync {
    /// Content scope of `module`. Modules without visible files return
    /// [`ContentScope::empty`].
    fn content_scope(&self, module: ModuleId) -> ApiResult<ContentScope>;
}

/// Structural search index over already indexed files.
///
/// Calls may block and may be slow; callers treat them as synchronous.
pub trait IndexQuery: Send + Sync {
    /// All files of `kind` inside `scope`.
    fn files(&self, kind: FileKind, scope: &ContentScope) -> ApiResult<Vec<FileHandle>>;

    /// Package declared by `file`. Files without a package clause live in the
    /// root package.
    fn package_of(&self, file: &FileHandle) -> ApiResult<QualifiedName>;

    /// Top-level declarations of exactly `package` found in `scope`.
    fn declarations_in(
        &self,
        package: &QualifiedName,
        scope: &ContentScope,
    ) -> ApiResult<Vec<Declaration>>;
}

/// Per-module counter bumped on every out-of-code-block change.
pub trait ModificationTracker: Send + Sync {
    /// Current counter value. Strictly increases on every relevant edit.
    fn modification_count(&self, module: ModuleId) -> u64;
}
