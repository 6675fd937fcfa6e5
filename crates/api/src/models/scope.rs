use super::ids::{FileId, ModuleId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use xxhash_rust::xxh3::Xxh3;

/// Opaque identity of a scope object, used to correlate diagnostic reports
/// with external logs.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeToken(pub u64);

impl fmt::Display for ScopeToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// The set of indexed files visible to one module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentScope {
    module: ModuleId,
    token: ScopeToken,
    files: Arc<BTreeSet<FileId>>,
}

impl ContentScope {
    pub fn new(module: ModuleId, files: impl IntoIterator<Item = FileId>) -> Self {
        let files: BTreeSet<FileId> = files.into_iter().collect();
        let token = Self::digest(module, &files);
        Self {
            module,
            token,
            files: Arc::new(files),
        }
    }

    /// The "nothing visible" sentinel.
    pub fn empty(module: ModuleId) -> Self {
        Self::new(module, std::iter::empty())
    }

    fn digest(module: ModuleId, files: &BTreeSet<FileId>) -> ScopeToken {
        let mut hasher = Xxh3::new();
        hasher.update(&module.0.to_le_bytes());
        for file in files {
            hasher.update(&file.0.to_le_bytes());
        }
        ScopeToken(hasher.digest())
    }

    pub fn module(&self) -> ModuleId {
        self.module
    }

    pub fn token(&self) -> ScopeToken {
        self.token
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn contains(&self, file: FileId) -> bool {
        self.files.contains(&file)
    }

    pub fn files(&self) -> impl Iterator<Item = FileId> + '_ {
        self.files.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_structural() {
        let a = ContentScope::new(ModuleId(1), [FileId(3), FileId(1)]);
        let b = ContentScope::new(ModuleId(1), [FileId(1), FileId(3)]);
        assert_eq!(a.token(), b.token());

        let other_module = ContentScope::new(ModuleId(2), [FileId(1), FileId(3)]);
        assert_ne!(a.token(), other_module.token());
    }

    #[test]
    fn test_empty_sentinel() {
        let scope = ContentScope::empty(ModuleId(7));
        assert!(scope.is_empty());
        assert_eq!(scope.len(), 0);
        assert!(!scope.contains(FileId(0)));
    }
}
