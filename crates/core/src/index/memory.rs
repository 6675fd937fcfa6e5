//! In-memory implementation of the index-side capabilities.
//!
//! Serves [`ScopeProvider`], [`IndexQuery`] and [`ModificationTracker`] from
//! thread-safe maps, and counts every call so callers can assert which
//! queries were (or were not) issued.

use dashmap::{DashMap, DashSet};
use declscope_api::{
    ApiError, ApiResult, ContentScope, Declaration, DeclarationOrigin, DeclarationStub, FileHandle,
    FileId, FileKind, IndexQuery, ModificationTracker, ModuleId, QualifiedName, ScopeProvider,
};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};

#[derive(Debug, Clone)]
pub struct IndexedFile {
    pub handle: FileHandle,
    pub package: QualifiedName,
    pub declarations: Vec<DeclarationStub>,
}

#[derive(Debug)]
struct ModuleState {
    name: String,
    files: BTreeSet<FileId>,
    modification_count: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IndexCallCounts {
    pub scope_requests: u64,
    pub file_enumerations: u64,
    pub package_resolutions: u64,
    pub declaration_queries: u64,
}

impl IndexCallCounts {
    /// Calls that touched the index proper (scope requests excluded).
    pub fn index_calls(&self) -> u64 {
        self.file_enumerations + self.package_resolutions + self.declaration_queries
    }
}

#[derive(Default)]
struct CallCounters {
    scope_requests: AtomicU64,
    file_enumerations: AtomicU64,
    package_resolutions: AtomicU64,
    declaration_queries: AtomicU64,
}

pub struct InMemoryIndex {
    modules: DashMap<ModuleId, ModuleState>,
    files: DashMap<FileId, IndexedFile>,
    next_module: AtomicU32,
    next_file: AtomicU32,
    unavailable: AtomicBool,
    edits_during_next_scan: DashSet<ModuleId>,
    calls: CallCounters,
    declaration_queries_by_package: DashMap<QualifiedName, u64>,
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryIndex {
    pub fn new() -> Self {
        Self {
            modules: DashMap::new(),
            files: DashMap::new(),
            next_module: AtomicU32::new(0),
            next_file: AtomicU32::new(0),
            unavailable: AtomicBool::new(false),
            edits_during_next_scan: DashSet::new(),
            calls: CallCounters::default(),
            declaration_queries_by_package: DashMap::new(),
        }
    }

    pub fn add_module(&self, name: &str) -> ModuleId {
        let id = ModuleId(self.next_module.fetch_add(1, Ordering::SeqCst));
        self.modules.insert(
            id,
            ModuleState {
                name: name.to_string(),
                files: BTreeSet::new(),
                modification_count: 0,
            },
        );
        id
    }

    pub fn module_by_name(&self, name: &str) -> Option<ModuleId> {
        self.modules
            .iter()
            .find(|entry| entry.value().name == name)
            .map(|entry| *entry.key())
    }

    pub fn modules(&self) -> Vec<(ModuleId, String)> {
        let mut modules: Vec<_> = self
            .modules
            .iter()
            .map(|entry| (*entry.key(), entry.value().name.clone()))
            .collect();
        modules.sort();
        modules
    }

    /// Register a file and make it visible to `module`.
    pub fn add_file(
        &self,
        module: ModuleId,
        path: impl Into<PathBuf>,
        kind: FileKind,
        package: QualifiedName,
        declarations: Vec<DeclarationStub>,
    ) -> FileId {
        let id = FileId(self.next_file.fetch_add(1, Ordering::SeqCst));
        self.files.insert(
            id,
            IndexedFile {
                handle: FileHandle {
                    id,
                    path: path.into(),
                    kind,
                },
                package,
                declarations,
            },
        );
        self.attach_file(module, id);
        id
    }

    pub fn add_source_file(
        &self,
        module: ModuleId,
        path: impl AsRef<Path>,
        package: QualifiedName,
        declarations: Vec<DeclarationStub>,
    ) -> FileId {
        self.add_file(
            module,
            path.as_ref().to_path_buf(),
            FileKind::Source,
            package,
            declarations,
        )
    }

    /// Make an existing file visible to another module as well.
    pub fn attach_file(&self, module: ModuleId, file: FileId) {
        if let Some(mut state) = self.modules.get_mut(&module) {
            if state.files.insert(file) {
                state.modification_count += 1;
            }
        }
    }

    pub fn remove_file(&self, module: ModuleId, file: FileId) -> bool {
        match self.modules.get_mut(&module) {
            Some(mut state) => {
                let removed = state.files.remove(&file);
                if removed {
                    state.modification_count += 1;
                }
                removed
            }
            None => false,
        }
    }

    /// Record an out-of-code-block change without touching any file.
    pub fn touch(&self, module: ModuleId) {
        if let Some(mut state) = self.modules.get_mut(&module) {
            state.modification_count += 1;
        }
    }

    /// Bump `module`'s counter from inside the next file enumeration of its
    /// scope, as if an edit raced with the scan.
    pub fn schedule_edit_during_next_scan(&self, module: ModuleId) {
        self.edits_during_next_scan.insert(module);
    }

    /// While unavailable every index query fails with
    /// [`ApiError::IndexUnavailable`].
    pub fn set_available(&self, available: bool) {
        self.unavailable.store(!available, Ordering::SeqCst);
    }

    pub fn call_counts(&self) -> IndexCallCounts {
        IndexCallCounts {
            scope_requests: self.calls.scope_requests.load(Ordering::SeqCst),
            file_enumerations: self.calls.file_enumerations.load(Ordering::SeqCst),
            package_resolutions: self.calls.package_resolutions.load(Ordering::SeqCst),
            declaration_queries: self.calls.declaration_queries.load(Ordering::SeqCst),
        }
    }

    pub fn declaration_queries_for(&self, package: &QualifiedName) -> u64 {
        self.declaration_queries_by_package
            .get(package)
            .map(|count| *count)
            .unwrap_or(0)
    }

    pub fn reset_call_counts(&self) {
        self.calls.scope_requests.store(0, Ordering::SeqCst);
        self.calls.file_enumerations.store(0, Ordering::SeqCst);
        self.calls.package_resolutions.store(0, Ordering::SeqCst);
        self.calls.declaration_queries.store(0, Ordering::SeqCst);
        self.declaration_queries_by_package.clear();
    }

    fn check_available(&self) -> ApiResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(ApiError::IndexUnavailable("index is being rebuilt".to_string()))
        } else {
            Ok(())
        }
    }
}

impl ScopeProvider for InMemoryIndex {
    fn content_scope(&self, module: ModuleId) -> ApiResult<ContentScope> {
        self.calls.scope_requests.fetch_add(1, Ordering::SeqCst);
        let state = self
            .modules
            .get(&module)
            .ok_or_else(|| ApiError::UnknownModule(module.to_string()))?;
        if state.files.is_empty() {
            return Ok(ContentScope::empty(module));
        }
        Ok(ContentScope::new(module, state.files.iter().copied()))
    }
}

impl IndexQuery for InMemoryIndex {
    fn files(&self, kind: FileKind, scope: &ContentScope) -> ApiResult<Vec<FileHandle>> {
        self.calls.file_enumerations.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;

        let handles = scope
            .files()
            .filter_map(|id| self.files.get(&id).map(|file| file.handle.clone()))
            .filter(|handle| handle.kind == kind)
            .collect();

        if self.edits_during_next_scan.remove(&scope.module()).is_some() {
            self.touch(scope.module());
        }
        Ok(handles)
    }

    fn package_of(&self, file: &FileHandle) -> ApiResult<QualifiedName> {
        self.calls.package_resolutions.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        self.files
            .get(&file.id)
            .map(|indexed| indexed.package.clone())
            .ok_or_else(|| ApiError::UnknownFile(file.path.display().to_string()))
    }

    fn declarations_in(
        &self,
        package: &QualifiedName,
        scope: &ContentScope,
    ) -> ApiResult<Vec<Declaration>> {
        self.calls.declaration_queries.fetch_add(1, Ordering::SeqCst);
        *self
            .declaration_queries_by_package
            .entry(package.clone())
            .or_insert(0) += 1;
        self.check_available()?;

        let mut declarations = Vec::new();
        for id in scope.files() {
            let Some(file) = self.files.get(&id) else {
                continue;
            };
            if file.handle.kind != FileKind::Source || &file.package != package {
                continue;
            }
            declarations.extend(file.declarations.iter().map(|stub| {
                Declaration::from_stub(stub, package.clone(), DeclarationOrigin::Indexed(id))
            }));
        }
        Ok(declarations)
    }
}

impl ModificationTracker for InMemoryIndex {
    fn modification_count(&self, module: ModuleId) -> u64 {
        self.modules
            .get(&module)
            .map(|state| state.modification_count)
            .unwrap_or(0)
    }
}
