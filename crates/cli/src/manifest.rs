//! JSON description of a workspace, loaded into the in-memory index.

use declscope_api::{
    ClassLikeInfo, DeclarationStub, FileKind, ModuleId, QualifiedName, SourceUnit,
};
use declscope_core::index::InMemoryIndex;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct WorkspaceManifest {
    pub modules: Vec<ModuleManifest>,
    /// Parsed class-like declarations, for the `class` command.
    #[serde(default)]
    pub classes: Vec<ClassLikeInfo>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ModuleManifest {
    pub name: String,
    /// Files already in the index.
    #[serde(default)]
    pub files: Vec<FileManifest>,
    /// Units the index has not seen yet. Must not repeat an indexed file.
    #[serde(default)]
    pub source_units: Vec<SourceUnit>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct FileManifest {
    pub path: PathBuf,
    #[serde(default = "default_kind")]
    pub kind: FileKind,
    #[serde(default)]
    pub package: QualifiedName,
    #[serde(default)]
    pub declarations: Vec<DeclarationStub>,
}

fn default_kind() -> FileKind {
    FileKind::Source
}

/// A manifest loaded into an index. Source units stay in the manifest.
pub struct LoadedWorkspace {
    pub index: InMemoryIndex,
    pub manifest: WorkspaceManifest,
}

impl WorkspaceManifest {
    pub fn read(path: &Path) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| format!("cannot read manifest {}: {}", path.display(), e))?;
        let manifest: WorkspaceManifest = serde_json::from_str(&text)
            .map_err(|e| format!("invalid manifest {}: {}", path.display(), e))?;
        manifest.validate()?;
        Ok(manifest)
    }

    fn validate(&self) -> Result<(), String> {
        let mut seen = HashSet::new();
        for module in &self.modules {
            if !seen.insert(module.name.as_str()) {
                return Err(format!("duplicate module `{}`", module.name));
            }
        }
        Ok(())
    }

    pub fn load(self) -> LoadedWorkspace {
        let index = InMemoryIndex::new();
        for module in &self.modules {
            let id = index.add_module(&module.name);
            for file in &module.files {
                index.add_file(
                    id,
                    file.path.clone(),
                    file.kind,
                    file.package.clone(),
                    file.declarations.clone(),
                );
            }
            tracing::debug!(
                "Loaded module {} ({}) with {} files and {} source units",
                module.name,
                id,
                module.files.len(),
                module.source_units.len()
            );
        }
        LoadedWorkspace {
            index,
            manifest: self,
        }
    }
}

impl LoadedWorkspace {
    pub fn module(&self, name: &str) -> Result<ModuleId, String> {
        self.index.module_by_name(name).ok_or_else(|| {
            let known: Vec<String> = self.index.modules().into_iter().map(|(_, n)| n).collect();
            format!("no module named `{}` (known: {})", name, known.join(", "))
        })
    }

    pub fn source_units(&self, name: &str) -> Vec<SourceUnit> {
        self.manifest
            .modules
            .iter()
            .find(|m| m.name == name)
            .map(|m| m.source_units.clone())
            .unwrap_or_default()
    }
}
